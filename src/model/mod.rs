//! Display models: the accumulating, eventually-complete view state each
//! aggregator owns, plus the column specifications they reconcile.

mod collection;
mod column;
mod object;

pub use collection::{CollectionDM, CollectionLayout, Row};
pub use column::{ColumnSpecification, ColumnSpecificationHolder};
pub use object::ObjectDM;
