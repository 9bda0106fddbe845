//! The outbound seam to the rendering layer.

use crate::model::{CollectionDM, ObjectDM};

/// External collaborator invoked once a display model is render-ready.
///
/// The session calls each method at most once per aggregator readiness
/// transition; implementations receive a shared borrow of the finished
/// model and must not hold on to it beyond the call.
pub trait ViewManager: Send + Sync {
    fn open_collection_view(&self, model: &CollectionDM);

    fn open_object_view(&self, model: &ObjectDM);
}
