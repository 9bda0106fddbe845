use std::collections::BTreeMap;
use std::sync::Arc;

use hyperbrowse::runtime::mock::{MockTransport, RecordingViewManager, ViewOpening};
use hyperbrowse::to::{
    Collection, GridLayout, GridRow, Link, Member, MemberKind, Property, PropertyExtensions,
    PropertyLayout, Relation, TObject, TransferObject,
};
use hyperbrowse::Session;

const ORDER_URL: &str = "http://api/orders/1";
const ORDER_LAYOUT_URL: &str = "http://api/orders/1/object-layout";
const ITEMS_URL: &str = "http://api/orders/1/collections/items";
const ITEMS_DESCRIPTION_URL: &str = "http://api/domain-types/order/collections/items";
const ITEM_URL: &str = "http://api/items/9";
const ITEM_LAYOUT_URL: &str = "http://api/items/object-layout";
const ITEM_NAME_DESCRIPTION_URL: &str = "http://api/domain-types/item/properties/name";

fn order_object() -> TObject {
    let mut members = BTreeMap::new();
    members.insert(
        "status".to_string(),
        Member {
            id: "status".into(),
            kind: MemberKind::Property,
            value: Some("open".into()),
            links: vec![],
        },
    );
    members.insert(
        "items".to_string(),
        Member {
            id: "items".into(),
            kind: MemberKind::Collection,
            value: None,
            links: vec![Link::get(Relation::Element, ITEMS_URL)],
        },
    );
    TObject {
        title: "Order #1".into(),
        domain_type: "order".into(),
        instance_id: "1".into(),
        links: vec![Link::get(Relation::Layout, ORDER_LAYOUT_URL)],
        members,
    }
}

fn item_object() -> TObject {
    let mut members = BTreeMap::new();
    members.insert(
        "name".to_string(),
        Member {
            id: "name".into(),
            kind: MemberKind::Property,
            value: Some("widget".into()),
            links: vec![],
        },
    );
    TObject {
        title: "widget".into(),
        domain_type: "item".into(),
        instance_id: "9".into(),
        links: vec![Link::get(Relation::Layout, ITEM_LAYOUT_URL)],
        members,
    }
}

fn grid(property_id: &str, description_url: Option<&str>) -> GridLayout {
    GridLayout {
        rows: vec![GridRow {
            properties: vec![PropertyLayout {
                id: property_id.into(),
                named: property_id.into(),
                hidden: false,
                typical_length: 25,
                multi_line: 1,
                described_as: None,
                link: description_url.map(|url| Link::get(Relation::Element, url)),
            }],
        }],
    }
}

fn description(id: &str, friendly_name: &str) -> Property {
    Property {
        id: id.into(),
        links: vec![],
        extensions: Some(PropertyExtensions {
            friendly_name: friendly_name.into(),
            description: None,
        }),
    }
}

fn routed_transport() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    transport.route(ORDER_URL, TransferObject::Object(order_object()));
    transport.route(ORDER_LAYOUT_URL, TransferObject::Grid(grid("status", None)));
    transport.route(
        ITEMS_URL,
        TransferObject::Collection(Collection {
            id: "items".into(),
            links: vec![Link::get(Relation::DescribedBy, ITEMS_DESCRIPTION_URL)],
            value: vec![Link::get(Relation::Element, ITEM_URL)],
        }),
    );
    // The collection description decodes to nothing useful here; the child
    // must still converge from its element objects alone.
    transport.route_empty(ITEMS_DESCRIPTION_URL);
    transport.route(ITEM_URL, TransferObject::Object(item_object()));
    transport.route(
        ITEM_LAYOUT_URL,
        TransferObject::Grid(grid("name", Some(ITEM_NAME_DESCRIPTION_URL))),
    );
    transport.route(
        ITEM_NAME_DESCRIPTION_URL,
        TransferObject::Property(description("name", "Item Name")),
    );
    transport
}

/// An object with a collection member spawns a parented child aggregator;
/// the object view waits for the whole tree and opens exactly once.
#[tokio::test]
async fn test_object_view_waits_for_its_collections() {
    let transport = routed_transport();
    let views = Arc::new(RecordingViewManager::new());
    let mut session = Session::new(transport, views.clone());

    let root = session.root_object("");
    session
        .proxy()
        .fetch(&Link::get(Relation::SelfRel, ORDER_URL), root, "");
    session.run_until_idle().await.expect("session run failed");

    // One object view, and the parented child never opens its own view.
    assert_eq!(
        views.openings(),
        vec![ViewOpening::Object {
            title: "Order #1".into(),
        }]
    );

    let model = session.object_model(root).expect("object model");
    assert!(model.ready_to_render());
    assert!(model.is_rendered());

    // The child registered its model under the collection member id.
    let child = *model.collections().get("items").expect("items collection adopted");
    let child_model = session.collection_model(child).expect("child model");
    assert_eq!(child_model.id(), "items");
    assert_eq!(child_model.rows().len(), 1);
    assert_eq!(
        child_model.rows()[0].cells.get("name").map(String::as_str),
        Some("widget")
    );
    assert!(child_model.ready_to_render());
}

/// Resetting the object tree drops the stale child aggregators and their
/// fetch history; a re-run rebuilds the whole tree and opens a second view.
#[tokio::test]
async fn test_reset_drops_children_and_allows_a_rerun() {
    let transport = routed_transport();
    let views = Arc::new(RecordingViewManager::new());
    let mut session = Session::new(transport.clone(), views.clone());

    let root = session.root_object("");
    let order_link = Link::get(Relation::SelfRel, ORDER_URL);
    session.proxy().fetch(&order_link, root, "");
    session.run_until_idle().await.expect("session run failed");

    let model = session.object_model(root).expect("object model");
    let stale_child = *model.collections().get("items").expect("items collection adopted");

    assert!(session.reset(root));
    assert!(
        session.collection_model(stale_child).is_none(),
        "stale child aggregator must be dropped from the registry"
    );

    session.proxy().fetch(&order_link, root, "");
    session.run_until_idle().await.expect("session re-run failed");

    assert_eq!(transport.hits(ORDER_URL), 2);
    assert_eq!(transport.hits(ITEMS_URL), 2);
    assert_eq!(
        views.openings(),
        vec![
            ViewOpening::Object {
                title: "Order #1".into(),
            },
            ViewOpening::Object {
                title: "Order #1".into(),
            },
        ]
    );

    let model = session.object_model(root).expect("object model");
    let fresh_child = *model.collections().get("items").expect("items collection re-adopted");
    assert_ne!(fresh_child, stale_child);
    let child_model = session.collection_model(fresh_child).expect("fresh child model");
    assert_eq!(child_model.rows().len(), 1);
    assert!(child_model.ready_to_render());
}

/// The child keeps the member id assigned at adoption even though its
/// prototype object would suggest its own domain type.
#[tokio::test]
async fn test_parented_collection_keeps_member_id() {
    let transport = routed_transport();
    let views = Arc::new(RecordingViewManager::new());
    let mut session = Session::new(transport, views);

    let root = session.root_object("");
    session
        .proxy()
        .fetch(&Link::get(Relation::SelfRel, ORDER_URL), root, "");
    session.run_until_idle().await.expect("session run failed");

    let model = session.object_model(root).expect("object model");
    let child = *model.collections().get("items").expect("items collection adopted");
    let child_model = session.collection_model(child).expect("child model");
    // "items" from the collection payload, not "item" from the prototype.
    assert_eq!(child_model.id(), "items");
}
