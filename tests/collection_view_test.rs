use std::collections::BTreeMap;
use std::sync::Arc;

use hyperbrowse::runtime::mock::{MockTransport, RecordingViewManager, ViewOpening};
use hyperbrowse::to::{
    GridLayout, GridRow, Link, ListResult, Member, MemberKind, Property, PropertyExtensions,
    PropertyLayout, Relation, ResultList, ResultType, TObject, TransferObject,
};
use hyperbrowse::{EventState, ResourceSpecification, Session, SubType};

const LIST_URL: &str = "http://api/services/simple/actions/listAll/invoke";
const OBJECT_1_URL: &str = "http://api/objects/1";
const OBJECT_2_URL: &str = "http://api/objects/2";
const LAYOUT_URL: &str = "http://api/objects/object-layout";
const DESCRIPTION_URL: &str = "http://api/domain-types/simple/properties/name";

fn simple_object(instance_id: &str, name: &str) -> TObject {
    let mut members = BTreeMap::new();
    members.insert(
        "name".to_string(),
        Member {
            id: "name".into(),
            kind: MemberKind::Property,
            value: Some(name.into()),
            links: vec![],
        },
    );
    TObject {
        title: name.into(),
        domain_type: "simple".into(),
        instance_id: instance_id.into(),
        links: vec![Link::get(Relation::Layout, LAYOUT_URL)],
        members,
    }
}

fn layout_grid() -> GridLayout {
    GridLayout {
        rows: vec![GridRow {
            properties: vec![PropertyLayout {
                id: "name".into(),
                named: "Name".into(),
                hidden: false,
                typical_length: 25,
                multi_line: 1,
                described_as: None,
                link: Some(Link::get(Relation::Element, DESCRIPTION_URL)),
            }],
        }],
    }
}

fn name_description() -> Property {
    Property {
        id: "name".into(),
        links: vec![],
        extensions: Some(PropertyExtensions {
            friendly_name: "Object Name".into(),
            description: Some("the display name".into()),
        }),
    }
}

fn routed_transport() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    // The list references object 1 twice through different paths; the
    // session must fetch it only once and the model must keep one row.
    transport.route(
        LIST_URL,
        TransferObject::ResultList(ResultList {
            result_type: ResultType::List,
            result: Some(ListResult {
                value: vec![
                    Link::get(Relation::Element, OBJECT_1_URL),
                    Link::get(Relation::Element, OBJECT_2_URL),
                    Link::get(Relation::Element, OBJECT_1_URL),
                ],
            }),
        }),
    );
    transport.route(OBJECT_1_URL, TransferObject::Object(simple_object("1", "first")));
    transport.route(OBJECT_2_URL, TransferObject::Object(simple_object("2", "second")));
    transport.route(LAYOUT_URL, TransferObject::Grid(layout_grid()));
    transport.route(DESCRIPTION_URL, TransferObject::Property(name_description()));
    transport
}

/// Drives a standalone collection from the initial invocation result to a
/// fully reconciled, opened view.
#[tokio::test]
async fn test_standalone_collection_opens_exactly_once() {
    let transport = routed_transport();
    let views = Arc::new(RecordingViewManager::new());
    let mut session = Session::new(transport.clone(), views.clone());

    let root = session.root_collection("Simple Objects");
    session
        .proxy()
        .fetch(&Link::get(Relation::Invoke, LIST_URL), root, "");
    session.run_until_idle().await.expect("session run failed");

    // The view opened exactly once, with both objects flattened into rows.
    assert_eq!(
        views.openings(),
        vec![ViewOpening::Collection {
            title: "Simple Objects".into(),
            rows: 2,
        }]
    );

    let model = session.collection_model(root).expect("collection model");
    assert_eq!(model.id(), "simple");
    assert_eq!(model.rows().len(), 2);
    assert_eq!(model.layout().number_of_columns, 1);
    assert!(model.ready_to_render());
    assert!(model.is_rendered());
}

/// Re-requests for an already-fetched resource are joined or suppressed:
/// every routed URL sees exactly one transfer.
#[tokio::test]
async fn test_each_resource_is_fetched_at_most_once() {
    let transport = routed_transport();
    let views = Arc::new(RecordingViewManager::new());
    let mut session = Session::new(transport.clone(), views.clone());

    let root = session.root_collection("Simple Objects");
    session
        .proxy()
        .fetch(&Link::get(Relation::Invoke, LIST_URL), root, "");
    session.run_until_idle().await.expect("session run failed");

    assert_eq!(transport.hits(LIST_URL), 1);
    // Listed twice, fetched once.
    assert_eq!(transport.hits(OBJECT_1_URL), 1);
    assert_eq!(transport.hits(OBJECT_2_URL), 1);
    // Both objects link the same layout; only the prototype triggers it.
    assert_eq!(transport.hits(LAYOUT_URL), 1);
    assert_eq!(transport.hits(DESCRIPTION_URL), 1);
}

/// Reset clears accumulated data and the rendered flag so the query can be
/// re-run into the same view.
#[tokio::test]
async fn test_reset_clears_rows_and_rendered_flag() {
    let transport = routed_transport();
    let views = Arc::new(RecordingViewManager::new());
    let mut session = Session::new(transport, views);

    let root = session.root_collection("Simple Objects");
    session
        .proxy()
        .fetch(&Link::get(Relation::Invoke, LIST_URL), root, "");
    session.run_until_idle().await.expect("session run failed");

    assert!(session.reset(root), "root aggregator should exist");
    let model = session.collection_model(root).expect("collection model");
    assert!(model.rows().is_empty());
    assert!(!model.is_rendered());
}

/// Reset also forgets the tree's fetch history, so re-running the query
/// actually re-fetches everything and opens a fresh view.
#[tokio::test]
async fn test_reset_then_rerun_opens_a_fresh_view() {
    let transport = routed_transport();
    let views = Arc::new(RecordingViewManager::new());
    let mut session = Session::new(transport.clone(), views.clone());

    let root = session.root_collection("Simple Objects");
    let list_link = Link::get(Relation::Invoke, LIST_URL);
    session.proxy().fetch(&list_link, root, "");
    session.run_until_idle().await.expect("session run failed");
    assert_eq!(views.count(), 1);

    assert!(session.reset(root));
    let list_spec = ResourceSpecification::new(LIST_URL, SubType::Json);
    assert_eq!(
        session.fetch_state(&list_spec),
        None,
        "reset must forget the fetch record, or the re-run is suppressed as a duplicate"
    );

    session.proxy().fetch(&list_link, root, "");
    session.run_until_idle().await.expect("session re-run failed");

    assert_eq!(session.fetch_state(&list_spec), Some(EventState::Success));
    assert_eq!(transport.hits(LIST_URL), 2);
    assert_eq!(
        views.openings(),
        vec![
            ViewOpening::Collection {
                title: "Simple Objects".into(),
                rows: 2,
            },
            ViewOpening::Collection {
                title: "Simple Objects".into(),
                rows: 2,
            },
        ]
    );
    let model = session.collection_model(root).expect("collection model");
    assert_eq!(model.rows().len(), 2);
    assert!(model.is_rendered());
}
