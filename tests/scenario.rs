//! End-to-end editing scenarios

use iso_diagram::{Batch, Diagram, DiagramError, NewShape, ShapeId, Slot};
use pretty_assertions::assert_eq;

fn cell_of(diagram: &Diagram, id: &ShapeId) -> String {
    diagram
        .get_by_id(id)
        .and_then(|s| s.position)
        .map(|p| p.code())
        .unwrap_or_default()
}

#[test]
fn test_platform_layer_grows_once() {
    let mut diagram = Diagram::default();

    let l1 = diagram
        .add_shape(NewShape::layer("layer2x2").named("Platform").at("top"))
        .expect("first layer")
        .clone();
    assert_eq!(l1.position, Some(Slot::Top));
    assert_eq!(l1.relative_to, None);

    let iam = diagram
        .add_shape(
            NewShape::component("server")
                .relative_to(l1.id.clone())
                .named("IAM")
                .at("top"),
        )
        .expect("IAM")
        .id
        .clone();
    assert_eq!(cell_of(&diagram, &iam), "top-a1");

    let mut ids = vec![iam];
    let mut templates = vec![];
    for n in 2..=8 {
        let id = diagram
            .add_shape(
                NewShape::component("server")
                    .relative_to(l1.id.clone())
                    .named(format!("Svc {n}")),
            )
            .expect("component")
            .id
            .clone();
        ids.push(id);
        templates.push(diagram.get_by_id(&l1.id).unwrap().shape_template.clone());
    }

    // exactly one resize, on the fifth component
    assert_eq!(
        templates,
        vec!["layer2x2", "layer2x2", "layer2x2", "layer4x2", "layer4x2", "layer4x2", "layer4x2"]
    );

    let cells: Vec<String> = ids.iter().map(|id| cell_of(&diagram, id)).collect();
    assert_eq!(
        cells,
        vec!["top-a1", "top-a2", "top-a3", "top-a4", "top-b1", "top-b2", "top-b3", "top-b4"]
    );

    insta::assert_snapshot!(diagram.scene().to_string().trim_end(), @r#"
layer2x2-1 layer layer4x2 rel=- pos=top name="Platform"
server-2 component server rel=layer2x2-1 pos=top-a1 name="IAM"
server-3 component server rel=layer2x2-1 pos=top-a2 name="Svc 2"
server-4 component server rel=layer2x2-1 pos=top-a3 name="Svc 3"
server-5 component server rel=layer2x2-1 pos=top-a4 name="Svc 4"
server-6 component server rel=layer2x2-1 pos=top-b1 name="Svc 5"
server-7 component server rel=layer2x2-1 pos=top-b2 name="Svc 6"
server-8 component server rel=layer2x2-1 pos=top-b3 name="Svc 7"
server-9 component server rel=layer2x2-1 pos=top-b4 name="Svc 8"
"#);
}

#[test]
fn test_move_decorator_between_parents() {
    let mut diagram = Diagram::default();
    let a = diagram
        .add_shape(NewShape::component("server").with_decorator("icon-x"))
        .unwrap()
        .id
        .clone();
    let b = diagram
        .add_shape(NewShape::component("server").with_decorator("icon-y"))
        .unwrap()
        .id
        .clone();

    let moved = diagram.move_decorator(&a, "icon-x", &b).unwrap();
    assert!(moved.is_some());

    let parent_a = diagram.get_by_id(&a).unwrap();
    let parent_b = diagram.get_by_id(&b).unwrap();
    assert!(!parent_a.has_decorator("icon-x"));
    let count = parent_b
        .attached_decorators
        .iter()
        .filter(|d| d.decorator_name == "icon-x")
        .count();
    assert_eq!(count, 1);
    assert!(parent_b.has_decorator("icon-y"));
}

#[test]
fn test_remove_then_lookup() {
    let mut diagram = Diagram::default();
    let id = diagram.add_shape(NewShape::component("server")).unwrap().id.clone();
    let before = diagram.get_all().len();

    let removed = diagram.remove_shape(&id).expect("shape should be removed");
    assert_eq!(removed.id, id);
    assert!(diagram.get_by_id(&id).is_none());
    assert_eq!(diagram.get_all().len(), before - 1);

    let after = diagram.get_all().len();
    assert!(diagram.remove_shape(&id).is_none());
    assert!(diagram.remove_shape(&ShapeId::new("never-existed")).is_none());
    assert_eq!(diagram.get_all().len(), after);
}

#[test]
fn test_move_component_between_layers() {
    let mut diagram = Diagram::default();
    let l1 = diagram.add_shape(NewShape::layer("layer2x2")).unwrap().id.clone();
    let s1 = diagram
        .add_shape(NewShape::component("server").relative_to(l1.clone()))
        .unwrap()
        .id
        .clone();
    let l2 = diagram.add_shape(NewShape::layer("layer2x2")).unwrap().id.clone();

    let moved = diagram
        .move_shape(&s1, Some(l2.clone()), Some("top-b1"))
        .unwrap()
        .unwrap();
    assert_eq!(moved.relative_to.as_ref(), Some(&l2));
    assert_eq!(moved.position.unwrap().code(), "top-b1");

    // a move without a layer is ambiguous once two layers exist
    let err = diagram.move_shape(&s1, None, None).unwrap_err();
    assert!(matches!(err, DiagramError::AmbiguousLayerReference { .. }));
    assert_eq!(
        diagram.get_by_id(&s1).unwrap().relative_to.as_ref(),
        Some(&l2)
    );
}

#[test]
fn test_moving_into_full_layer_resizes_it() {
    let mut diagram = Diagram::default();
    let l1 = diagram.add_shape(NewShape::layer("layer2x2")).unwrap().id.clone();
    for _ in 0..4 {
        diagram
            .add_shape(NewShape::component("server").relative_to(l1.clone()))
            .unwrap();
    }
    let l2 = diagram.add_shape(NewShape::layer("layer2x2")).unwrap().id.clone();
    let outsider = diagram
        .add_shape(NewShape::component("server").relative_to(l2.clone()))
        .unwrap()
        .id
        .clone();

    diagram
        .move_shape(&outsider, Some(l1.clone()), Some("top-a1"))
        .unwrap();

    assert_eq!(diagram.get_by_id(&l1).unwrap().shape_template, "layer4x2");
    assert_eq!(cell_of(&diagram, &outsider), "top-b1");
}

#[test]
fn test_batch_fixture_stops_at_first_fatal_error() {
    let batch = Batch::from_toml_str(include_str!("fixtures/platform_batch.toml"))
        .expect("fixture should parse");
    let mut diagram = Diagram::default();
    let report = diagram.apply_batch(&batch.operations);

    assert_eq!(report.applied, 6);
    let failure = report.failure.expect("the orphan add should fail");
    assert_eq!(failure.index, 6);
    assert!(matches!(failure.error, DiagramError::AmbiguousLayerReference { .. }));

    insta::assert_snapshot!(diagram.scene().to_string().trim_end(), @r#"
layer2x2-1 layer layer2x2 rel=- pos=top name="Platform"
server-2 component server rel=layer2x2-1 pos=top-a1 name="IAM"
database-3 component database rel=layer2x2-1 pos=top-a2 name="Identity Store" decorators=[icon-lock]
layer2x2-4 layer layer2x2 rel=layer2x2-1 pos=front-left name="Data Lake"
"#);

    let store = diagram.resolve_reference("Identity Store");
    assert_eq!(
        diagram.get_by_id(&store).unwrap().metadata.extra["serviceName"],
        serde_json::json!("Identity Store")
    );
}

#[test]
fn test_scene_json_round_trip_through_diagram() {
    let mut diagram = Diagram::default();
    diagram
        .add_shape(NewShape::component("server").named("IAM").with_decorator("icon"))
        .unwrap();
    let json = diagram.to_json().unwrap();

    let restored = Diagram::from_json(&json, Default::default()).unwrap();
    assert_eq!(restored.get_all(), diagram.get_all());
}
