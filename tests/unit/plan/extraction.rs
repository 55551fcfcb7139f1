use super::*;
use crate::resolve::layer::FrameRef;
use crate::scene::layer::Behavior;

fn range(start: Frame, end: Frame) -> FrameSpan {
    FrameSpan { start, end }
}

fn layers() -> Vec<Layer> {
    vec![
        Layer::new("ink", 1, 3, 7)
            .with_exposures([3, 5])
            .with_behaviors(Behavior::Hold, Behavior::None),
        Layer::new("paint", 2, 1, 10).with_exposures([1, 4, 9]),
        Layer::new("hidden", 3, 1, 10)
            .with_exposures([2])
            .with_visible(false),
        Layer::new("empty", 4, 1, 10),
        Layer::new("late", 5, 1, 3).with_exposures([1]),
    ]
}

#[test]
fn plan_skips_hidden_empty_and_inert_layers() {
    let plan = plan_extraction(&layers(), range(4, 10), &PlanOpts::default());
    let ids: Vec<_> = plan.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["ink", "paint"]);
    assert_eq!(plan.len(), 2);
}

#[test]
fn plan_can_include_hidden_layers() {
    let opts = PlanOpts {
        skip_invisible: false,
        ..PlanOpts::default()
    };
    let plan = plan_extraction(&layers(), range(1, 10), &opts);
    assert!(plan.get("hidden").is_some());
    assert!(plan.get("empty").is_none());
}

#[test]
fn filenames_cover_range_and_use_layer_position() {
    let plan = plan_extraction(&layers(), range(1, 10), &PlanOpts::default());
    let ink = plan.get("ink").unwrap();
    assert_eq!(
        ink.filenames_by_frame_index.keys().copied().collect::<Vec<_>>(),
        (1..=10).collect::<Vec<_>>()
    );
    assert_eq!(ink.filename(1), Some("pos_1.0001.png"));
    assert_eq!(ink.filename(10), Some("pos_1.0010.png"));
    assert_eq!(ink.frames_to_render(), BTreeSet::from([3, 5]));
    assert_eq!(ink.frame_references.get(1), Some(FrameRef::CopyFrom(3)));
    assert_eq!(ink.frame_references.get(9), Some(FrameRef::Transparent));
}

#[test]
fn prefix_and_extension_flow_into_filenames() {
    let opts = PlanOpts {
        prefix: Some("sh010_".to_string()),
        ext: Some(".tif".to_string()),
        skip_invisible: true,
    };
    let plan = plan_extraction(&layers(), range(1, 10), &opts);
    assert_eq!(
        plan.get("paint").unwrap().filename(4),
        Some("sh010_pos_2.0004.tif")
    );
}

#[test]
fn plan_invariants_hold_for_every_layer() {
    let r = range(2, 9);
    let plan = plan_extraction(&layers(), r, &PlanOpts::default());
    for (_, layer_plan) in plan.iter() {
        let refs = layer_plan.frame_references.as_map();
        for (&frame, &target) in refs {
            assert!(r.contains(frame));
            if let Some(t) = target {
                assert_eq!(refs.get(&t), Some(&Some(t)));
            }
            assert!(layer_plan.filename(frame).is_some());
        }
    }
    assert_eq!(
        plan.render_call_count(),
        plan.iter().map(|(_, p)| p.frames_to_render().len()).sum::<usize>()
    );
}

#[test]
fn plan_serializes_to_documented_shape() {
    let plan = plan_extraction(&layers()[..1], range(1, 10), &PlanOpts::default());
    let json: serde_json::Value = serde_json::from_str(&plan.to_json_pretty().unwrap()).unwrap();

    let ink = &json["ink"];
    assert_eq!(ink["frame_references"]["1"], serde_json::json!(3));
    assert_eq!(ink["frame_references"]["3"], serde_json::json!(3));
    assert_eq!(ink["frame_references"]["8"], serde_json::Value::Null);
    assert_eq!(
        ink["filenames_by_frame_index"]["5"],
        serde_json::json!("pos_1.0005.png")
    );

    let back = ExtractionPlan::from_json(&plan.to_json_pretty().unwrap()).unwrap();
    assert_eq!(back, plan);
}
