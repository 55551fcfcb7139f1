use super::*;

use crate::foundation::core::FrameSpan;
use crate::plan::extraction::{PlanOpts, plan_extraction};
use crate::render::layer::render_layer;
use crate::scene::layer::Layer;

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "celcomp_gaps_{tag}_{}_{nanos}",
        std::process::id()
    ))
}

fn write_label(layer_id: &str, frame: Frame, dst: &Path) -> anyhow::Result<()> {
    std::fs::write(dst, format!("{layer_id}:{frame}"))?;
    Ok(())
}

#[test]
fn leading_gap_takes_the_first_file() {
    let dir = scratch_dir("leading");
    let range = FrameSpan { start: 2, end: 10 };
    let layers = vec![Layer::new("bg", 0, 1, 10).with_exposures([4, 8])];
    let plan = plan_extraction(&layers, range, &PlanOpts::default());
    let layer_plan = plan.get("bg").unwrap();

    let mut rendered = render_layer(&write_label, "bg", layer_plan, &dir, None).unwrap();
    assert!(!rendered.files.contains_key(&2));
    assert!(!rendered.files.contains_key(&3));

    let frames: BTreeSet<Frame> = range.frames().collect();
    let filled = fill_sequence_gaps(&mut rendered.files, layer_plan, &dir, &frames).unwrap();
    assert_eq!(filled, 2);
    for frame in [2, 3] {
        let path = rendered.files[&frame].as_ref().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "bg:4");
    }

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn trailing_gap_takes_the_previous_file_and_nulls_stay_transparent() {
    let dir = scratch_dir("trailing");
    std::fs::create_dir_all(&dir).unwrap();
    let layers = vec![Layer::new("fx", 3, 1, 5).with_exposures([1, 3])];
    let plan = plan_extraction(&layers, FrameSpan { start: 1, end: 5 }, &PlanOpts::default());
    let layer_plan = plan.get("fx").unwrap();

    let one = dir.join("one.png");
    let three = dir.join("three.png");
    std::fs::write(&one, "fx:1").unwrap();
    std::fs::write(&three, "fx:3").unwrap();
    let mut files = LayerFiles::from([
        (1, Some(one)),
        (2, None),
        (3, Some(three)),
    ]);

    let frames = BTreeSet::from([1, 2, 3, 4, 5]);
    let filled = fill_sequence_gaps(&mut files, layer_plan, &dir, &frames).unwrap();
    assert_eq!(filled, 2);
    assert_eq!(files[&2], None);
    assert_eq!(files[&5], Some(dir.join("pos_3.0005.png")));
    assert_eq!(
        std::fs::read_to_string(files[&4].as_ref().unwrap()).unwrap(),
        "fx:3"
    );

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn layer_without_files_is_left_alone() {
    let layers = vec![Layer::new("fx", 3, 1, 5).with_exposures([1])];
    let plan = plan_extraction(&layers, FrameSpan { start: 1, end: 5 }, &PlanOpts::default());
    let mut files = LayerFiles::from([(1, None), (2, None)]);

    let filled = fill_sequence_gaps(
        &mut files,
        plan.get("fx").unwrap(),
        &scratch_dir("none"),
        &BTreeSet::from([1, 2, 3]),
    )
    .unwrap();
    assert_eq!(filled, 0);
    assert_eq!(files.len(), 2);
}

#[test]
fn missing_gap_source_is_an_io_error() {
    let dir = scratch_dir("missing");
    let layers = vec![Layer::new("fx", 3, 1, 5).with_exposures([1])];
    let plan = plan_extraction(&layers, FrameSpan { start: 1, end: 5 }, &PlanOpts::default());
    let mut files = LayerFiles::from([(1, Some(dir.join("gone.png")))]);

    let err = fill_sequence_gaps(
        &mut files,
        plan.get("fx").unwrap(),
        &dir,
        &BTreeSet::from([1, 2]),
    )
    .unwrap_err();
    assert!(matches!(err, CelError::Io { .. }));
}
