use super::*;

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::foundation::core::Canvas;
use crate::scene::layer::{Behavior, Layer};

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "celcomp_extract_{tag}_{}_{nanos}",
        std::process::id()
    ))
}

fn solid_renderer(_layer_id: &str, frame: Frame, dst: &Path) -> anyhow::Result<()> {
    RgbaImage::from_pixel(4, 4, Rgba([(frame * 10) as u8, 0, 0, 255])).save(dst)?;
    Ok(())
}

fn scene() -> Scene {
    Scene {
        mark_in: 1,
        mark_out: 10,
        canvas: Some(Canvas {
            width: 4,
            height: 4,
        }),
        layers: vec![
            Layer::new("ink", 0, 3, 7)
                .with_exposures([3, 5])
                .with_behaviors(Behavior::Hold, Behavior::None),
        ],
    }
}

#[test]
fn export_frames_must_be_inside_the_range() {
    let range = FrameSpan { start: 1, end: 10 };
    assert!(validated_export_frames(None, range).unwrap().is_none());
    assert!(validated_export_frames(Some(&BTreeSet::new()), range).is_err());
    assert!(validated_export_frames(Some(&BTreeSet::from([0, 3])), range).is_err());
    assert_eq!(
        validated_export_frames(Some(&BTreeSet::from([1, 10])), range)
            .unwrap()
            .map(BTreeSet::len),
        Some(2)
    );
}

#[test]
fn scene_without_exposures_is_an_empty_plan() {
    let mut scene = scene();
    scene.layers = vec![Layer::new("blank", 0, 1, 10)];
    let err = extract_sequence(&scene, &solid_renderer, &ExtractOpts::new(scratch_dir("empty")))
        .unwrap_err();
    assert!(matches!(err, CelError::EmptyPlan));
}

#[test]
fn background_requires_a_canvas() {
    let mut scene = scene();
    scene.canvas = None;
    let opts = ExtractOpts {
        background: Some([0, 0, 0]),
        ..ExtractOpts::new(scratch_dir("nocanvas"))
    };
    let err = extract_sequence(&scene, &solid_renderer, &opts).unwrap_err();
    assert!(matches!(err, CelError::Validation(_)));
}

#[test]
fn single_layer_run_renumbers_and_cleans_up() {
    let dir = scratch_dir("single");
    let opts = ExtractOpts {
        output_frame_start: Some(1001),
        thumbnail: true,
        ..ExtractOpts::new(&dir)
    };

    let out = extract_sequence(&scene(), &solid_renderer, &opts).unwrap();
    assert_eq!(out.files.len(), 10);
    assert_eq!(out.files[&1001], dir.join("render.1001.png"));
    assert_eq!(out.files[&1010], dir.join("render.1010.png"));
    assert_eq!(out.stats.render.rendered, 2);
    assert_eq!(out.stats.transparent_frames, 3);
    assert_eq!(out.thumbnail, Some(dir.join(THUMBNAIL_NAME)));

    let first = image::open(&out.files[&1001]).unwrap().into_rgba8();
    assert_eq!(first.get_pixel(0, 0).0, [30, 0, 0, 255]);
    assert!(!dir.join("pos_0.0003.png").exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn negative_output_start_clamps_to_zero() {
    let dir = scratch_dir("negative");
    let opts = ExtractOpts {
        output_frame_start: Some(-5),
        ..ExtractOpts::new(&dir)
    };
    let out = extract_sequence(&scene(), &solid_renderer, &opts).unwrap();
    assert_eq!(out.files.keys().next(), Some(&0));
    assert_eq!(out.files.keys().last(), Some(&9));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn export_subset_keeps_original_numbering() {
    let dir = scratch_dir("subset");
    let opts = ExtractOpts {
        output_frame_start: Some(100),
        export_frames: Some(BTreeSet::from([2, 6])),
        keep_intermediates: true,
        ..ExtractOpts::new(&dir)
    };
    let out = extract_sequence(&scene(), &solid_renderer, &opts).unwrap();
    assert_eq!(out.files.keys().copied().collect::<Vec<_>>(), vec![2, 6]);
    assert_eq!(out.stats.render.rendered, 2);
    assert!(dir.join("pos_0.0002.png").exists());

    let frame6 = image::open(&out.files[&6]).unwrap().into_rgba8();
    assert_eq!(frame6.get_pixel(0, 0).0, [50, 0, 0, 255]);

    let _ = std::fs::remove_dir_all(dir);
}
