//! End-to-end pipeline checks on a synthetic soroban photo.

use soroban_vision::{
    DetectionParams, PreprocessingConfig, SorobanVision, CELLS_PER_LANE,
};
use soroban_vision_core::ColorImage;

const BG: [u8; 3] = [60, 60, 60];
const SLAB: [u8; 3] = [210, 210, 210];
const ROD: [u8; 3] = [90, 90, 90];

/// Flat-lit soroban stand-in: a bright slab on a dark desk with seven dark
/// rods. Slab spans x 90..710, y 70..230 of an 800x300 scene.
fn soroban_scene() -> ColorImage {
    let mut img = ColorImage::filled(800, 300, BG);
    for y in 70..230 {
        for x in 90..710 {
            img.set_pixel(x, y, SLAB);
        }
    }
    let rod_centers: Vec<usize> = (1..=7).map(|i| 90 + i * 620 / 8).collect();
    for &cx in &rod_centers {
        for y in 85..215 {
            for x in cx - 3..cx + 3 {
                img.set_pixel(x, y, ROD);
            }
        }
    }
    img
}

#[test]
fn synthetic_scene_runs_through_to_a_tensor() {
    let mut vision = SorobanVision::default();
    let scene = soroban_scene();
    let result = vision.process_image(&scene.view());

    assert!(result.success, "pipeline failed: {:?}", result.error);
    assert_eq!(result.error, None);
    assert!(result.frame.detected);
    assert!(result.elapsed_ms >= 0.0);

    let bbox = result.frame.bounding_box;
    assert!((bbox.x - 90.0).abs() <= 4.0, "bbox.x = {}", bbox.x);
    assert!((bbox.y - 70.0).abs() <= 4.0, "bbox.y = {}", bbox.y);
    assert!((bbox.width - 620.0).abs() <= 8.0, "bbox.width = {}", bbox.width);
    assert!((bbox.height - 160.0).abs() <= 8.0, "bbox.height = {}", bbox.height);
    assert_eq!(result.frame.confidence, 1.0);
}

#[test]
fn lane_and_cell_counts_stay_consistent() {
    let mut vision = SorobanVision::default();
    let scene = soroban_scene();
    let result = vision.process_image(&scene.view());
    assert!(result.success, "pipeline failed: {:?}", result.error);

    let lane_count = result.frame.lane_count;
    assert!((1..=27).contains(&lane_count), "lane_count = {lane_count}");
    assert_eq!(result.lanes.len() as i32, lane_count);
    assert_eq!(result.total_cells as usize, result.lanes.len() * CELLS_PER_LANE);

    let tensor = result.tensor.as_ref().expect("tensor");
    assert_eq!(tensor.batch as i32, result.total_cells);
    assert_eq!(tensor.channels, 3);
    assert_eq!((tensor.height, tensor.width), (224, 224));
    assert_eq!(tensor.len(), tensor.batch * 3 * 224 * 224);

    // Rightmost lane is digit 0.
    let mut digits: Vec<i32> = result.lanes.iter().map(|l| l.digit_index).collect();
    assert_eq!(digits.first().copied(), Some(lane_count - 1));
    assert_eq!(digits.last().copied(), Some(0));
    digits.sort_unstable();
    assert_eq!(digits, (0..lane_count).collect::<Vec<_>>());
}

#[test]
fn repeated_runs_are_deterministic() {
    let scene = soroban_scene();
    let mut first = SorobanVision::default().process_image(&scene.view());
    let mut second = SorobanVision::default().process_image(&scene.view());
    // Timing differs run to run; everything else must not.
    first.elapsed_ms = 0.0;
    second.elapsed_ms = 0.0;
    assert_eq!(first, second);
}

#[test]
fn last_frame_keeps_the_final_lane_count() {
    let mut vision = SorobanVision::default();
    let scene = soroban_scene();
    let result = vision.process_image(&scene.view());
    assert!(result.success);

    let last = vision.last_frame().expect("last frame");
    assert_eq!(last, &result.frame);
    assert_eq!(last.lane_count, result.frame.lane_count);
}

#[test]
fn featureless_scene_fails_without_a_frame() {
    let mut vision = SorobanVision::default();
    let black = ColorImage::filled(640, 240, [0, 0, 0]);
    let result = vision.process_image(&black.view());
    assert!(!result.success);
    assert!(!result.frame.detected);
    assert_eq!(result.error.map(|e| e.code()), Some(2));
    assert_eq!(result.total_cells, 0);
    assert!(result.tensor.is_none());
}

#[test]
fn custom_config_flows_into_the_tensor_shape() {
    let config = PreprocessingConfig {
        cell_output_size: 64,
        ..PreprocessingConfig::default()
    };
    let mut vision = SorobanVision::new(config, DetectionParams::default());
    let scene = soroban_scene();
    let result = vision.process_image(&scene.view());
    assert!(result.success, "pipeline failed: {:?}", result.error);
    let tensor = result.tensor.expect("tensor");
    assert_eq!((tensor.height, tensor.width), (64, 64));
}
