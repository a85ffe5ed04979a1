//! End-to-end tests for the soroban-vision binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Flat-lit slab with seven dark rods, the same scene the pipeline
/// integration tests detect.
fn write_scene_png(path: &std::path::Path) {
    let (w, h) = (800u32, 300u32);
    let mut img = image::RgbImage::from_pixel(w, h, image::Rgb([60, 60, 60]));
    for y in 70..230 {
        for x in 90..710 {
            img.put_pixel(x, y, image::Rgb([210, 210, 210]));
        }
    }
    for i in 1..=7u32 {
        let cx = 90 + i * 620 / 8;
        for y in 85..215 {
            for x in cx - 3..cx + 3 {
                img.put_pixel(x, y, image::Rgb([90, 90, 90]));
            }
        }
    }
    img.save(path).expect("write scene png");
}

#[test]
fn default_config_prints_the_tunable_defaults() {
    let assert = Command::cargo_bin("soroban-vision")
        .expect("binary builds")
        .arg("default-config")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let doc: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(doc["config"]["target_long_edge"], 1280);
    assert_eq!(doc["config"]["cell_output_size"], 224);
    assert_eq!(doc["params"]["hough_threshold"], 80);
    assert_eq!(doc["params"]["max_lane_count"], 27);
}

#[test]
fn detect_writes_report_and_overlay_for_a_synthetic_scene() {
    let dir = TempDir::new().expect("tempdir");
    let image_path = dir.path().join("scene.png");
    let report_path = dir.path().join("report.json");
    let overlay_path = dir.path().join("overlay.png");
    write_scene_png(&image_path);

    Command::cargo_bin("soroban-vision")
        .expect("binary builds")
        .arg("-v")
        .args(["detect", "--image"])
        .arg(&image_path)
        .arg("--report")
        .arg(&report_path)
        .arg("--overlay")
        .arg(&overlay_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("report written"))
            .expect("valid report JSON");
    assert_eq!(report["success"], true);
    assert_eq!(report["frame"]["detected"], true);
    assert!(report["total_cells"].as_i64().expect("cell count") >= 5);

    let overlay = image::open(&overlay_path).expect("overlay written");
    assert_eq!((overlay.width(), overlay.height()), (800, 300));
}

#[test]
fn undetected_frame_exits_one_and_prints_the_report() {
    let dir = TempDir::new().expect("tempdir");
    let image_path = dir.path().join("black.png");
    image::RgbImage::new(320, 240)
        .save(&image_path)
        .expect("write png");

    let assert = Command::cargo_bin("soroban-vision")
        .expect("binary builds")
        .args(["detect", "--image"])
        .arg(&image_path)
        .assert()
        .code(1);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid report JSON");
    assert_eq!(report["success"], false);
    assert_eq!(report["frame"]["detected"], false);
}

#[test]
fn missing_image_is_a_hard_error() {
    Command::cargo_bin("soroban-vision")
        .expect("binary builds")
        .args(["detect", "--image", "no-such-file.png"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn config_file_overrides_the_tensor_size() {
    let dir = TempDir::new().expect("tempdir");
    let image_path = dir.path().join("scene.png");
    let config_path = dir.path().join("config.json");
    write_scene_png(&image_path);
    std::fs::write(&config_path, r#"{ "cell_output_size": 64 }"#).expect("write config");

    let assert = Command::cargo_bin("soroban-vision")
        .expect("binary builds")
        .args(["detect", "--image"])
        .arg(&image_path)
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid report JSON");
    assert_eq!(report["tensor_shape"][2], 64);
    assert_eq!(report["tensor_shape"][3], 64);
}
