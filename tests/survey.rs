// 该文件是 Lutan （路探） 项目的一部分。
// tests/survey.rs - 提取与对比的端到端测试
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::{Rgb, RgbImage};
use url::Url;

use lutan::{
  FromUrl,
  analyzer::FrameAnalyzer,
  compare::{ComparisonEngine, Verdict},
  config::{CompareConfig, Config},
  input::InputWrapper,
  output::{OverlayDirectoryOutput, write_json},
  record::{ExternalDetections, FrameCollection},
  task::{CompareTask, ExtractTask, Task},
};

fn load(json: &str) -> FrameCollection {
  FrameCollection::from_json(json).unwrap()
}

#[test]
fn pavement_scenario() {
  let base = load(
    r#"{ "f1": { "pavement": { "total_mask_area": 100 } },
         "f2": { "pavement": { "total_mask_area": 200 } } }"#,
  );
  let present = load(
    r#"{ "f1": { "pavement": { "total_mask_area": 300 } },
         "f2": { "pavement": { "total_mask_area": 300 } } }"#,
  );
  let config = CompareConfig::default();
  let summary = ComparisonEngine::new(&config).compare(&base, &present);

  assert_eq!(summary.pavement.avg_base_area, 150);
  assert_eq!(summary.pavement.avg_present_area, 300);
  assert_eq!(summary.pavement.change_pixels, 150);
  assert_eq!(summary.pavement.percent_change, 100.0);
  assert_eq!(summary.pavement.verdict, Verdict::Worsened);
}

#[test]
fn equal_sign_counts_are_an_improvement() {
  let signs = r#"{
    "f1": { "objects": [ { "label": "Stop Sign" }, { "label": "car" } ] },
    "f2": { "objects": [ { "label": "speed_sign" }, { "label": "SIGNBOARD" } ] }
  }"#;
  let config = CompareConfig::default();
  let summary = ComparisonEngine::new(&config).compare(&load(signs), &load(signs));
  assert_eq!(summary.signs.base_sign_count, 3);
  assert_eq!(summary.signs.present_sign_count, 3);
  assert_eq!(summary.signs.difference, 0);
  assert_eq!(summary.signs.verdict, Verdict::Improved);
}

#[test]
fn empty_collections_give_zero_summary() {
  let config = CompareConfig::default();
  let empty = FrameCollection::default();
  let summary = ComparisonEngine::new(&config).compare(&empty, &empty);
  let value = serde_json::to_value(&summary).unwrap();
  for section in ["pavement", "lane", "signs", "shoulder"] {
    assert_eq!(value[section]["verdict"], "Improved");
  }
  assert_eq!(summary.pavement.percent_change, 0.0);
  assert_eq!(summary.lane.fade_change, 0.0);
  assert_eq!(summary.shoulder.change, 0.0);
}

#[test]
fn repeated_comparison_is_byte_identical() {
  let base = load(
    r#"{ "f2": { "lane": { "line_count": 3, "faded_score": 0.41 }, "shoulder": { "erosion_score": 0.2 } },
         "f1": { "lane": { "line_count": 5, "faded_score": 0.12 }, "shoulder": { "erosion_score": 0.7 } } }"#,
  );
  let present = load(
    r#"{ "f1": { "lane": { "line_count": 2, "faded_score": 0.6 } } }"#,
  );
  let config = CompareConfig::default();
  let engine = ComparisonEngine::new(&config);
  let first = serde_json::to_string_pretty(&engine.compare(&base, &present)).unwrap();
  let second = serde_json::to_string_pretty(&engine.compare(&base, &present)).unwrap();
  assert_eq!(first, second);
}

#[test]
fn extract_then_compare() {
  let dir = tempfile::tempdir().unwrap();
  let frames = dir.path().join("frames");
  std::fs::create_dir(&frames).unwrap();
  for (i, level) in [40u8, 90, 160].into_iter().enumerate() {
    RgbImage::from_fn(120, 80, |x, _| {
      if (55..65).contains(&x) {
        Rgb([255, 255, 255])
      } else {
        Rgb([level, level, level])
      }
    })
    .save(frames.join(format!("frame_{:05}.png", i + 1)))
    .unwrap();
  }
  std::fs::write(frames.join("frame_00004.jpg"), b"truncated").unwrap();

  let detections_path = dir.path().join("detections.json");
  std::fs::write(
    &detections_path,
    r#"{ "frame_00001.png": { "objects": [ { "label": "stop sign", "conf": 0.9, "bbox": [1, 1, 20, 20] } ],
                              "pavement": { "mask_count": 2, "total_mask_area": 400 } } }"#,
  )
  .unwrap();

  let url = Url::parse(&format!("folder://{}", frames.display())).unwrap();
  let input = InputWrapper::from_url(&url).unwrap();
  let overlays = Url::parse(&format!("folder://{}", dir.path().join("overlays").display())).unwrap();
  let collection = ExtractTask::default()
    .with_detections(ExternalDetections::load(&detections_path).unwrap())
    .run_task(
      input.frames(),
      FrameAnalyzer::new(&Config::default()),
      Some(OverlayDirectoryOutput::from_url(&overlays).unwrap()),
    )
    .unwrap();

  assert_eq!(collection.len(), 3);
  assert_eq!(collection["frame_00001.png"].pavement.total_mask_area, 400);
  assert_eq!(collection["frame_00001.png"].objects.len(), 1);
  assert!(collection["frame_00003.png"].shoulder.shoulder_present);
  assert!(dir.path().join("overlays/frame_00002_multi.png").is_file());

  let base_path = dir.path().join("base.json");
  let present_path = dir.path().join("present.json");
  collection.save(&base_path).unwrap();
  write_json(&present_path, &FrameCollection::default()).unwrap();

  let summary = CompareTask::default()
    .run(&base_path, &present_path, dir.path().join("summary.json"))
    .unwrap();
  assert_eq!(summary.signs.base_sign_count, 1);
  assert_eq!(summary.signs.verdict, Verdict::Worsened);
  assert_eq!(summary.pavement.avg_base_area, 133);
  assert_eq!(summary.pavement.verdict, Verdict::Improved);
}
