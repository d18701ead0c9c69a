// 该文件是 Lutan （路探） 项目的一部分。
// src/record.rs - 逐帧记录与帧集合
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

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analyzer::{FrameAnalysis, LaneAnalysis, ShoulderAnalysis};

#[derive(Error, Debug)]
pub enum RecordError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 外部检测器给出的目标
///
/// 字段按原样读取，不做合法性校验。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectedObject {
  pub label: String,
  #[serde(alias = "conf")]
  pub confidence: f32,
  /// [x1, y1, x2, y2] 像素坐标
  pub bbox: [f32; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PavementInfo {
  pub mask_count: u64,
  /// 路面病害掩码的像素总面积
  pub total_mask_area: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneInfo {
  pub line_count: u32,
  pub faded_score: f64,
}

impl From<&LaneAnalysis> for LaneInfo {
  fn from(analysis: &LaneAnalysis) -> Self {
    Self {
      line_count: analysis.line_count,
      faded_score: analysis.faded_score,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoulderInfo {
  pub shoulder_present: bool,
  pub erosion_score: f64,
}

impl From<&ShoulderAnalysis> for ShoulderInfo {
  fn from(analysis: &ShoulderAnalysis) -> Self {
    Self {
      shoulder_present: analysis.shoulder_present,
      erosion_score: analysis.erosion_score,
    }
  }
}

/// 单帧记录，缺失字段一律按零值解码
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameRecord {
  pub objects: Vec<DetectedObject>,
  pub pavement: PavementInfo,
  pub lane: LaneInfo,
  pub shoulder: ShoulderInfo,
}

/// 外部检测器对单帧的输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionEntry {
  pub objects: Vec<DetectedObject>,
  pub pavement: PavementInfo,
}

/// 帧标识到检测结果的映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalDetections(BTreeMap<String, DetectionEntry>);

impl ExternalDetections {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
    let path = path.as_ref();
    info!("加载外部检测结果: {}", path.display());
    let detections: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    info!("外部检测结果共 {} 帧", detections.0.len());
    Ok(detections)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn insert(&mut self, frame_id: impl Into<String>, entry: DetectionEntry) {
    self.0.insert(frame_id.into(), entry);
  }

  /// 检测阶段缺失该帧时返回零值
  pub fn entry(&self, frame_id: &str) -> DetectionEntry {
    match self.0.get(frame_id) {
      Some(entry) => entry.clone(),
      // 未提供检测文件时只在启动时提示一次
      None if self.is_empty() => {
        debug!("帧 {} 没有外部检测结果", frame_id);
        DetectionEntry::default()
      }
      None => {
        warn!("帧 {} 没有外部检测结果，按零值处理", frame_id);
        DetectionEntry::default()
      }
    }
  }
}

/// 组装单帧记录
#[derive(Debug, Default)]
pub struct FrameRecordBuilder {
  detection: DetectionEntry,
  lane: LaneInfo,
  shoulder: ShoulderInfo,
}

impl FrameRecordBuilder {
  pub fn detection(mut self, detection: DetectionEntry) -> Self {
    self.detection = detection;
    self
  }

  pub fn lane(mut self, lane: &LaneAnalysis) -> Self {
    self.lane = lane.into();
    self
  }

  pub fn shoulder(mut self, shoulder: &ShoulderAnalysis) -> Self {
    self.shoulder = shoulder.into();
    self
  }

  pub fn build(self) -> FrameRecord {
    FrameRecord {
      objects: self.detection.objects,
      pavement: self.detection.pavement,
      lane: self.lane,
      shoulder: self.shoulder,
    }
  }
}

/// 一帧的记录连同完整分析结果，供叠加图绘制使用
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedFrame {
  pub id: String,
  pub record: FrameRecord,
  pub analysis: FrameAnalysis,
}

impl AnalyzedFrame {
  pub fn new(id: impl Into<String>, detection: DetectionEntry, analysis: FrameAnalysis) -> Self {
    let record = FrameRecordBuilder::default()
      .detection(detection)
      .lane(&analysis.lane)
      .shoulder(&analysis.shoulder)
      .build();
    Self {
      id: id.into(),
      record,
      analysis,
    }
  }
}

/// 帧标识到记录的映射，按标识排序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameCollection(BTreeMap<String, FrameRecord>);

impl Deref for FrameCollection {
  type Target = BTreeMap<String, FrameRecord>;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl DerefMut for FrameCollection {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.0
  }
}

impl FromIterator<(String, FrameRecord)> for FrameCollection {
  fn from_iter<I: IntoIterator<Item = (String, FrameRecord)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl FrameCollection {
  pub fn from_json(contents: &str) -> Result<Self, RecordError> {
    Ok(serde_json::from_str(contents)?)
  }

  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RecordError> {
    let path = path.as_ref();
    info!("加载帧记录: {}", path.display());
    let collection = Self::from_json(&std::fs::read_to_string(path)?)?;
    info!("帧记录共 {} 帧", collection.len());
    Ok(collection)
  }

  pub fn to_json(&self) -> Result<String, RecordError> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// 以缩进 JSON 写出，必要时创建上级目录
  pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, self.to_json()?)?;
    info!("已保存 {} 帧记录: {}", self.len(), path.display());
    Ok(())
  }

  pub fn records(&self) -> impl Iterator<Item = &FrameRecord> {
    self.0.values()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_sections_decode_to_zero_values() {
    let collection = FrameCollection::from_json(
      r#"{
        "frame_00001.jpg": {},
        "frame_00002.jpg": { "pavement": {}, "lane": { "line_count": 3 } }
      }"#,
    )
    .unwrap();
    assert_eq!(collection["frame_00001.jpg"], FrameRecord::default());
    let second = &collection["frame_00002.jpg"];
    assert_eq!(second.pavement.total_mask_area, 0);
    assert_eq!(second.lane.line_count, 3);
    assert_eq!(second.lane.faded_score, 0.0);
    assert!(!second.shoulder.shoulder_present);
  }

  #[test]
  fn detector_conf_field_is_accepted() {
    let collection = FrameCollection::from_json(
      r#"{ "f1": { "objects": [ { "label": "stop sign", "conf": 0.91, "bbox": [1, 2, 30, 40] } ] } }"#,
    )
    .unwrap();
    let object = &collection["f1"].objects[0];
    assert_eq!(object.label, "stop sign");
    assert_eq!(object.confidence, 0.91);
    assert_eq!(object.bbox, [1.0, 2.0, 30.0, 40.0]);
  }

  #[test]
  fn malformed_values_are_kept_as_is() {
    let collection = FrameCollection::from_json(
      r#"{ "f1": { "objects": [ { "label": "Sign", "confidence": -0.5, "bbox": [30, 40, 1, 2] } ] } }"#,
    )
    .unwrap();
    let object = &collection["f1"].objects[0];
    assert_eq!(object.confidence, -0.5);
    assert_eq!(object.bbox, [30.0, 40.0, 1.0, 2.0]);
  }

  #[test]
  fn collection_serializes_with_field_names() {
    let mut collection = FrameCollection::default();
    collection.insert(
      "f1".to_string(),
      FrameRecordBuilder::default()
        .detection(DetectionEntry {
          objects: vec![],
          pavement: PavementInfo {
            mask_count: 2,
            total_mask_area: 150,
          },
        })
        .build(),
    );
    let value: serde_json::Value = serde_json::from_str(&collection.to_json().unwrap()).unwrap();
    assert_eq!(value["f1"]["pavement"]["total_mask_area"], 150);
    assert_eq!(value["f1"]["lane"]["line_count"], 0);
    assert_eq!(value["f1"]["shoulder"]["shoulder_present"], false);
    assert!(value["f1"]["objects"].as_array().unwrap().is_empty());
  }

  #[test]
  fn builder_combines_all_stages() {
    let lane = LaneAnalysis {
      line_count: 4,
      faded_score: 0.25,
      segments: vec![],
    };
    let shoulder = ShoulderAnalysis {
      shoulder_present: true,
      erosion_score: 0.4,
      ..Default::default()
    };
    let record = FrameRecordBuilder::default()
      .lane(&lane)
      .shoulder(&shoulder)
      .build();
    assert_eq!(record.lane.line_count, 4);
    assert_eq!(record.lane.faded_score, 0.25);
    assert!(record.shoulder.shoulder_present);
    assert_eq!(record.shoulder.erosion_score, 0.4);
    assert_eq!(record.pavement, PavementInfo::default());
  }

  #[test]
  fn unknown_frame_has_zero_detection() {
    let mut detections = ExternalDetections::default();
    detections.insert(
      "a.jpg",
      DetectionEntry {
        objects: vec![DetectedObject {
          label: "bench".to_string(),
          ..Default::default()
        }],
        pavement: PavementInfo::default(),
      },
    );
    assert_eq!(detections.entry("a.jpg").objects.len(), 1);
    assert_eq!(detections.entry("b.jpg"), DetectionEntry::default());
  }

  #[test]
  fn absent_detection_file_yields_zero_entries() {
    let detections = ExternalDetections::default();
    assert!(detections.is_empty());
    assert_eq!(detections.entry("frame_00001.jpg"), DetectionEntry::default());
  }

  #[test]
  fn round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let collection: FrameCollection = [(
      "f1".to_string(),
      FrameRecord {
        lane: LaneInfo {
          line_count: 2,
          faded_score: 0.125,
        },
        ..Default::default()
      },
    )]
    .into_iter()
    .collect();
    std::fs::write(&path, collection.to_json().unwrap()).unwrap();
    assert_eq!(FrameCollection::load(&path).unwrap(), collection);
  }

  #[test]
  fn save_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results/base/frames.json");
    let collection: FrameCollection = [("f1".to_string(), FrameRecord::default())]
      .into_iter()
      .collect();
    collection.save(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), collection.to_json().unwrap());
  }
}
