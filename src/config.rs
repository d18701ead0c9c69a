// 该文件是 Lutan （路探） 项目的一部分。
// src/config.rs - 分析参数配置
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

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
}

/// 车道标线分析参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
  /// CLAHE 对比度限制
  pub clahe_clip_limit: f32,
  /// CLAHE 分块数 (列, 行)
  pub clahe_tile_grid: (u32, u32),
  pub canny_low: f32,
  pub canny_high: f32,
  /// 霍夫距离分辨率（像素）
  pub hough_rho: f32,
  /// 霍夫角度分辨率（弧度）
  pub hough_theta: f32,
  /// 霍夫累加器票数阈值
  pub hough_threshold: u32,
  /// 最短线段长度占图像宽度的比例
  pub min_line_length_ratio: f64,
  /// 共线线段之间允许的最大间隙（像素）
  pub max_line_gap: u32,
  /// 亮度采样半径占 min(宽, 高) 的比例
  pub patch_radius_ratio: f64,
  pub min_patch_radius: u32,
  /// 可视化掩码的线宽
  pub mask_thickness: u32,
}

impl Default for LaneConfig {
  fn default() -> Self {
    Self {
      clahe_clip_limit: 2.0,
      clahe_tile_grid: (8, 8),
      canny_low: 50.0,
      canny_high: 150.0,
      hough_rho: 1.0,
      hough_theta: std::f32::consts::PI / 180.0,
      hough_threshold: 50,
      min_line_length_ratio: 0.05,
      max_line_gap: 20,
      patch_radius_ratio: 0.01,
      min_patch_radius: 2,
      mask_thickness: 4,
    }
  }
}

/// 路肩状况分析参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoulderConfig {
  /// 底角 ROI 宽度占图像宽度的比例
  pub roi_width_ratio: f64,
  /// 底角 ROI 高度占图像高度的比例
  pub roi_height_ratio: f64,
  pub canny_low: f32,
  pub canny_high: f32,
  /// 任一侧平均亮度超过该值即认为存在路肩
  pub brightness_threshold: f64,
  /// 边缘密度到侵蚀分数的缩放系数
  pub erosion_scale: f64,
}

impl Default for ShoulderConfig {
  fn default() -> Self {
    Self {
      roi_width_ratio: 0.2,
      roi_height_ratio: 0.2,
      canny_low: 50.0,
      canny_high: 150.0,
      brightness_threshold: 0.15,
      erosion_scale: 3.0,
    }
  }
}

/// 前后两次巡检对比参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
  /// 基线平均面积不超过该值时不计算百分比变化
  pub min_base_area: f64,
  /// 褪色变化的死区，超过才判定为恶化
  pub fade_dead_zone: f64,
  /// 标志牌标签关键字（不区分大小写）
  pub sign_keyword: String,
}

impl Default for CompareConfig {
  fn default() -> Self {
    Self {
      min_base_area: 1.0,
      fade_dead_zone: 0.05,
      sign_keyword: "sign".to_string(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub lane: LaneConfig,
  pub shoulder: ShoulderConfig,
  pub compare: CompareConfig,
}

impl Config {
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    info!("加载配置文件: {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    Self::from_json(&contents)
  }

  pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(contents)?)
  }

  /// 未指定配置文件时使用默认参数
  pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
    match path {
      Some(path) => Self::load(path),
      None => Ok(Self::default()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config, Config::default());
  }

  #[test]
  fn partial_override_keeps_other_defaults() {
    let config = Config::from_json(
      r#"{ "lane": { "hough_threshold": 80 }, "compare": { "fade_dead_zone": 0.1 } }"#,
    )
    .unwrap();
    assert_eq!(config.lane.hough_threshold, 80);
    assert_eq!(config.lane.max_line_gap, 20);
    assert_eq!(config.compare.fade_dead_zone, 0.1);
    assert_eq!(config.compare.sign_keyword, "sign");
    assert_eq!(config.shoulder, ShoulderConfig::default());
  }

  #[test]
  fn malformed_document_is_an_error() {
    assert!(matches!(
      Config::from_json("{ lane: "),
      Err(ConfigError::ParseError(_))
    ));
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(ConfigError::IoError(_))));
  }

  #[test]
  fn no_path_means_defaults() {
    let config = Config::load_or_default(None::<&str>).unwrap();
    assert_eq!(config.shoulder.erosion_scale, 3.0);
  }
}
