// 该文件是 Lutan （路探） 项目的一部分。
// src/analyzer/shoulder.rs - 路肩状况分析
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

use image::{GrayImage, RgbImage, imageops};
use imageproc::{edges::canny, rect::Rect};
use tracing::debug;

use crate::{
  analyzer::Analyzer,
  config::ShoulderConfig,
  frame::{mean_intensity, to_intensity},
  stats::round_to,
};

/// 单侧 ROI 的统计量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoiStats {
  /// Canny 边缘图的平均值 [0, 255]
  pub edge_density: f64,
  /// 平均亮度 [0, 1]
  pub mean_brightness: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShoulderAnalysis {
  pub shoulder_present: bool,
  /// 侵蚀分数 [0, 1]，越大越严重
  pub erosion_score: f64,
  pub left: RoiStats,
  pub right: RoiStats,
  /// 左、右 ROI 在原图中的位置
  pub regions: [Option<Rect>; 2],
}

pub struct ShoulderConditionAnalyzer {
  config: ShoulderConfig,
}

impl ShoulderConditionAnalyzer {
  pub fn new(config: ShoulderConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &ShoulderConfig {
    &self.config
  }

  /// 左下角与右下角的 ROI，尺寸为零时返回 None
  pub fn regions(&self, width: u32, height: u32) -> (Option<Rect>, Option<Rect>) {
    let margin_w = (width as f64 * self.config.roi_width_ratio) as u32;
    let margin_h = (height as f64 * self.config.roi_height_ratio) as u32;
    if margin_w == 0 || margin_h == 0 {
      return (None, None);
    }
    let top = (height - margin_h) as i32;
    (
      Some(Rect::at(0, top).of_size(margin_w, margin_h)),
      Some(Rect::at((width - margin_w) as i32, top).of_size(margin_w, margin_h)),
    )
  }

  fn roi_stats(&self, gray: &GrayImage, region: Option<Rect>) -> RoiStats {
    let Some(region) = region else {
      return RoiStats::default();
    };
    let roi = imageops::crop_imm(
      gray,
      region.left() as u32,
      region.top() as u32,
      region.width(),
      region.height(),
    )
    .to_image();
    if roi.width() == 0 || roi.height() == 0 {
      return RoiStats::default();
    }

    let edges = canny(&roi, self.config.canny_low, self.config.canny_high);
    RoiStats {
      edge_density: mean_intensity(&edges),
      mean_brightness: mean_intensity(&roi) / 255.0,
    }
  }
}

impl Analyzer for ShoulderConditionAnalyzer {
  type Output = ShoulderAnalysis;

  fn analyze(&self, image: &RgbImage) -> Self::Output {
    let (width, height) = image.dimensions();
    let gray = to_intensity(image);
    let (left_region, right_region) = self.regions(width, height);
    let left = self.roi_stats(&gray, left_region);
    let right = self.roi_stats(&gray, right_region);

    // 纹理异常是局部的，取边缘更密集的一侧
    let density = left.edge_density.max(right.edge_density);
    let erosion_score = round_to((density * self.config.erosion_scale).min(1.0), 3);
    let threshold = self.config.brightness_threshold;
    let shoulder_present = left.mean_brightness > threshold || right.mean_brightness > threshold;

    debug!(
      "路肩: 存在={}, 侵蚀分数 {:.3} (左 {:?}, 右 {:?})",
      shoulder_present, erosion_score, left, right
    );

    ShoulderAnalysis {
      shoulder_present,
      erosion_score,
      left,
      right,
      regions: [left_region, right_region],
    }
  }
}
