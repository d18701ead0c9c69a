// 该文件是 Lutan （路探） 项目的一部分。
// src/analyzer/lane.rs - 车道标线分析
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

use image::{GrayImage, Luma, RgbImage, imageops};
use imageproc::{drawing::draw_line_segment_mut, edges::canny};
use tracing::debug;

use crate::{
  analyzer::{Analyzer, HoughParams, LineSegment, clahe, probabilistic_hough},
  config::LaneConfig,
  frame::{mean_intensity, to_intensity},
  stats::{average, round_to},
};

/// 单帧车道标线分析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneAnalysis {
  pub line_count: u32,
  /// 褪色程度 [0, 1]，越大越模糊
  pub faded_score: f64,
  pub segments: Vec<LineSegment>,
}

impl LaneAnalysis {
  /// 在黑色画布上绘制检测到的线段，仅用于可视化
  pub fn render_mask(&self, width: u32, height: u32, thickness: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let half = thickness.max(1) as i32 / 2;
    let span = thickness.max(1) as i32;
    for segment in &self.segments {
      for oy in -half..span - half {
        for ox in -half..span - half {
          draw_line_segment_mut(
            &mut mask,
            ((segment.x1 + ox) as f32, (segment.y1 + oy) as f32),
            ((segment.x2 + ox) as f32, (segment.y2 + oy) as f32),
            Luma([255u8]),
          );
        }
      }
    }
    mask
  }
}

pub struct LaneMarkingAnalyzer {
  config: LaneConfig,
}

impl LaneMarkingAnalyzer {
  pub fn new(config: LaneConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &LaneConfig {
    &self.config
  }

  fn patch_radius(&self, width: u32, height: u32) -> i32 {
    let radius = (width.min(height) as f64 * self.config.patch_radius_ratio) as u32;
    radius.max(self.config.min_patch_radius) as i32
  }

  /// 线段中点附近方块的平均亮度越低，褪色分数越高；没有线段时为 0
  fn faded_score(&self, normalized: &GrayImage, segments: &[LineSegment]) -> f64 {
    let (width, height) = normalized.dimensions();
    let radius = self.patch_radius(width, height);

    let samples: Vec<f64> = segments
      .iter()
      .filter_map(|segment| {
        let (mx, my) = segment.midpoint();
        let x0 = (mx - radius).max(0);
        let y0 = (my - radius).max(0);
        let x1 = (mx + radius).min(width as i32);
        let y1 = (my + radius).min(height as i32);
        if x1 <= x0 || y1 <= y0 {
          return None;
        }
        let patch = imageops::crop_imm(
          normalized,
          x0 as u32,
          y0 as u32,
          (x1 - x0) as u32,
          (y1 - y0) as u32,
        )
        .to_image();
        Some(mean_intensity(&patch) / 255.0)
      })
      .collect();

    if samples.is_empty() {
      return 0.0;
    }
    (1.0 - average(&samples)).max(0.0)
  }
}

impl Analyzer for LaneMarkingAnalyzer {
  type Output = LaneAnalysis;

  fn analyze(&self, image: &RgbImage) -> Self::Output {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
      return LaneAnalysis::default();
    }

    let gray = to_intensity(image);
    // 光照归一化
    let normalized = clahe(
      &gray,
      self.config.clahe_clip_limit,
      self.config.clahe_tile_grid,
    );
    let edges = canny(&normalized, self.config.canny_low, self.config.canny_high);

    let params = HoughParams {
      rho: self.config.hough_rho,
      theta: self.config.hough_theta,
      threshold: self.config.hough_threshold,
      min_line_length: (width as f64 * self.config.min_line_length_ratio) as u32,
      max_line_gap: self.config.max_line_gap,
    };
    let segments = probabilistic_hough(&edges, &params);
    let faded_score = round_to(self.faded_score(&normalized, &segments), 3);

    debug!(
      "车道标线: {} 条线段, 总长 {:.1} 像素, 褪色分数 {:.3}",
      segments.len(),
      segments.iter().map(LineSegment::length).sum::<f32>(),
      faded_score
    );

    LaneAnalysis {
      line_count: segments.len() as u32,
      faded_score,
      segments,
    }
  }
}
