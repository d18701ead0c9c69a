// 该文件是 Lutan （路探） 项目的一部分。
// src/analyzer.rs - 单帧特征分析
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

use image::RgbImage;

use crate::config::Config;

/// 单帧分析器
///
/// 每次调用只读取一帧图像与自身的不可变参数，可在多个线程间共享。
pub trait Analyzer: Sync {
  type Output;

  fn analyze(&self, image: &RgbImage) -> Self::Output;
}

mod clahe;
mod hough;
mod lane;
mod shoulder;

pub use self::clahe::clahe;
pub use self::hough::{HoughParams, LineSegment, probabilistic_hough};
pub use self::lane::{LaneAnalysis, LaneMarkingAnalyzer};
pub use self::shoulder::{RoiStats, ShoulderAnalysis, ShoulderConditionAnalyzer};

/// 单帧全部分析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameAnalysis {
  pub lane: LaneAnalysis,
  pub shoulder: ShoulderAnalysis,
}

/// 依次运行车道标线与路肩分析
pub struct FrameAnalyzer {
  lane: LaneMarkingAnalyzer,
  shoulder: ShoulderConditionAnalyzer,
}

impl FrameAnalyzer {
  pub fn new(config: &Config) -> Self {
    Self {
      lane: LaneMarkingAnalyzer::new(config.lane.clone()),
      shoulder: ShoulderConditionAnalyzer::new(config.shoulder.clone()),
    }
  }

  pub fn lane(&self) -> &LaneMarkingAnalyzer {
    &self.lane
  }

  pub fn shoulder(&self) -> &ShoulderConditionAnalyzer {
    &self.shoulder
  }
}

impl Analyzer for FrameAnalyzer {
  type Output = FrameAnalysis;

  fn analyze(&self, image: &RgbImage) -> Self::Output {
    FrameAnalysis {
      lane: self.lane.analyze(image),
      shoulder: self.shoulder.analyze(image),
    }
  }
}
