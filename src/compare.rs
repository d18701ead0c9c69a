// 该文件是 Lutan （路探） 项目的一部分。
// src/compare.rs - 前后两次巡检对比
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

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  config::CompareConfig,
  record::{FrameCollection, FrameRecord},
  stats::{average, round_to},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
  Improved,
  Worsened,
}

impl fmt::Display for Verdict {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Verdict::Improved => write!(f, "Improved"),
      Verdict::Worsened => write!(f, "Worsened"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PavementSummary {
  pub avg_base_area: i64,
  pub avg_present_area: i64,
  pub change_pixels: i64,
  pub percent_change: f64,
  pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSummary {
  pub avg_base_lines: f64,
  pub avg_present_lines: f64,
  pub line_change: f64,
  pub avg_base_fade: f64,
  pub avg_present_fade: f64,
  pub fade_change: f64,
  pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignsSummary {
  pub base_sign_count: u64,
  pub present_sign_count: u64,
  pub difference: i64,
  pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoulderSummary {
  pub avg_base_erosion: f64,
  pub avg_present_erosion: f64,
  pub change: f64,
  pub verdict: Verdict,
}

/// 四个类别的对比结论
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
  pub pavement: PavementSummary,
  pub lane: LaneSummary,
  pub signs: SignsSummary,
  pub shoulder: ShoulderSummary,
}

/// 对比引擎
///
/// 纯函数：只读取两份帧集合，各类别互不依赖。
pub struct ComparisonEngine<'a> {
  config: &'a CompareConfig,
}

impl<'a> ComparisonEngine<'a> {
  pub fn new(config: &'a CompareConfig) -> Self {
    Self { config }
  }

  pub fn compare(&self, base: &FrameCollection, present: &FrameCollection) -> ComparisonSummary {
    debug!("对比基线 {} 帧与当前 {} 帧", base.len(), present.len());
    ComparisonSummary {
      pavement: self.compare_pavement(base, present),
      lane: self.compare_lane(base, present),
      signs: self.compare_signs(base, present),
      shoulder: self.compare_shoulder(base, present),
    }
  }

  /// 病害面积增加即为恶化
  pub fn compare_pavement(
    &self,
    base: &FrameCollection,
    present: &FrameCollection,
  ) -> PavementSummary {
    let area = |c: &FrameCollection| average_of(c, |r| r.pavement.total_mask_area as f64);
    let avg_base = area(base);
    let avg_present = area(present);
    let change = avg_present - avg_base;
    let percent = if avg_base > self.config.min_base_area {
      change / avg_base * 100.0
    } else {
      0.0
    };

    PavementSummary {
      avg_base_area: avg_base as i64,
      avg_present_area: avg_present as i64,
      change_pixels: change as i64,
      percent_change: round_to(percent, 2),
      verdict: worsened_if(change > 0.0),
    }
  }

  /// 只有褪色变化超过死区才判定恶化，线段数量仅作参考
  pub fn compare_lane(&self, base: &FrameCollection, present: &FrameCollection) -> LaneSummary {
    let lines = |c: &FrameCollection| average_of(c, |r| r.lane.line_count as f64);
    let fade = |c: &FrameCollection| average_of(c, |r| r.lane.faded_score);
    let (base_lines, present_lines) = (lines(base), lines(present));
    let (base_fade, present_fade) = (fade(base), fade(present));
    let fade_change = present_fade - base_fade;

    LaneSummary {
      avg_base_lines: round_to(base_lines, 2),
      avg_present_lines: round_to(present_lines, 2),
      line_change: round_to(present_lines - base_lines, 2),
      avg_base_fade: round_to(base_fade, 3),
      avg_present_fade: round_to(present_fade, 3),
      fade_change: round_to(fade_change, 3),
      verdict: worsened_if(fade_change > self.config.fade_dead_zone),
    }
  }

  /// 标志数量不减少即视为改善
  pub fn compare_signs(&self, base: &FrameCollection, present: &FrameCollection) -> SignsSummary {
    let base_count = self.count_signs(base);
    let present_count = self.count_signs(present);

    SignsSummary {
      base_sign_count: base_count,
      present_sign_count: present_count,
      difference: present_count as i64 - base_count as i64,
      verdict: worsened_if(present_count < base_count),
    }
  }

  pub fn compare_shoulder(
    &self,
    base: &FrameCollection,
    present: &FrameCollection,
  ) -> ShoulderSummary {
    let erosion = |c: &FrameCollection| average_of(c, |r| r.shoulder.erosion_score);
    let avg_base = erosion(base);
    let avg_present = erosion(present);
    let change = avg_present - avg_base;

    ShoulderSummary {
      avg_base_erosion: round_to(avg_base, 3),
      avg_present_erosion: round_to(avg_present, 3),
      change: round_to(change, 3),
      verdict: worsened_if(change > 0.0),
    }
  }

  fn count_signs(&self, collection: &FrameCollection) -> u64 {
    let keyword = self.config.sign_keyword.to_lowercase();
    collection
      .records()
      .flat_map(|record| record.objects.iter())
      .filter(|object| object.label.to_lowercase().contains(&keyword))
      .count() as u64
  }
}

fn average_of<F>(collection: &FrameCollection, field: F) -> f64
where
  F: Fn(&FrameRecord) -> f64,
{
  let values: Vec<f64> = collection.records().map(field).collect();
  average(&values)
}

fn worsened_if(worse: bool) -> Verdict {
  if worse {
    Verdict::Worsened
  } else {
    Verdict::Improved
  }
}

impl fmt::Display for ComparisonSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let p = &self.pavement;
    writeln!(f, "Pavement Condition")?;
    writeln!(f, "  avg_base_area: {}", p.avg_base_area)?;
    writeln!(f, "  avg_present_area: {}", p.avg_present_area)?;
    writeln!(f, "  change_pixels: {}", p.change_pixels)?;
    writeln!(f, "  percent_change: {}", p.percent_change)?;
    writeln!(f, "  verdict: {}", p.verdict)?;

    let l = &self.lane;
    writeln!(f, "Lane Markings")?;
    writeln!(f, "  avg_base_lines: {}", l.avg_base_lines)?;
    writeln!(f, "  avg_present_lines: {}", l.avg_present_lines)?;
    writeln!(f, "  line_change: {}", l.line_change)?;
    writeln!(f, "  avg_base_fade: {}", l.avg_base_fade)?;
    writeln!(f, "  avg_present_fade: {}", l.avg_present_fade)?;
    writeln!(f, "  fade_change: {}", l.fade_change)?;
    writeln!(f, "  verdict: {}", l.verdict)?;

    let s = &self.signs;
    writeln!(f, "Road Signs")?;
    writeln!(f, "  base_sign_count: {}", s.base_sign_count)?;
    writeln!(f, "  present_sign_count: {}", s.present_sign_count)?;
    writeln!(f, "  difference: {}", s.difference)?;
    writeln!(f, "  verdict: {}", s.verdict)?;

    let h = &self.shoulder;
    writeln!(f, "Shoulder Condition")?;
    writeln!(f, "  avg_base_erosion: {}", h.avg_base_erosion)?;
    writeln!(f, "  avg_present_erosion: {}", h.avg_present_erosion)?;
    writeln!(f, "  change: {}", h.change)?;
    write!(f, "  verdict: {}", h.verdict)
  }
}
