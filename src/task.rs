// 该文件是 Lutan （路探） 项目的一部分。
// src/task.rs - 提取与对比任务
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

use std::{
  path::Path,
  sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use anyhow::Context;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
  analyzer::{Analyzer, FrameAnalysis},
  compare::{ComparisonEngine, ComparisonSummary},
  config::CompareConfig,
  frame::RoadFrame,
  input::FrameSource,
  output::{Render, write_json},
  record::{AnalyzedFrame, ExternalDetections, FrameCollection, FrameRecord},
};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 注册 Ctrl-C 处理函数，收到信号后置位 `flag`
pub fn install_interrupt_handler(flag: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
  ctrlc::set_handler(move || {
    warn!("收到中断信号，完成当前帧后退出...");
    flag.store(true, Ordering::SeqCst);
  })
}

/// 逐帧分析并合并外部检测结果，得到帧集合
#[derive(Debug, Default)]
pub struct ExtractTask {
  detections: ExternalDetections,
  max_frames: Option<usize>,
  cancelled: Arc<AtomicBool>,
}

impl ExtractTask {
  pub fn with_detections(mut self, detections: ExternalDetections) -> Self {
    self.detections = detections;
    self
  }

  pub fn with_max_frames(mut self, max_frames: Option<usize>) -> Self {
    self.max_frames = max_frames;
    self
  }

  pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
    self.cancelled = cancelled;
    self
  }

  pub fn cancel_flag(&self) -> Arc<AtomicBool> {
    self.cancelled.clone()
  }

  fn process_frame<M, R>(
    &self,
    source: &FrameSource,
    analyzer: &M,
    output: Option<&R>,
  ) -> Option<(String, FrameRecord)>
  where
    M: Analyzer<Output = FrameAnalysis>,
    R: Render<RoadFrame, AnalyzedFrame>,
    R::Error: std::fmt::Display,
  {
    if self.cancelled.load(Ordering::SeqCst) {
      return None;
    }
    let frame = match source.load() {
      Ok(frame) => frame,
      Err(e) => {
        warn!("跳过无法读取的帧 {}: {}", source.path.display(), e);
        return None;
      }
    };

    let analysis = analyzer.analyze(&frame.image);
    let analyzed = AnalyzedFrame::new(frame.id.clone(), self.detections.entry(&frame.id), analysis);
    if let Some(output) = output
      && let Err(e) = output.render_result(&frame, &analyzed)
    {
      warn!("帧 {} 的叠加图保存失败: {}", frame.id, e);
    }
    Some((analyzed.id, analyzed.record))
  }
}

impl<M, R> Task<Vec<FrameSource>, M, Option<R>> for ExtractTask
where
  M: Analyzer<Output = FrameAnalysis>,
  R: Render<RoadFrame, AnalyzedFrame> + Sync,
  R::Error: std::fmt::Display,
{
  type Output = FrameCollection;
  type Error = anyhow::Error;

  fn run_task(
    self,
    mut input: Vec<FrameSource>,
    analyzer: M,
    output: Option<R>,
  ) -> Result<Self::Output, Self::Error> {
    if let Some(limit) = self.max_frames {
      input.truncate(limit);
    }
    let total = input.len();
    info!("开始提取，共 {} 帧", total);

    let done = AtomicUsize::new(0);
    let now = std::time::Instant::now();
    let process = |source: &FrameSource| {
      let record = self.process_frame(source, &analyzer, output.as_ref());
      if record.is_some() {
        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        info!("({}/{}) 完成 {}", finished, total, source.id);
      }
      record
    };

    #[cfg(feature = "parallel")]
    let records: Vec<(String, FrameRecord)> = input.par_iter().filter_map(process).collect();
    #[cfg(not(feature = "parallel"))]
    let records: Vec<(String, FrameRecord)> = input.iter().filter_map(process).collect();

    if self.cancelled.load(Ordering::SeqCst) {
      warn!("任务被中断，保留已完成的 {} 帧", records.len());
    }
    info!("提取完成 {} / {} 帧，耗时: {:.2?}", records.len(), total, now.elapsed());
    Ok(records.into_iter().collect())
  }
}

/// 读取两次巡检的帧集合并给出对比摘要
#[derive(Debug, Default)]
pub struct CompareTask {
  config: CompareConfig,
}

impl CompareTask {
  pub fn new(config: CompareConfig) -> Self {
    Self { config }
  }

  pub fn compare(&self, base: &FrameCollection, present: &FrameCollection) -> ComparisonSummary {
    info!("对比 {} 帧 (基准) 与 {} 帧 (当前)", base.len(), present.len());
    ComparisonEngine::new(&self.config).compare(base, present)
  }

  /// 读取两个帧集合文件，写出摘要 JSON 并返回摘要
  pub fn run<P, Q, S>(&self, base: P, present: Q, out: S) -> anyhow::Result<ComparisonSummary>
  where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: AsRef<Path>,
  {
    let base = base.as_ref();
    let present = present.as_ref();
    let base = FrameCollection::load(base)
      .with_context(|| format!("无法读取基准帧集合: {}", base.display()))?;
    let present = FrameCollection::load(present)
      .with_context(|| format!("无法读取当前帧集合: {}", present.display()))?;
    let summary = self.compare(&base, &present);
    write_json(out.as_ref(), &summary)
      .with_context(|| format!("无法写出对比摘要: {}", out.as_ref().display()))?;
    Ok(summary)
  }
}
