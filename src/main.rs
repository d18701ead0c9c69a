// 该文件是 Lutan （路探） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use lutan::{
  FromUrl,
  analyzer::FrameAnalyzer,
  config::Config,
  input::InputWrapper,
  output::{OverlayDirectoryOutput, draw::Draw},
  record::ExternalDetections,
  task::{CompareTask, ExtractTask, Task, install_interrupt_handler},
};

use args::{Args, Command};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  match args.command {
    Command::Extract {
      frames,
      detections,
      out,
      overlays,
      config,
      max_frames,
    } => {
      info!("帧来源: {}", frames);
      info!("帧集合输出: {}", out.display());
      let config = Config::load_or_default(config.as_ref()).context("无法读取配置文件")?;

      let input = InputWrapper::from_url(&frames)?;
      let detections = match detections {
        Some(path) => ExternalDetections::load(&path)
          .with_context(|| format!("无法读取外部检测结果: {}", path.display()))?,
        None => {
          warn!("未提供外部检测结果，目标与路面字段按零值处理");
          ExternalDetections::default()
        }
      };
      let output = match overlays {
        Some(url) => {
          info!("叠加图输出: {}", url);
          let draw = Draw::default().with_lane_thickness(config.lane.mask_thickness);
          Some(OverlayDirectoryOutput::from_url(&url)?.with_draw(draw))
        }
        None => None,
      };

      let task = ExtractTask::default()
        .with_detections(detections)
        .with_max_frames(max_frames);
      if let Err(e) = install_interrupt_handler(task.cancel_flag()) {
        warn!("无法注册中断处理函数: {}", e);
      }
      let collection = task.run_task(input.frames(), FrameAnalyzer::new(&config), output)?;
      collection
        .save(&out)
        .with_context(|| format!("无法写出帧集合: {}", out.display()))?;
    }
    Command::Compare {
      base,
      present,
      out,
      config,
    } => {
      info!("基准巡检: {}", base.display());
      info!("当前巡检: {}", present.display());
      let config = Config::load_or_default(config.as_ref()).context("无法读取配置文件")?;
      let summary = CompareTask::new(config.compare).run(&base, &present, &out)?;
      println!("{}", summary);
    }
  }

  Ok(())
}
