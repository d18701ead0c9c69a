// 该文件是 Lutan （路探） 项目的一部分。
// src/args.rs - 命令行参数
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

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

/// Lutan 道路巡检分析
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 逐帧分析车道标线与路肩，合并外部检测结果
  Extract {
    /// 帧来源
    /// 支持格式:
    /// - 帧目录: folder:///path/to/frames
    /// - 单张图片: image:///path/to/frame.jpg
    #[arg(long, value_name = "SOURCE")]
    frames: Url,

    /// 外部检测结果 JSON（目标与路面病害掩码）
    #[arg(long, value_name = "FILE")]
    detections: Option<PathBuf>,

    /// 帧集合输出路径
    #[arg(long, default_value = "results/frames.json", value_name = "FILE")]
    out: PathBuf,

    /// 叠加图输出目录，例如 folder:///path/to/overlays
    #[arg(long, value_name = "OUTPUT")]
    overlays: Option<Url>,

    /// 参数配置文件
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 最大处理帧数
    #[arg(long, value_name = "COUNT")]
    max_frames: Option<usize>,
  },

  /// 对比前后两次巡检的帧集合
  Compare {
    /// 基准（较早）巡检帧集合
    #[arg(long, value_name = "FILE")]
    base: PathBuf,

    /// 当前巡检帧集合
    #[arg(long, value_name = "FILE")]
    present: PathBuf,

    /// 对比摘要输出路径
    #[arg(long, default_value = "results/compare/multi_summary.json", value_name = "FILE")]
    out: PathBuf,

    /// 参数配置文件
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
  },
}
