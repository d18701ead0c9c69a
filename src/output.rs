// 该文件是 Lutan （路探） 项目的一部分。
// src/output.rs - 输出定义
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

use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

pub mod draw;

mod overlay_directory;
pub use self::overlay_directory::OverlayDirectoryOutput;

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("路径错误: {0}")]
  PathError(String),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub(crate) fn ensure_parent(path: &Path) -> Result<(), OutputError> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }
  Ok(())
}

/// 以缩进格式写出 JSON，必要时创建上级目录
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(
  path: P,
  value: &T,
) -> Result<(), OutputError> {
  let path = path.as_ref();
  ensure_parent(path)?;
  std::fs::write(path, serde_json::to_string_pretty(value)?)?;
  info!("已保存: {}", path.display());
  Ok(())
}
