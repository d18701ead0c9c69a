// 该文件是 Lutan （路探） 项目的一部分。
// src/input/frame_directory.rs - 帧目录输入
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

use std::path::{Path, PathBuf};

use tracing::{error, info};
use url::Url;

use super::{FrameSource, InputError, is_frame_file, url_path};
use crate::{FromUrl, FromUrlWithScheme};

/// 从目录中读取已抽取的视频帧，按文件名排序
pub struct FrameDirectoryInput {
  directory: PathBuf,
  frames: Vec<FrameSource>,
}

impl FromUrlWithScheme for FrameDirectoryInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for FrameDirectoryInput {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(InputError::SchemeMismatch(url.scheme().to_string()));
    }
    Self::open(url_path(url)?)
  }
}

impl FrameDirectoryInput {
  pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self, InputError> {
    let directory = directory.as_ref().to_path_buf();
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(&directory)? {
      let path = entry?.path();
      if path.is_file() && is_frame_file(&path) {
        paths.push(path);
      }
    }
    paths.sort();

    let frames: Vec<FrameSource> = paths.into_iter().map(FrameSource::new).collect();
    info!("帧目录 {} 中共 {} 帧", directory.display(), frames.len());
    Ok(Self { directory, frames })
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  pub fn frames(&self) -> &[FrameSource] {
    &self.frames
  }
}
