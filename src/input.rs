// 该文件是 Lutan （路探） 项目的一部分。
// src/input.rs - 巡检帧输入
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

use image::ImageReader;
use thiserror::Error;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::RoadFrame};

mod frame_directory;
mod read_image_file;

pub use self::frame_directory::FrameDirectoryInput;
pub use self::read_image_file::ImageFileInput;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("路径解码错误: {0}")]
  PathDecodeError(#[from] std::string::FromUtf8Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 待分析的一帧，图像在工作线程中按需解码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSource {
  pub id: String,
  pub path: PathBuf,
}

impl FrameSource {
  pub fn new(path: PathBuf) -> Self {
    let id = path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.display().to_string());
    Self { id, path }
  }

  pub fn load(&self) -> Result<RoadFrame, InputError> {
    let image = ImageReader::open(&self.path)?
      .with_guessed_format()?
      .decode()?
      .to_rgb8();
    Ok(RoadFrame::new(self.id.clone(), image))
  }
}

/// 取出 URL 中的本地路径（已做百分号解码）
pub(crate) fn url_path(url: &Url) -> Result<PathBuf, InputError> {
  let decoded = urlencoding::decode(url.path())?;
  let mut path = String::new();
  if let Some(host) = url.host_str() {
    // folder://relative/dir 形式，host 部分视为路径首段
    path.push_str(host);
  }
  path.push_str(&decoded);
  Ok(PathBuf::from(path))
}

pub(crate) fn is_frame_file(path: &Path) -> bool {
  const EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
    .unwrap_or(false)
}

pub enum InputWrapper {
  FrameDirectory(FrameDirectoryInput),
  ImageFile(ImageFileInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      FrameDirectoryInput::SCHEME => Ok(InputWrapper::FrameDirectory(
        FrameDirectoryInput::from_url(url)?,
      )),
      ImageFileInput::SCHEME => Ok(InputWrapper::ImageFile(ImageFileInput::from_url(url)?)),
      other => Err(InputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl InputWrapper {
  /// 按帧标识排序的全部帧
  pub fn frames(&self) -> Vec<FrameSource> {
    match self {
      InputWrapper::FrameDirectory(input) => input.frames().to_vec(),
      InputWrapper::ImageFile(input) => vec![input.frame().clone()],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frame_extensions_are_case_insensitive() {
    assert!(is_frame_file(Path::new("frame_00001.JPG")));
    assert!(is_frame_file(Path::new("a/b/frame.png")));
    assert!(!is_frame_file(Path::new("detections.json")));
    assert!(!is_frame_file(Path::new("noext")));
  }

  #[test]
  fn url_path_is_percent_decoded() {
    let url = Url::parse("folder:///data/base%20pass").unwrap();
    assert_eq!(url_path(&url).unwrap(), PathBuf::from("/data/base pass"));
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("rtsp://camera/stream").unwrap();
    assert!(matches!(
      InputWrapper::from_url(&url),
      Err(InputError::SchemeMismatch(_))
    ));
  }

  #[test]
  fn frame_id_is_file_name() {
    let source = FrameSource::new(PathBuf::from("/tmp/frames/frame_00003.jpg"));
    assert_eq!(source.id, "frame_00003.jpg");
  }

  #[test]
  fn corrupt_image_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"not an image").unwrap();
    assert!(FrameSource::new(path).load().is_err());
  }
}
