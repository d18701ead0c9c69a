// 该文件是 Lutan （路探） 项目的一部分。
// src/input/read_image_file.rs - 单张图像文件输入
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

use tracing::error;
use url::Url;

use super::{FrameSource, InputError, url_path};
use crate::{FromUrl, FromUrlWithScheme};

pub struct ImageFileInput {
  frame: FrameSource,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
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

    let path = url_path(url)?;
    if !path.is_file() {
      return Err(InputError::IoError(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("图像文件不存在: {}", path.display()),
      )));
    }

    Ok(ImageFileInput {
      frame: FrameSource::new(path),
    })
  }
}

impl ImageFileInput {
  pub fn frame(&self) -> &FrameSource {
    &self.frame
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  #[test]
  fn single_image_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame_00001.png");
    RgbImage::from_pixel(8, 6, Rgb([10, 20, 30])).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let input = ImageFileInput::from_url(&url).unwrap();
    let frame = input.frame().load().unwrap();
    assert_eq!(frame.id, "frame_00001.png");
    assert_eq!((frame.width(), frame.height()), (8, 6));
  }

  #[test]
  fn missing_file_is_rejected() {
    let url = Url::parse("image:///definitely/not/here.jpg").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(InputError::IoError(_))
    ));
  }
}
