// 该文件是 Lutan （路探） 项目的一部分。
// src/output/overlay_directory.rs - 逐帧叠加图输出
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

use tracing::debug;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::RoadFrame,
  input::url_path,
  output::{OutputError, Render, draw::Draw},
  record::AnalyzedFrame,
};

/// 把叠加了检测结果的帧写入目录，文件名为 `<帧名>_multi.png`
pub struct OverlayDirectoryOutput {
  directory: PathBuf,
  draw: Draw,
}

impl FromUrlWithScheme for OverlayDirectoryOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for OverlayDirectoryOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch(format!(
        "期望输出方式 '{}', 实际输出方式 '{}'",
        Self::SCHEME,
        url.scheme()
      )));
    }
    let directory = url_path(url).map_err(|e| OutputError::PathError(e.to_string()))?;
    Self::create(directory, Draw::default())
  }
}

impl OverlayDirectoryOutput {
  pub fn create<P: AsRef<Path>>(directory: P, draw: Draw) -> Result<Self, OutputError> {
    let directory = directory.as_ref().to_path_buf();
    std::fs::create_dir_all(&directory)?;
    Ok(Self { directory, draw })
  }

  pub fn with_draw(mut self, draw: Draw) -> Self {
    self.draw = draw;
    self
  }

  pub fn overlay_path(&self, frame_id: &str) -> PathBuf {
    let stem = Path::new(frame_id)
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| frame_id.to_string());
    self.directory.join(format!("{}_multi.png", stem))
  }
}

impl Render<RoadFrame, AnalyzedFrame> for OverlayDirectoryOutput {
  type Error = OutputError;

  fn render_result(&self, frame: &RoadFrame, result: &AnalyzedFrame) -> Result<(), Self::Error> {
    let image = self.draw.draw_overlay(&frame.image, result);
    let path = self.overlay_path(&frame.id);
    image.save(&path)?;
    debug!("保存叠加图: {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::RgbImage;

  #[test]
  fn overlay_is_saved_next_to_frame_name() {
    let dir = tempfile::tempdir().unwrap();
    let output = OverlayDirectoryOutput::create(dir.path().join("overlays"), Draw::default()).unwrap();
    let frame = RoadFrame::new("frame_00007.jpg", RgbImage::new(40, 30));
    output
      .render_result(&frame, &AnalyzedFrame::default())
      .unwrap();

    let path = dir.path().join("overlays/frame_00007_multi.png");
    assert_eq!(output.overlay_path("frame_00007.jpg"), path);
    let saved = image::open(&path).unwrap();
    assert_eq!((saved.width(), saved.height()), (40, 30));
  }

  #[test]
  fn wrong_scheme_is_rejected() {
    let url = Url::parse("image:///tmp/out.png").unwrap();
    assert!(matches!(
      OverlayDirectoryOutput::from_url(&url),
      Err(OutputError::SchemeMismatch(_))
    ));
  }
}
