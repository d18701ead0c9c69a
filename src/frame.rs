// 该文件是 Lutan （路探） 项目的一部分。
// src/frame.rs - 巡检帧定义
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

use image::{GrayImage, Luma, RgbImage};

/// 一帧已解码的巡检图像
#[derive(Debug, Clone)]
pub struct RoadFrame {
  /// 帧标识（文件名或帧序号）
  pub id: String,
  pub image: RgbImage,
}

impl RoadFrame {
  pub fn new(id: impl Into<String>, image: RgbImage) -> Self {
    Self {
      id: id.into(),
      image,
    }
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }
}

/// 转为单通道亮度图，Y = 0.299R + 0.587G + 0.114B
pub fn to_intensity(image: &RgbImage) -> GrayImage {
  GrayImage::from_fn(image.width(), image.height(), |x, y| {
    let [r, g, b] = image.get_pixel(x, y).0;
    let value = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    Luma([value.round().clamp(0.0, 255.0) as u8])
  })
}

/// 平均灰度值 [0, 255]，空图像返回 0
pub fn mean_intensity(image: &GrayImage) -> f64 {
  let count = image.as_raw().len();
  if count == 0 {
    return 0.0;
  }
  image.as_raw().iter().map(|&v| v as u64).sum::<u64>() as f64 / count as f64
}
