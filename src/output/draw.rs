// 该文件是 Lutan （路探） 项目的一部分。
// src/output/draw.rs - 分析结果可视化
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

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::record::AnalyzedFrame;

const LANE_COLOR: [u8; 3] = [255, 0, 0]; // 红色
const OBJECT_COLOR: [u8; 3] = [0, 255, 0]; // 绿色
const SHOULDER_COLOR: [u8; 3] = [255, 255, 0]; // 黄色
const LANE_THICKNESS: u32 = 4;

pub struct Draw {
  lane_color: [u8; 3],
  object_color: [u8; 3],
  shoulder_color: [u8; 3],
  lane_thickness: u32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      lane_color: LANE_COLOR,
      object_color: OBJECT_COLOR,
      shoulder_color: SHOULDER_COLOR,
      lane_thickness: LANE_THICKNESS,
    }
  }
}

impl Draw {
  pub fn with_lane_thickness(mut self, thickness: u32) -> Self {
    self.lane_thickness = thickness;
    self
  }

  pub fn draw_overlay(&self, frame: &RgbImage, result: &AnalyzedFrame) -> RgbImage {
    let mut image = frame.clone();
    let (width, height) = image.dimensions();

    // 车道线掩码按像素着色
    let mask = result
      .analysis
      .lane
      .render_mask(width, height, self.lane_thickness);
    for (x, y, pixel) in mask.enumerate_pixels() {
      if pixel.0[0] != 0 {
        image.put_pixel(x, y, Rgb(self.lane_color));
      }
    }

    for object in &result.record.objects {
      if let Some(rect) = bbox_rect(&object.bbox, width, height) {
        draw_hollow_rect_mut(&mut image, rect, Rgb(self.object_color));
      }
    }

    for region in result.analysis.shoulder.regions.iter().flatten() {
      draw_hollow_rect_mut(&mut image, *region, Rgb(self.shoulder_color));
    }

    image
  }
}

/// 把检测框裁剪到图像范围内，无效框返回 None
fn bbox_rect(bbox: &[f32; 4], width: u32, height: u32) -> Option<Rect> {
  if width == 0 || height == 0 {
    return None;
  }
  let x_min = (bbox[0].min(bbox[2]).floor() as i32).clamp(0, width as i32 - 1);
  let y_min = (bbox[1].min(bbox[3]).floor() as i32).clamp(0, height as i32 - 1);
  let x_max = (bbox[0].max(bbox[2]).ceil() as i32).clamp(0, width as i32 - 1);
  let y_max = (bbox[1].max(bbox[3]).ceil() as i32).clamp(0, height as i32 - 1);
  if x_min >= x_max || y_min >= y_max {
    return None;
  }
  Some(Rect::at(x_min, y_min).of_size((x_max - x_min) as u32, (y_max - y_min) as u32))
}
