// 该文件是 Lutan （路探） 项目的一部分。
// src/analyzer/clahe.rs - 限制对比度自适应直方图均衡
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

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// 对灰度图做 CLAHE 处理
///
/// 图像被划分为 `tiles.0 x tiles.1` 个分块，每块独立计算裁剪后的直方图映射，
/// 像素值由相邻四个分块中心的映射双线性插值得到。分块数不会超过图像尺寸。
pub fn clahe(image: &GrayImage, clip_limit: f32, tiles: (u32, u32)) -> GrayImage {
  let (width, height) = image.dimensions();
  if width == 0 || height == 0 {
    return image.clone();
  }

  let tiles_x = tiles.0.clamp(1, width);
  let tiles_y = tiles.1.clamp(1, height);
  let x_bounds: Vec<u32> = (0..=tiles_x).map(|i| i * width / tiles_x).collect();
  let y_bounds: Vec<u32> = (0..=tiles_y).map(|i| i * height / tiles_y).collect();

  let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
  for ty in 0..tiles_y as usize {
    for tx in 0..tiles_x as usize {
      let mut hist = [0u32; BINS];
      for y in y_bounds[ty]..y_bounds[ty + 1] {
        for x in x_bounds[tx]..x_bounds[tx + 1] {
          hist[image.get_pixel(x, y).0[0] as usize] += 1;
        }
      }
      let area = (x_bounds[tx + 1] - x_bounds[tx]) * (y_bounds[ty + 1] - y_bounds[ty]);
      luts.push(tile_mapping(&mut hist, area, clip_limit));
    }
  }

  let tile_w = width as f32 / tiles_x as f32;
  let tile_h = height as f32 / tiles_y as f32;
  let lut_at = |tx: usize, ty: usize| &luts[ty * tiles_x as usize + tx];

  GrayImage::from_fn(width, height, |x, y| {
    let value = image.get_pixel(x, y).0[0] as usize;
    let (tx0, tx1, fx) = neighbours((x as f32 + 0.5) / tile_w - 0.5, tiles_x);
    let (ty0, ty1, fy) = neighbours((y as f32 + 0.5) / tile_h - 0.5, tiles_y);

    let top = (1.0 - fx) * lut_at(tx0, ty0)[value] as f32 + fx * lut_at(tx1, ty0)[value] as f32;
    let bottom =
      (1.0 - fx) * lut_at(tx0, ty1)[value] as f32 + fx * lut_at(tx1, ty1)[value] as f32;
    let mapped = (1.0 - fy) * top + fy * bottom;
    Luma([mapped.round().clamp(0.0, 255.0) as u8])
  })
}

/// 返回相邻两个分块下标及插值权重
fn neighbours(position: f32, count: u32) -> (usize, usize, f32) {
  let base = position.floor();
  let weight = position - base;
  let last = count as i64 - 1;
  let lower = (base as i64).clamp(0, last) as usize;
  let upper = (base as i64 + 1).clamp(0, last) as usize;
  (lower, upper, weight)
}

/// 裁剪直方图并把溢出部分均匀回填，再由累计分布得到映射表
fn tile_mapping(hist: &mut [u32; BINS], area: u32, clip_limit: f32) -> [u8; BINS] {
  if clip_limit > 0.0 {
    let clip = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
      if *bin > clip {
        excess += *bin - clip;
        *bin = clip;
      }
    }

    let redistributed = excess / BINS as u32;
    let residual = excess % BINS as u32;
    for bin in hist.iter_mut() {
      *bin += redistributed;
    }
    if residual > 0 {
      let step = (BINS as u32 / residual).max(1) as usize;
      for bin in hist.iter_mut().step_by(step).take(residual as usize) {
        *bin += 1;
      }
    }
  }

  let scale = 255.0 / area.max(1) as f32;
  let mut lut = [0u8; BINS];
  let mut sum = 0u32;
  for (value, bin) in hist.iter().enumerate() {
    sum += bin;
    lut[value] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
  }
  lut
}
