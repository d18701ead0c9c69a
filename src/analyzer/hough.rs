// 该文件是 Lutan （路探） 项目的一部分。
// src/analyzer/hough.rs - 概率霍夫线段检测
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

use image::GrayImage;
use tracing::debug;

// 沿直线步进时的定点数位移
const SHIFT: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
  /// 距离分辨率（像素）
  pub rho: f32,
  /// 角度分辨率（弧度）
  pub theta: f32,
  /// 累加器票数阈值
  pub threshold: u32,
  pub min_line_length: u32,
  pub max_line_gap: u32,
}

/// 检测到的线段，端点为像素坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
  pub x1: i32,
  pub y1: i32,
  pub x2: i32,
  pub y2: i32,
}

impl LineSegment {
  pub fn midpoint(&self) -> (i32, i32) {
    ((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
  }

  pub fn length(&self) -> f32 {
    let dx = (self.x2 - self.x1) as f32;
    let dy = (self.y2 - self.y1) as f32;
    (dx * dx + dy * dy).sqrt()
  }
}

/// 渐进式概率霍夫变换
///
/// 非零像素视为边缘点。边缘点按行优先顺序依次投票，某个 (θ, ρ) 单元的票数
/// 达到阈值后沿该方向双向延伸（容忍 `max_line_gap` 个像素的间隙），
/// 延伸得到的线段足够长则输出，并撤销线段上各点的投票。
/// 处理顺序固定，同一输入总是得到相同结果。
pub fn probabilistic_hough(edges: &GrayImage, params: &HoughParams) -> Vec<LineSegment> {
  let (width, height) = (edges.width() as i32, edges.height() as i32);
  if width == 0 || height == 0 || params.rho <= 0.0 || params.theta <= 0.0 {
    return Vec::new();
  }

  let irho = 1.0 / params.rho;
  let num_angle = ((std::f32::consts::PI / params.theta).round() as usize).max(1);
  let num_rho = (((width + height) * 2 + 1) as f32 / params.rho).round() as usize;
  let rho_offset = (num_rho as i32 - 1) / 2;
  let trig: Vec<(f32, f32)> = (0..num_angle)
    .map(|n| {
      let angle = n as f32 * params.theta;
      (angle.cos() * irho, angle.sin() * irho)
    })
    .collect();

  let rho_index = |x: i32, y: i32, n: usize| -> usize {
    let (cos, sin) = trig[n];
    let r = (x as f32 * cos + y as f32 * sin).round() as i32 + rho_offset;
    r.clamp(0, num_rho as i32 - 1) as usize
  };

  let mut accum = vec![0i32; num_angle * num_rho];
  let mut mask = vec![false; (width * height) as usize];
  let mut points = Vec::new();
  for (x, y, pixel) in edges.enumerate_pixels() {
    if pixel.0[0] != 0 {
      mask[(y as i32 * width + x as i32) as usize] = true;
      points.push((x as i32, y as i32));
    }
  }

  let threshold = params.threshold as i32;
  let line_length = params.min_line_length as i32;
  let line_gap = params.max_line_gap as i32;
  let mut lines = Vec::new();

  for &(j, i) in &points {
    // 已被其他线段吸收
    if !mask[(i * width + j) as usize] {
      continue;
    }

    let mut max_val = threshold - 1;
    let mut max_n = 0;
    for n in 0..num_angle {
      let cell = &mut accum[n * num_rho + rho_index(j, i, n)];
      *cell += 1;
      if max_val < *cell {
        max_val = *cell;
        max_n = n;
      }
    }
    if max_val < threshold {
      continue;
    }

    // 沿直线方向的定点步进
    let a = -trig[max_n].1;
    let b = trig[max_n].0;
    let (mut x0, mut y0) = (j, i);
    let x_major = a.abs() > b.abs();
    let (dx0, dy0) = if x_major {
      y0 = (y0 << SHIFT) + (1 << (SHIFT - 1));
      (
        if a > 0.0 { 1 } else { -1 },
        (b * (1 << SHIFT) as f32 / a.abs()).round() as i32,
      )
    } else {
      x0 = (x0 << SHIFT) + (1 << (SHIFT - 1));
      (
        (a * (1 << SHIFT) as f32 / b.abs()).round() as i32,
        if b > 0.0 { 1 } else { -1 },
      )
    };
    let to_pixel = |x: i32, y: i32| -> (i32, i32) {
      if x_major { (x, y >> SHIFT) } else { (x >> SHIFT, y) }
    };

    let mut line_end = [(j, i); 2];
    for (k, end) in line_end.iter_mut().enumerate() {
      let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
      let (mut x, mut y) = (x0, y0);
      let mut gap = 0;
      loop {
        let (j1, i1) = to_pixel(x, y);
        if j1 < 0 || j1 >= width || i1 < 0 || i1 >= height {
          break;
        }
        if mask[(i1 * width + j1) as usize] {
          gap = 0;
          *end = (j1, i1);
        } else {
          gap += 1;
          if gap > line_gap {
            break;
          }
        }
        x += dx;
        y += dy;
      }
    }

    let good_line = (line_end[1].0 - line_end[0].0).abs() >= line_length
      || (line_end[1].1 - line_end[0].1).abs() >= line_length;

    for (k, end) in line_end.iter().enumerate() {
      let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
      let (mut x, mut y) = (x0, y0);
      loop {
        let (j1, i1) = to_pixel(x, y);
        if j1 < 0 || j1 >= width || i1 < 0 || i1 >= height {
          break;
        }
        let idx = (i1 * width + j1) as usize;
        if mask[idx] {
          if good_line {
            for n in 0..num_angle {
              accum[n * num_rho + rho_index(j1, i1, n)] -= 1;
            }
          }
          mask[idx] = false;
        }
        if (j1, i1) == *end {
          break;
        }
        x += dx;
        y += dy;
      }
    }

    if good_line {
      lines.push(LineSegment {
        x1: line_end[0].0,
        y1: line_end[0].1,
        x2: line_end[1].0,
        y2: line_end[1].1,
      });
    }
  }

  debug!("边缘点 {} 个, 检测到线段 {} 条", points.len(), lines.len());
  lines
}
