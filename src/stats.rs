// 该文件是 Lutan （路探） 项目的一部分。
// src/stats.rs - 数值统计工具
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

/// 算术平均值，空序列返回 0
pub fn average(values: &[f64]) -> f64 {
  if values.is_empty() {
    return 0.0;
  }
  values.iter().sum::<f64>() / values.len() as f64
}

/// 保留指定小数位数
///
/// 按二进制精确值做十进制舍入，恰好居中时取偶数，
/// 与下游报表工具的舍入结果逐位一致。
pub fn round_to(value: f64, decimals: usize) -> f64 {
  if !value.is_finite() {
    return value;
  }
  let rounded = format!("{:.*}", decimals, value)
    .parse::<f64>()
    .unwrap_or(value);
  // 去掉 "-0.0"
  if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn average_of_empty_is_zero() {
    assert_eq!(average(&[]), 0.0);
  }

  #[test]
  fn average_of_single_value_is_that_value() {
    for v in [0.0, 1.5, -3.25, 1e9] {
      assert_eq!(average(&[v]), v);
    }
  }

  #[test]
  fn average_of_several_values() {
    assert_eq!(average(&[100.0, 200.0]), 150.0);
    assert_eq!(average(&[1.0, 2.0, 3.0, 4.0]), 2.5);
  }

  #[test]
  fn round_to_keeps_requested_decimals() {
    assert_eq!(round_to(100.0, 2), 100.0);
    assert_eq!(round_to(0.123456, 3), 0.123);
    assert_eq!(round_to(2.0 / 3.0, 2), 0.67);
    assert_eq!(round_to(-0.0004, 3), 0.0);
  }

  #[test]
  fn round_to_uses_exact_binary_value() {
    // 2.675 实际略小于 2.675
    assert_eq!(round_to(2.675, 2), 2.67);
  }
}
