// ==========================================
// 产品配置引擎 - 尺寸领域模型
// ==========================================
// 约定: 宽/高单位 mm, 面积单位 m²
// 约定: 区间边界为 0 表示不限制
// ==========================================

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 一块产品的物理尺寸
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub id: i64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub area: f64,
}

impl Measure {
    /// 按宽高构造,面积自动换算为 m²
    pub fn new(id: i64, width: f64, height: f64) -> Self {
        Self {
            id,
            width,
            height,
            area: width * height / 1_000_000.0,
        }
    }

    /// 面积未提供时按宽高推导
    pub fn effective_area(&self) -> f64 {
        if self.area > 0.0 {
            self.area
        } else {
            self.width * self.height / 1_000_000.0
        }
    }
}

/// 数值区间 (0 = 不限制)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasureRange {
    pub min: f64,
    pub max: f64,
}

impl MeasureRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 判定数值是否落在区间内
    ///
    /// max=0 时恒通过上界; min=0 时恒通过下界
    pub fn contains(&self, value: f64) -> bool {
        let lower_ok = self.min == 0.0 || value >= self.min;
        let upper_ok = self.max == 0.0 || value <= self.max;
        lower_ok && upper_ok
    }

    /// 是否声明了任一边界
    pub fn is_bounded(&self) -> bool {
        self.min != 0.0 || self.max != 0.0
    }
}

/// 宽/高/面积三维区间
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasureBounds {
    pub width: MeasureRange,
    pub height: MeasureRange,
    pub area: MeasureRange,
}

impl MeasureBounds {
    pub fn contains(&self, width: f64, height: f64, area: f64) -> bool {
        self.width.contains(width) && self.height.contains(height) && self.area.contains(area)
    }

    pub fn contains_measure(&self, measure: &Measure) -> bool {
        self.contains(measure.width, measure.height, measure.effective_area())
    }

    pub fn is_bounded(&self) -> bool {
        self.width.is_bounded() || self.height.is_bounded() || self.area.is_bounded()
    }
}

// ==========================================
// 预设尺寸列表 (NumberList)
// ==========================================
// 线路格式: "600,800,1000" / 数字 / 数组 / null
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumberList(pub Vec<f64>);

impl NumberList {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .filter_map(|token| token.parse::<f64>().ok())
                .collect(),
        )
    }

    pub fn contains(&self, value: f64) -> bool {
        self.0.iter().any(|v| (v - value).abs() < f64::EPSILON)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for NumberList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumberListVisitor;

        impl<'de> Visitor<'de> for NumberListVisitor {
            type Value = NumberList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("逗号分隔的数字字符串、数字或数字数组")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NumberList, E> {
                Ok(NumberList::parse(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<NumberList, E> {
                Ok(NumberList(vec![v]))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<NumberList, E> {
                Ok(NumberList(vec![v as f64]))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<NumberList, E> {
                Ok(NumberList(vec![v as f64]))
            }

            fn visit_unit<E: de::Error>(self) -> Result<NumberList, E> {
                Ok(NumberList::default())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<NumberList, A::Error> {
                let mut values = Vec::new();
                while let Some(v) = seq.next_element::<f64>()? {
                    values.push(v);
                }
                Ok(NumberList(values))
            }
        }

        deserializer.deserialize_any(NumberListVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_is_unbounded() {
        let range = MeasureRange::new(0.0, 0.0);
        assert!(range.contains(1_000_000.0));
        assert!(!range.is_bounded());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let range = MeasureRange::new(100.0, 500.0);
        assert!(range.contains(100.0));
        assert!(range.contains(500.0));
        assert!(!range.contains(99.0));
        assert!(!range.contains(501.0));
    }

    #[test]
    fn test_measure_area_in_square_meters() {
        let m = Measure::new(1, 1000.0, 2000.0);
        assert_eq!(m.area, 2.0);
    }

    #[test]
    fn test_number_list_parse() {
        let list: NumberList = serde_json::from_str(r#""600, 800,1000""#).unwrap();
        assert!(list.contains(800.0));
        assert!(!list.contains(700.0));
    }
}
