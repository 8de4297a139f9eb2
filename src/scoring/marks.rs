//! 半分制定点分数
//!
//! 评分细则允许 0.5 分的步长。`Marks` 以“半分”为单位存储整数，
//! 加法、展示、入库往返都保持精确，不经过二进制浮点求和。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Marks(i32);

impl Marks {
    pub const ZERO: Marks = Marks(0);

    /// 由半分数量构造（5 表示 2.5 分）
    pub const fn from_halves(halves: i32) -> Self {
        Marks(halves)
    }

    /// 由整数分构造
    pub const fn whole(points: i32) -> Self {
        Marks(points * 2)
    }

    pub const fn halves(self) -> i32 {
        self.0
    }

    /// 有限且为 0.5 的整数倍（不考虑能否用 `Marks` 表示）
    pub fn is_half_step(value: f64) -> bool {
        value.is_finite() && (value * 2.0).fract() == 0.0
    }

    /// 从线上传输的数值转换，仅接受 0.5 整数倍且在 i32 半分范围内的值
    pub fn from_f64(value: f64) -> Option<Self> {
        if !Self::is_half_step(value) {
            return None;
        }
        let doubled = value * 2.0;
        if doubled.abs() > f64::from(i32::MAX) {
            return None;
        }
        Some(Marks(doubled as i32))
    }

    /// 半分值在 f64 中可精确表示
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Add for Marks {
    type Output = Marks;

    fn add(self, rhs: Marks) -> Marks {
        Marks(self.0 + rhs.0)
    }
}

impl Sum for Marks {
    fn sum<I: Iterator<Item = Marks>>(iter: I) -> Marks {
        iter.fold(Marks::ZERO, Add::add)
    }
}

impl fmt::Display for Marks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 2;
        if self.0 % 2 == 0 {
            write!(f, "{whole}")
        } else if self.0 < 0 && whole == 0 {
            write!(f, "-0.5")
        } else {
            write!(f, "{whole}.5")
        }
    }
}

impl Serialize for Marks {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.0 % 2 == 0 {
            serializer.serialize_i64(i64::from(self.0 / 2))
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Marks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Marks::from_f64(value).ok_or_else(|| {
            if Marks::is_half_step(value) {
                serde::de::Error::custom(format!("{value} is out of range"))
            } else {
                serde::de::Error::custom(format!("{value} is not a multiple of 0.5"))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_accepts_half_steps_only() {
        assert_eq!(Marks::from_f64(2.5), Some(Marks::from_halves(5)));
        assert_eq!(Marks::from_f64(0.0), Some(Marks::ZERO));
        assert_eq!(Marks::from_f64(1.25), None);
        assert_eq!(Marks::from_f64(f64::NAN), None);
        assert_eq!(Marks::from_f64(f64::INFINITY), None);
        assert_eq!(Marks::from_f64(2e9), None);
        assert!(Marks::is_half_step(2e9));
        assert!(!Marks::is_half_step(1.25));
    }

    #[test]
    fn test_repeated_half_additions_are_exact() {
        let total: Marks = std::iter::repeat_n(Marks::from_halves(1), 41).sum();
        assert_eq!(total.halves(), 41);
        assert_eq!(total.as_f64(), 20.5);
        assert_eq!(total.to_string(), "20.5");
    }

    #[test]
    fn test_display() {
        assert_eq!(Marks::whole(11).to_string(), "11");
        assert_eq!(Marks::from_halves(21).to_string(), "10.5");
        assert_eq!(Marks::from_halves(-1).to_string(), "-0.5");
    }

    #[test]
    fn test_serde_wire_format() {
        assert_eq!(serde_json::to_string(&Marks::whole(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Marks::from_halves(5)).unwrap(), "2.5");
        let parsed: Marks = serde_json::from_str("1.5").unwrap();
        assert_eq!(parsed, Marks::from_halves(3));
        assert!(serde_json::from_str::<Marks>("0.3").is_err());
        let err = serde_json::from_str::<Marks>("2000000000").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
