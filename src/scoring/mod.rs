//! 评分汇总（纯函数，无副作用，无 I/O）
//!
//! 固定评分细则：
//! - 小组分：海报 (0–2) + 视频 (0–3) + 报告 (0–3) + 答辩 PPT (0–3) = 0–11
//! - 校外评委分：学习收获 (0–2) + 展示能力 (0–2) + 项目贡献 (0–2) = 0–6
//! - 导师个人分：0–3
//! - 个人总分：小组分 + 导师个人分 + 校外评委分 = 0–20
//!
//! 所有合计都是简单加法，不做加权或取整。调用方必须先用 [`validate_bounds`]
//! 校验各输入，汇总函数本身不再重复校验。

mod marks;
pub mod validate;

pub use marks::Marks;
pub use validate::{ValidatedEvaluation, ValidatedMember, validate_evaluation};

use std::fmt;

pub const POSTER_MAX: Marks = Marks::whole(2);
pub const VIDEO_MAX: Marks = Marks::whole(3);
pub const REPORT_MAX: Marks = Marks::whole(3);
pub const PPT_MAX: Marks = Marks::whole(3);
pub const INDIVIDUAL_MAX: Marks = Marks::whole(3);
pub const CRITERION_MAX: Marks = Marks::whole(2);

pub const GROUP_MAX: Marks = Marks::whole(11);
pub const EXTERNAL_MAX: Marks = Marks::whole(6);
pub const MENTOR_TOTAL_MAX: Marks = Marks::whole(14);
pub const TOTAL_MAX: Marks = Marks::whole(20);

/// 小组分
pub fn group_score(poster: Marks, video: Marks, report: Marks, presentation: Marks) -> Marks {
    poster + video + report + presentation
}

/// 校外评委分
pub fn external_evaluator_marks(learning: Marks, presentation: Marks, contribution: Marks) -> Marks {
    learning + presentation + contribution
}

/// 导师给出的合计（小组分 + 导师个人分）
pub fn mentor_total(group_score: Marks, individual_score: Marks) -> Marks {
    group_score + individual_score
}

/// 个人总分
pub fn grand_total(group_score: Marks, individual_score: Marks, external_marks: Marks) -> Marks {
    group_score + individual_score + external_marks
}

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldErrorKind {
    Missing,
    NotHalfStep { value: f64 },
    OutOfRange { value: f64, min: Marks, max: Marks },
    Invalid(String),
}

impl FieldError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Missing,
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Invalid(reason.into()),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FieldErrorKind::Missing => write!(f, "{} is required", self.field),
            FieldErrorKind::NotHalfStep { value } => write!(
                f,
                "{} must be a multiple of 0.5 (got {value})",
                self.field
            ),
            FieldErrorKind::OutOfRange { value, min, max } => write!(
                f,
                "{} must be between {min} and {max} (got {value})",
                self.field
            ),
            FieldErrorKind::Invalid(reason) => write!(f, "{}: {reason}", self.field),
        }
    }
}

impl std::error::Error for FieldError {}

/// 校验分值位于 `[min, max]` 且落在半分网格上，原样返回该值
pub fn validate_bounds(field: &str, value: f64, min: Marks, max: Marks) -> Result<Marks, FieldError> {
    let Some(marks) = Marks::from_f64(value) else {
        // 网格上但超出可表示范围的数值按越界处理
        let kind = if Marks::is_half_step(value) {
            FieldErrorKind::OutOfRange { value, min, max }
        } else {
            FieldErrorKind::NotHalfStep { value }
        };
        return Err(FieldError {
            field: field.to_string(),
            kind,
        });
    };

    if marks < min || marks > max {
        return Err(FieldError {
            field: field.to_string(),
            kind: FieldErrorKind::OutOfRange { value, min, max },
        });
    }

    Ok(marks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(value: f64) -> Marks {
        Marks::from_f64(value).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let group = group_score(m(2.0), m(3.0), m(2.5), m(3.0));
        assert_eq!(group, m(10.5));

        let external = external_evaluator_marks(m(2.0), m(1.5), m(2.0));
        assert_eq!(external, m(5.5));

        assert_eq!(mentor_total(group, m(2.5)), m(13.0));
        assert_eq!(grand_total(group, m(2.5), external), m(18.5));
    }

    #[test]
    fn test_maximums_line_up_with_rubric() {
        let group = group_score(POSTER_MAX, VIDEO_MAX, REPORT_MAX, PPT_MAX);
        assert_eq!(group, GROUP_MAX);

        let external = external_evaluator_marks(CRITERION_MAX, CRITERION_MAX, CRITERION_MAX);
        assert_eq!(external, EXTERNAL_MAX);

        assert_eq!(mentor_total(group, INDIVIDUAL_MAX), MENTOR_TOTAL_MAX);
        assert_eq!(grand_total(group, INDIVIDUAL_MAX, external), TOTAL_MAX);
    }

    #[test]
    fn test_group_score_stays_in_band_for_every_valid_input() {
        // 遍历所有半分组合
        for poster in 0..=POSTER_MAX.halves() {
            for video in 0..=VIDEO_MAX.halves() {
                for report in 0..=REPORT_MAX.halves() {
                    for ppt in 0..=PPT_MAX.halves() {
                        let total = group_score(
                            Marks::from_halves(poster),
                            Marks::from_halves(video),
                            Marks::from_halves(report),
                            Marks::from_halves(ppt),
                        );
                        assert_eq!(total.halves(), poster + video + report + ppt);
                        assert!(total >= Marks::ZERO && total <= GROUP_MAX);
                    }
                }
            }
        }
    }

    #[test]
    fn test_validate_bounds_accepts_edges() {
        assert_eq!(validate_bounds("posterMarks", 0.0, Marks::ZERO, POSTER_MAX), Ok(Marks::ZERO));
        assert_eq!(validate_bounds("posterMarks", 2.0, Marks::ZERO, POSTER_MAX), Ok(POSTER_MAX));
        assert_eq!(
            validate_bounds("videoMarks", 1.5, Marks::ZERO, VIDEO_MAX),
            Ok(Marks::from_halves(3))
        );
    }

    #[test]
    fn test_validate_bounds_names_field_and_range() {
        let err = validate_bounds("posterMarks", 2.5, Marks::ZERO, POSTER_MAX).unwrap_err();
        assert_eq!(err.field, "posterMarks");
        assert_eq!(
            err.kind,
            FieldErrorKind::OutOfRange {
                value: 2.5,
                min: Marks::ZERO,
                max: POSTER_MAX
            }
        );
        assert_eq!(err.to_string(), "posterMarks must be between 0 and 2 (got 2.5)");

        let err = validate_bounds("videoMarks", -0.5, Marks::ZERO, VIDEO_MAX).unwrap_err();
        assert!(matches!(err.kind, FieldErrorKind::OutOfRange { .. }));
    }

    #[test]
    fn test_validate_bounds_rejects_off_grid_values() {
        let err = validate_bounds("reportMarks", 2.3, Marks::ZERO, REPORT_MAX).unwrap_err();
        assert_eq!(err.kind, FieldErrorKind::NotHalfStep { value: 2.3 });
    }

    #[test]
    fn test_validate_bounds_huge_grid_value_is_out_of_range() {
        let err = validate_bounds("posterMarks", 2e9, Marks::ZERO, POSTER_MAX).unwrap_err();
        assert_eq!(
            err.kind,
            FieldErrorKind::OutOfRange {
                value: 2e9,
                min: Marks::ZERO,
                max: POSTER_MAX
            }
        );
        assert!(err.to_string().starts_with("posterMarks must be between 0 and"));
    }
}
