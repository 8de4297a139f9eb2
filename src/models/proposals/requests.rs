use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::entities::ProposalState;
use crate::scoring::FieldError;

const TITLE_MIN_CHARS: usize = 5;
const DESCRIPTION_MIN_CHARS: usize = 100;

// 创建/编辑申报请求
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/proposal.ts")]
pub struct ProposalRequest {
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    #[serde(default)]
    pub attachment: String,
    #[serde(default)]
    pub poster_attachment: String,
    #[serde(default)]
    pub ppt_attachment: String,
    pub link: Option<String>,
}

impl ProposalRequest {
    /// 服务端校验，与客户端是否已检查无关
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.title.trim().chars().count() < TITLE_MIN_CHARS {
            errors.push(FieldError::invalid(
                "title",
                format!("must be at least {TITLE_MIN_CHARS} characters"),
            ));
        }
        if self.description.trim().chars().count() < DESCRIPTION_MIN_CHARS {
            errors.push(FieldError::invalid(
                "description",
                format!("must be at least {DESCRIPTION_MIN_CHARS} characters"),
            ));
        }

        for (field, value) in [
            ("attachment", &self.attachment),
            ("posterAttachment", &self.poster_attachment),
            ("pptAttachment", &self.ppt_attachment),
        ] {
            if value.split(',').all(|url| url.trim().is_empty()) {
                errors.push(FieldError::missing(field));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// 导师审核申报请求
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/proposal.ts")]
pub struct ReviewProposalRequest {
    pub state: ProposalState,
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ProposalRequest {
        ProposalRequest {
            title: "Clean Water Drive".to_string(),
            description: "x".repeat(120),
            content: None,
            attachment: "/uploads/a.pdf".to_string(),
            poster_attachment: "/uploads/b.png".to_string(),
            ppt_attachment: "/uploads/c.pptx,/uploads/d.pptx".to_string(),
            link: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let request = ProposalRequest {
            title: "abc".to_string(),
            description: "too short".to_string(),
            poster_attachment: " , ".to_string(),
            ..valid_request()
        };
        let errors = request.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "description", "posterAttachment"]);
    }
}
