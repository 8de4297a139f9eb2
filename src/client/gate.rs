//! 提交前的附件检查
//!
//! 每个必填类别要么有新选中的文件，要么记录上已有引用，否则在发出任何网络请求前拦截。

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::uploader::LocalFile;

/// 附件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileCategory {
    Report,
    Poster,
    Ppt,
}

impl FileCategory {
    pub const ALL: [FileCategory; 3] = [FileCategory::Report, FileCategory::Poster, FileCategory::Ppt];

    /// 申报请求中对应的字段名
    pub fn field(self) -> &'static str {
        match self {
            FileCategory::Report => "attachment",
            FileCategory::Poster => "posterAttachment",
            FileCategory::Ppt => "pptAttachment",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            FileCategory::Report => "At least one file must be uploaded",
            FileCategory::Poster => "At least one poster file must be uploaded",
            FileCategory::Ppt => "At least one PPT file must be uploaded",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

pub type FileSelection = BTreeMap<FileCategory, Vec<LocalFile>>;
pub type UploadedRefs = BTreeMap<FileCategory, Vec<String>>;
/// 记录上已有的引用，逗号分隔
pub type ExistingRefs = BTreeMap<FileCategory, String>;
pub type ResolvedRefs = BTreeMap<FileCategory, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("{}", missing_summary(.0))]
    MissingFiles(Vec<FileCategory>),
}

fn missing_summary(categories: &[FileCategory]) -> String {
    categories
        .iter()
        .map(|c| c.missing_message())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 拆分逗号分隔的引用，丢弃空项
pub fn split_refs(joined: &str) -> Vec<&str> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn has_existing(existing: &ExistingRefs, category: FileCategory) -> bool {
    existing
        .get(&category)
        .is_some_and(|joined| !split_refs(joined).is_empty())
}

#[derive(Debug, Clone)]
pub struct SubmissionGate {
    required: Vec<FileCategory>,
}

impl SubmissionGate {
    pub fn new(required: impl IntoIterator<Item = FileCategory>) -> Self {
        Self {
            required: required.into_iter().collect(),
        }
    }

    /// 申报要求三类附件齐全
    pub fn proposal() -> Self {
        Self::new(FileCategory::ALL)
    }

    pub fn required(&self) -> &[FileCategory] {
        &self.required
    }

    pub fn precheck(&self, selection: &FileSelection, existing: &ExistingRefs) -> Result<(), GateError> {
        let missing: Vec<_> = self
            .required
            .iter()
            .copied()
            .filter(|category| {
                let selected = selection.get(category).is_some_and(|files| !files.is_empty());
                !selected && !has_existing(existing, *category)
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(GateError::MissingFiles(missing))
        }
    }

    /// 计算最终引用：有新上传则替换，否则保留原有引用
    pub fn resolve(&self, uploaded: &UploadedRefs, existing: &ExistingRefs) -> Result<ResolvedRefs, GateError> {
        let mut resolved = ResolvedRefs::new();
        for category in FileCategory::ALL {
            let fresh: Vec<&str> = uploaded
                .get(&category)
                .map(|urls| urls.iter().map(String::as_str).filter(|u| !u.trim().is_empty()).collect())
                .unwrap_or_default();
            let joined = if fresh.is_empty() {
                existing
                    .get(&category)
                    .map(|joined| split_refs(joined).join(","))
                    .unwrap_or_default()
            } else {
                fresh.join(",")
            };
            resolved.insert(category, joined);
        }

        let missing: Vec<_> = self
            .required
            .iter()
            .copied()
            .filter(|category| resolved.get(category).is_none_or(|joined| joined.is_empty()))
            .collect();
        if missing.is_empty() {
            Ok(resolved)
        } else {
            Err(GateError::MissingFiles(missing))
        }
    }
}
