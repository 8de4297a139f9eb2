use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 团队导出请求，`columns` 为导出列 ID，按给定顺序输出
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct TeamExportRequest {
    #[serde(default)]
    pub columns: Vec<String>,
}
