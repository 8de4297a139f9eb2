//! 团队 CSV 导出
//!
//! 每个团队一行；多值字段（成员、申报）在单元格内按行分隔。
//! 列由 ID 选择，未指定时使用默认列集合。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use chrono::Utc;
use tracing::{error, info};

use crate::errors::PortalError;
use crate::models::teams::TeamOverview;
use crate::models::users::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::access::{current_user, internal_error_response, require_role, storage_from};

#[derive(Debug)]
pub(crate) struct TeamColumn {
    pub id: &'static str,
    pub label: &'static str,
    value: fn(&TeamOverview) -> String,
}

/// 多值按行拼接，没有值时使用占位文本
fn lines(values: impl Iterator<Item = String>, empty: &str) -> String {
    let joined = values.collect::<Vec<_>>().join("\n");
    if joined.is_empty() {
        empty.to_string()
    } else {
        joined
    }
}

fn or_text(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

fn per_proposal(team: &TeamOverview, f: impl Fn(&crate::models::proposals::Proposal) -> String) -> String {
    lines(team.proposals.iter().map(f), "No proposals")
}

pub(crate) static TEAM_COLUMNS: &[TeamColumn] = &[
    TeamColumn {
        id: "teamNumber",
        label: "Team Number",
        value: |t| or_text(&t.team.team_number, "N/A"),
    },
    TeamColumn {
        id: "teamStatus",
        label: "Team Status",
        value: |t| t.team.status.to_string(),
    },
    TeamColumn {
        id: "projectTitle",
        label: "Project Title",
        value: |t| or_text(&t.team.project_title, "No Title"),
    },
    TeamColumn {
        id: "projectCategory",
        label: "Project Category",
        value: |t| or_text(&t.team.project_category, "N/A"),
    },
    TeamColumn {
        id: "batch",
        label: "Batch",
        value: |t| or_text(&t.team.batch, "N/A"),
    },
    TeamColumn {
        id: "createdAt",
        label: "Created Date",
        value: |t| t.team.created_at.format("%Y-%m-%d").to_string(),
    },
    TeamColumn {
        id: "updatedAt",
        label: "Updated Date",
        value: |t| t.team.updated_at.format("%Y-%m-%d").to_string(),
    },
    TeamColumn {
        id: "mentorName",
        label: "Mentor Name",
        value: |t| t.mentor.as_ref().map_or("No Mentor".to_string(), |m| m.name.clone()),
    },
    TeamColumn {
        id: "mentorEmail",
        label: "Mentor Email",
        value: |t| t.mentor.as_ref().map_or("N/A".to_string(), |m| m.email.clone()),
    },
    TeamColumn {
        id: "leadName",
        label: "Team Lead Name",
        value: |t| t.lead.as_ref().map_or("No Lead".to_string(), |l| l.name.clone()),
    },
    TeamColumn {
        id: "leadEmail",
        label: "Team Lead Email",
        value: |t| t.lead.as_ref().map_or("N/A".to_string(), |l| l.email.clone()),
    },
    TeamColumn {
        id: "memberNames",
        label: "Team Members",
        value: |t| lines(t.team.members.iter().map(|m| m.name.clone()), "No Members"),
    },
    TeamColumn {
        id: "memberEmails",
        label: "Member Emails",
        value: |t| lines(t.team.members.iter().map(|m| m.email.clone()), "N/A"),
    },
    TeamColumn {
        id: "memberRoles",
        label: "Member Roles",
        value: |t| lines(t.team.members.iter().map(|m| m.role.to_string()), "N/A"),
    },
    TeamColumn {
        id: "memberRollNumbers",
        label: "Member Roll Numbers",
        value: |t| {
            lines(
                t.team
                    .members
                    .iter()
                    .map(|m| m.roll_number.clone().unwrap_or_else(|| "N/A".to_string())),
                "N/A",
            )
        },
    },
    TeamColumn {
        id: "memberCount",
        label: "Total Members",
        value: |t| t.team.members.len().to_string(),
    },
    TeamColumn {
        id: "proposalCount",
        label: "Proposal Count",
        value: |t| t.proposals.len().to_string(),
    },
    TeamColumn {
        id: "proposalTitle",
        label: "Proposal Title",
        value: |t| per_proposal(t, |p| p.title.clone()),
    },
    TeamColumn {
        id: "proposalDescription",
        label: "Proposal Description",
        value: |t| per_proposal(t, |p| or_text(&p.description, "No description")),
    },
    TeamColumn {
        id: "proposalStatus",
        label: "Proposal Status",
        value: |t| per_proposal(t, |p| p.state.to_string()),
    },
    TeamColumn {
        id: "proposalSummary",
        label: "Proposal Summary",
        value: |t| per_proposal(t, |p| format!("{}: {}", p.title, p.state)),
    },
    TeamColumn {
        id: "proposalVideoLink",
        label: "Video Link",
        value: |t| {
            per_proposal(t, |p| {
                p.link
                    .as_deref()
                    .map_or("No Video link".to_string(), |l| or_text(l, "No Video link"))
            })
        },
    },
    TeamColumn {
        id: "proposalAttachment",
        label: "Proposal Attachment",
        value: |t| per_proposal(t, |p| or_text(&p.attachment, "No attachment")),
    },
    TeamColumn {
        id: "proposalRemarks",
        label: "Proposal Remarks",
        value: |t| {
            per_proposal(t, |p| {
                p.remarks
                    .as_deref()
                    .map_or("No remarks".to_string(), |r| or_text(r, "No remarks"))
            })
        },
    },
    TeamColumn {
        id: "proposalSubmittedAt",
        label: "Latest Proposal Date",
        // 申报按创建时间倒序，第一条即最新
        value: |t| {
            t.proposals.first().map_or("No proposals".to_string(), |p| {
                p.created_at.format("%Y-%m-%d").to_string()
            })
        },
    },
    TeamColumn {
        id: "evaluationStatus",
        label: "Evaluation Status",
        value: |t| {
            t.evaluation
                .as_ref()
                .map_or("Not Evaluated".to_string(), |e| e.status.to_string())
        },
    },
    TeamColumn {
        id: "groupScore",
        label: "Group Score",
        value: |t| {
            t.evaluation
                .as_ref()
                .map_or("N/A".to_string(), |e| e.group_score.to_string())
        },
    },
];

pub(crate) const DEFAULT_TEAM_COLUMNS: &[&str] = &[
    "teamNumber",
    "teamStatus",
    "projectTitle",
    "projectCategory",
    "batch",
    "mentorName",
    "mentorEmail",
    "leadName",
    "leadEmail",
    "memberCount",
    "memberNames",
    "memberEmails",
    "memberRoles",
    "memberRollNumbers",
    "proposalCount",
    "proposalSummary",
    "proposalSubmittedAt",
    "createdAt",
    "updatedAt",
];

/// 按 ID 查找列；出错时返回面向用户的说明
pub(crate) fn resolve_columns<S: AsRef<str>>(ids: &[S]) -> Result<Vec<&'static TeamColumn>, String> {
    if ids.is_empty() {
        return Err("No columns selected".to_string());
    }

    let mut columns = Vec::with_capacity(ids.len());
    let mut unknown = Vec::new();
    for id in ids {
        match TEAM_COLUMNS.iter().find(|c| c.id == id.as_ref()) {
            Some(column) => columns.push(column),
            None => unknown.push(id.as_ref()),
        }
    }

    if unknown.is_empty() {
        Ok(columns)
    } else {
        Err(format!("Invalid columns: {}", unknown.join(", ")))
    }
}

pub(crate) fn teams_to_csv(
    columns: &[&TeamColumn],
    teams: &[TeamOverview],
) -> Result<Vec<u8>, PortalError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(|c| c.label))
        .map_err(|e| PortalError::serialization(format!("写入 CSV 表头失败: {e}")))?;
    for team in teams {
        writer
            .write_record(columns.iter().map(|c| (c.value)(team)))
            .map_err(|e| PortalError::serialization(format!("写入 CSV 失败: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| PortalError::serialization(format!("生成 CSV 失败: {e}")))
}

pub async fn export_teams<S: AsRef<str>>(
    request: &HttpRequest,
    column_ids: &[S],
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if let Err(resp) = require_role(&user, UserRole::Admin) {
        return Ok(resp);
    }

    let columns = match resolve_columns(column_ids) {
        Ok(columns) => columns,
        Err(message) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ExportColumnsInvalid,
                message,
            )));
        }
    };

    let storage = match storage_from(request) {
        Ok(storage) => storage,
        Err(resp) => return Ok(resp),
    };
    let teams = match storage.list_team_overviews().await {
        Ok(teams) => teams,
        Err(e) => {
            error!("Failed to load teams for export: {}", e);
            return Ok(internal_error_response());
        }
    };

    let body = match teams_to_csv(&columns, &teams) {
        Ok(body) => body,
        Err(e) => {
            error!("{}", e);
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::ExportFailed,
                "Failed to generate export",
            )));
        }
    };

    info!(
        "Admin {} exported {} teams with {} columns",
        user.id,
        teams.len(),
        columns.len()
    );

    let filename = format!("teams_export_{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_ids_are_unique_and_defaults_resolve() {
        let mut ids: Vec<_> = TEAM_COLUMNS.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), TEAM_COLUMNS.len());
        assert_eq!(
            resolve_columns(DEFAULT_TEAM_COLUMNS).unwrap().len(),
            DEFAULT_TEAM_COLUMNS.len()
        );
    }

    #[test]
    fn test_resolve_reports_empty_and_unknown_columns() {
        let empty: [&str; 0] = [];
        assert_eq!(resolve_columns(&empty).unwrap_err(), "No columns selected");
        assert_eq!(
            resolve_columns(&["teamNumber", "shoeSize", "mentorPhone"]).unwrap_err(),
            "Invalid columns: shoeSize, mentorPhone"
        );
        let picked = resolve_columns(&["leadEmail", "teamNumber"]).unwrap();
        let labels: Vec<_> = picked.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Team Lead Email", "Team Number"]);
    }

    #[test]
    fn test_empty_team_list_still_has_header() {
        let columns = resolve_columns(&["teamNumber", "memberCount"]).unwrap();
        let csv = String::from_utf8(teams_to_csv(&columns, &[]).unwrap()).unwrap();
        assert_eq!(csv, "Team Number,Total Members\n");
    }
}
