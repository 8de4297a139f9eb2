//! 请求级别的身份与团队归属校验
//!
//! 失败时直接给出可返回的响应，处理函数里用 `match ... { Err(resp) => return Ok(resp) }`。

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use tracing::{error, info};

use crate::errors::PortalError;
use crate::middlewares::RequireJWT;
use crate::models::teams::Team;
use crate::models::users::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 未分配与团队不存在使用同一响应，不泄露团队是否存在
pub(crate) const NOT_ASSIGNED_MESSAGE: &str = "You are not assigned to this team";

pub(crate) fn storage_from(req: &HttpRequest) -> Result<Arc<dyn Storage>, HttpResponse> {
    req.app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| {
            error!("Storage not found in app data");
            internal_error_response()
        })
}

pub(crate) fn internal_error_response() -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "Internal server error",
    ))
}

/// 记录内部错误并返回 500；冲突映射为 409
pub(crate) fn storage_error_response(err: PortalError, conflict_code: ErrorCode) -> HttpResponse {
    match err {
        PortalError::Conflict(msg) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(conflict_code, msg))
        }
        other => {
            error!("{}", other);
            internal_error_response()
        }
    }
}

pub(crate) fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(ErrorCode::Forbidden, message))
}

pub(crate) fn current_user(req: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(req).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized",
        ))
    })
}

pub(crate) fn require_role(user: &User, role: UserRole) -> Result<(), HttpResponse> {
    if user.role == role {
        Ok(())
    } else {
        info!("User {} with role {} denied, {} required", user.id, user.role, role);
        Err(forbidden("Access denied"))
    }
}

/// 导师访问团队：团队必须存在且分配给该导师
pub(crate) async fn mentor_team(
    storage: &Arc<dyn Storage>,
    mentor: &User,
    team_id: i64,
) -> Result<Team, HttpResponse> {
    match storage.get_team_by_id(team_id).await {
        Ok(Some(team)) if team.is_mentored_by(mentor.id) => Ok(team),
        Ok(_) => {
            info!("Mentor {} denied access to team {}", mentor.id, team_id);
            Err(forbidden(NOT_ASSIGNED_MESSAGE))
        }
        Err(e) => {
            error!("{}", e);
            Err(internal_error_response())
        }
    }
}

/// 学生所在团队
pub(crate) async fn student_team(
    storage: &Arc<dyn Storage>,
    student: &User,
) -> Result<Team, HttpResponse> {
    match storage.get_team_by_student(student.id).await {
        Ok(Some(team)) => Ok(team),
        Ok(None) => Err(forbidden("You are not part of a team")),
        Err(e) => {
            error!("{}", e);
            Err(internal_error_response())
        }
    }
}
