//! 测试数据构造（团队与成员由外部流程维护，这里直接写库）

use super::SeaOrmStorage;
use crate::entity::{team_members, teams, users};
use crate::models::teams::{MemberRole, TeamStatus};
use crate::models::users::{UserRole, UserStatus};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

pub(crate) async fn storage() -> SeaOrmStorage {
    SeaOrmStorage::in_memory()
        .await
        .expect("in-memory sqlite should start")
}

pub(crate) async fn seed_user(storage: &SeaOrmStorage, name: &str, role: UserRole) -> i64 {
    let now = chrono::Utc::now().timestamp();
    users::ActiveModel {
        name: Set(name.to_string()),
        email: Set(format!("{}@example.edu", name.to_lowercase())),
        role: Set(role.to_string()),
        status: Set(UserStatus::Active.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .expect("seed user")
    .id
}

pub(crate) struct SeededTeam {
    pub team_id: i64,
    pub member_ids: Vec<i64>,
}

/// 创建团队，`members` 为 (姓名, 关联用户)；第一个成员为队长
pub(crate) async fn seed_team(
    storage: &SeaOrmStorage,
    team_number: &str,
    mentor_id: Option<i64>,
    lead_id: i64,
    members: &[(&str, Option<i64>)],
) -> SeededTeam {
    let now = chrono::Utc::now().timestamp();
    let team = teams::ActiveModel {
        team_number: Set(team_number.to_string()),
        project_title: Set(format!("Project {team_number}")),
        project_category: Set("Education".to_string()),
        batch: Set("2025".to_string()),
        status: Set(TeamStatus::Approved.to_string()),
        mentor_id: Set(mentor_id),
        lead_id: Set(lead_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .expect("seed team");

    let mut member_ids = Vec::with_capacity(members.len());
    for (position, (name, user_id)) in members.iter().enumerate() {
        let role = if position == 0 {
            MemberRole::Leader
        } else {
            MemberRole::Member
        };
        member_ids
            .push(add_member(storage, team.id, name, *user_id, role, position as i32).await);
    }

    SeededTeam {
        team_id: team.id,
        member_ids,
    }
}

pub(crate) async fn add_member(
    storage: &SeaOrmStorage,
    team_id: i64,
    name: &str,
    user_id: Option<i64>,
    role: MemberRole,
    position: i32,
) -> i64 {
    team_members::ActiveModel {
        team_id: Set(team_id),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        email: Set(format!("{}@example.edu", name.to_lowercase())),
        role: Set(role.to_string()),
        roll_number: Set(None),
        position: Set(position),
        removed_at: Set(None),
        joined_at: Set(chrono::Utc::now().timestamp()),
        ..Default::default()
    }
    .insert(&storage.db)
    .await
    .expect("seed member")
    .id
}

pub(crate) async fn remove_member(storage: &SeaOrmStorage, member_id: i64) {
    let member = team_members::Entity::find_by_id(member_id)
        .one(&storage.db)
        .await
        .expect("load member")
        .expect("member exists");
    let mut active: team_members::ActiveModel = member.into();
    active.removed_at = Set(Some(chrono::Utc::now().timestamp()));
    active.update(&storage.db).await.expect("remove member");
}
