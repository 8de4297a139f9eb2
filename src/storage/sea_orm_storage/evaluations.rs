//! 评分存储操作
//!
//! 创建与替换都在单个事务内完成，并持有团队写锁，
//! 同一团队的两次写入不会交错执行（后写者整体覆盖）。

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::evaluations::{self, ActiveModel, Column, Entity as Evaluations};
use crate::entity::individual_evaluations::{
    ActiveModel as RowActiveModel, Column as RowColumn, Entity as IndividualEvaluations,
};
use crate::entity::team_members::Entity as TeamMembers;
use crate::entity::teams::Entity as Teams;
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{PortalError, Result};
use crate::models::evaluations::{
    Evaluation, EvaluationStatus, IndividualEvaluation, responses::EvaluationExportRow,
};
use crate::scoring::{ValidatedEvaluation, ValidatedMember};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait,
};

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// 读取团队评分及其个人评分（按成员顺序）
async fn load_evaluation<C: ConnectionTrait>(conn: &C, team_id: i64) -> Result<Option<Evaluation>> {
    let Some(header) = Evaluations::find()
        .filter(Column::TeamId.eq(team_id))
        .one(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询评分失败: {e}")))?
    else {
        return Ok(None);
    };

    let rows = IndividualEvaluations::find()
        .filter(RowColumn::EvaluationId.eq(header.id))
        .order_by_asc(RowColumn::Position)
        .order_by_asc(RowColumn::Id)
        .find_also_related(TeamMembers)
        .all(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询个人评分失败: {e}")))?;

    let rows = rows
        .into_iter()
        .map(|(row, member)| {
            let member = member
                .filter(|m| m.removed_at.is_none())
                .map(|m| m.into_team_member());
            row.into_individual_evaluation(member)
        })
        .collect();

    Ok(Some(header.into_evaluation(rows)))
}

/// 批量读取个人评分，按评分 ID 分组，组内保持成员顺序
async fn load_rows_by_evaluation<C: ConnectionTrait>(
    conn: &C,
    evaluation_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<IndividualEvaluation>>> {
    let mut grouped: HashMap<i64, Vec<IndividualEvaluation>> = HashMap::new();
    if evaluation_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = IndividualEvaluations::find()
        .filter(RowColumn::EvaluationId.is_in(evaluation_ids))
        .order_by_asc(RowColumn::EvaluationId)
        .order_by_asc(RowColumn::Position)
        .order_by_asc(RowColumn::Id)
        .find_also_related(TeamMembers)
        .all(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("查询个人评分失败: {e}")))?;

    for (row, member) in rows {
        let evaluation_id = row.evaluation_id;
        let member = member
            .filter(|m| m.removed_at.is_none())
            .map(|m| m.into_team_member());
        grouped
            .entry(evaluation_id)
            .or_default()
            .push(row.into_individual_evaluation(member));
    }
    Ok(grouped)
}

/// 组装多条评分表头及其个人评分（固定两次查询）
pub(super) async fn load_evaluations<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<evaluations::Model>,
) -> Result<Vec<Evaluation>> {
    let mut rows = load_rows_by_evaluation(conn, headers.iter().map(|h| h.id).collect()).await?;
    Ok(headers
        .into_iter()
        .map(|header| {
            let members = rows.remove(&header.id).unwrap_or_default();
            header.into_evaluation(members)
        })
        .collect())
}

async fn insert_rows<C: ConnectionTrait>(
    conn: &C,
    evaluation_id: i64,
    members: &[ValidatedMember],
) -> Result<()> {
    if members.is_empty() {
        return Ok(());
    }

    let rows = members
        .iter()
        .enumerate()
        .map(|(position, member)| RowActiveModel {
            evaluation_id: Set(evaluation_id),
            team_member_id: Set(member.team_member_id),
            member_name: Set(member.member_name.clone()),
            member_email: Set(member.member_email.clone().unwrap_or_default()),
            position: Set(position as i32),
            individual_score_halves: Set(member.individual_score.halves()),
            learning_contribution_halves: Set(member.learning_contribution.halves()),
            presentation_skill_halves: Set(member.presentation_skill.halves()),
            contribution_to_project_halves: Set(member.contribution_to_project.halves()),
            external_evaluator_halves: Set(member.external_evaluator_marks.halves()),
            total_halves: Set(member.total_individual_marks.halves()),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    IndividualEvaluations::insert_many(rows)
        .exec(conn)
        .await
        .map_err(|e| PortalError::database_operation(format!("写入个人评分失败: {e}")))?;

    Ok(())
}

/// 把校验后的小组分写入表头
fn apply_group_marks(model: &mut ActiveModel, evaluation: &ValidatedEvaluation) {
    model.poster_halves = Set(evaluation.poster_marks.halves());
    model.video_halves = Set(evaluation.video_marks.halves());
    model.report_halves = Set(evaluation.report_marks.halves());
    model.ppt_halves = Set(evaluation.ppt_marks.halves());
    model.group_score_halves = Set(evaluation.group_score.halves());
    model.external_evaluator_name = Set(evaluation.external_evaluator_name.clone());
    model.external_evaluator_email = Set(evaluation.external_evaluator_email.clone());
    model.remarks = Set(evaluation.remarks.clone());
}

impl SeaOrmStorage {
    /// 获取团队评分
    pub async fn get_evaluation_by_team_id_impl(&self, team_id: i64) -> Result<Option<Evaluation>> {
        load_evaluation(&self.db, team_id).await
    }

    /// 创建评分
    pub async fn create_evaluation_impl(
        &self,
        team_id: i64,
        mentor_id: i64,
        evaluation: ValidatedEvaluation,
    ) -> Result<Evaluation> {
        let lock = self.team_lock(team_id);
        let _guard = lock.lock().await;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            team_id: Set(team_id),
            mentor_id: Set(mentor_id),
            status: Set(evaluation
                .status
                .unwrap_or(EvaluationStatus::Draft)
                .to_string()),
            evaluated_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        apply_group_marks(&mut model, &evaluation);

        // 事务的第一条语句即写入，重复创建由 team_id 唯一索引拦截；
        // 团队锁只覆盖本进程，其他进程的并发创建同样落到这里
        let header = match model.insert(&txn).await {
            Ok(header) => header,
            Err(e) if is_unique_violation(&e) => {
                return Err(PortalError::conflict(format!(
                    "Evaluation already exists for team {team_id}"
                )));
            }
            Err(e) => {
                return Err(PortalError::database_operation(format!("创建评分失败: {e}")));
            }
        };

        insert_rows(&txn, header.id, &evaluation.members).await?;

        let created = load_evaluation(&txn, team_id)
            .await?
            .ok_or_else(|| PortalError::database_operation("创建后未能读取评分"))?;

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(created)
    }

    /// 整体替换评分：更新表头，删除全部个人评分后按提交列表重建
    pub async fn replace_evaluation_impl(
        &self,
        team_id: i64,
        evaluation: ValidatedEvaluation,
    ) -> Result<Option<Evaluation>> {
        let lock = self.team_lock(team_id);
        let _guard = lock.lock().await;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| PortalError::database_operation(format!("开启事务失败: {e}")))?;

        let Some(existing) = Evaluations::find()
            .filter(Column::TeamId.eq(team_id))
            .one(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询评分失败: {e}")))?
        else {
            return Ok(None);
        };

        let evaluation_id = existing.id;
        // 未提供状态时保持原状态
        let status = evaluation
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| existing.status.clone());

        let mut model: ActiveModel = existing.into();
        apply_group_marks(&mut model, &evaluation);
        model.status = Set(status);
        model.updated_at = Set(chrono::Utc::now().timestamp());
        model
            .update(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("更新评分失败: {e}")))?;

        IndividualEvaluations::delete_many()
            .filter(RowColumn::EvaluationId.eq(evaluation_id))
            .exec(&txn)
            .await
            .map_err(|e| PortalError::database_operation(format!("删除个人评分失败: {e}")))?;

        insert_rows(&txn, evaluation_id, &evaluation.members).await?;

        let updated = load_evaluation(&txn, team_id).await?;

        txn.commit()
            .await
            .map_err(|e| PortalError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(updated)
    }

    /// 导出所有个人评分（按团队编号、成员顺序）
    pub async fn list_evaluation_export_rows_impl(&self) -> Result<Vec<EvaluationExportRow>> {
        let headers = Evaluations::find()
            .find_also_related(Teams)
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询评分失败: {e}")))?;

        let mentor_ids: Vec<i64> = headers.iter().map(|(h, _)| h.mentor_id).collect();
        let mentor_emails: HashMap<i64, String> = Users::find()
            .filter(UserColumn::Id.is_in(mentor_ids))
            .all(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("查询用户失败: {e}")))?
            .into_iter()
            .map(|u| (u.id, u.email))
            .collect();

        let mut members_by_evaluation =
            load_rows_by_evaluation(&self.db, headers.iter().map(|(h, _)| h.id).collect()).await?;

        let mut rows = Vec::new();
        for (header, team) in headers {
            let Some(team) = team else { continue };
            let mentor_email = mentor_emails.get(&header.mentor_id).cloned().unwrap_or_default();
            let members = members_by_evaluation.remove(&header.id).unwrap_or_default();
            let evaluation = header.into_evaluation(members);

            for member in evaluation.individual_evaluations {
                rows.push(EvaluationExportRow {
                    team_number: team.team_number.clone(),
                    project_title: team.project_title.clone(),
                    batch: team.batch.clone(),
                    mentor_email: mentor_email.clone(),
                    status: evaluation.status.to_string(),
                    member_name: member.member_name,
                    member_email: member.member_email,
                    poster_marks: evaluation.poster_marks,
                    video_marks: evaluation.video_marks,
                    report_marks: evaluation.report_marks,
                    ppt_marks: evaluation.ppt_marks,
                    group_score: evaluation.group_score,
                    individual_score: member.individual_score,
                    learning_contribution: member.learning_contribution,
                    presentation_skill: member.presentation_skill,
                    contribution_to_project: member.contribution_to_project,
                    external_evaluator_marks: member.external_evaluator_marks,
                    total_individual_marks: member.total_individual_marks,
                    external_evaluator_name: evaluation
                        .external_evaluator_name
                        .clone()
                        .unwrap_or_default(),
                    evaluated_at: evaluation.evaluated_at.to_rfc3339(),
                });
            }
        }

        // 稳定排序，同一团队内保持成员顺序
        rows.sort_by(|a, b| a.team_number.cmp(&b.team_number));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{SeededTeam, add_member, seed_team, seed_user, storage};
    use super::*;
    use crate::models::evaluations::{EvaluationPayload, IndividualEvaluationInput};
    use crate::models::teams::MemberRole;
    use crate::models::users::UserRole;
    use crate::scoring::{self, Marks, validate_evaluation};
    use sea_orm::{DatabaseConnection, PaginatorTrait};

    fn payload(team_id: i64, member_ids: &[i64]) -> EvaluationPayload {
        EvaluationPayload {
            team_id: Some(team_id),
            poster_marks: Some(2.0),
            video_marks: Some(3.0),
            report_marks: Some(2.5),
            ppt_marks: Some(3.0),
            individual_evaluations: member_ids
                .iter()
                .map(|id| IndividualEvaluationInput {
                    team_member_id: Some(*id),
                    member_name: Some(format!("Member {id}")),
                    member_email: Some(format!("m{id}@example.edu")),
                    individual_score: Some(2.5),
                    learning_contribution: Some(2.0),
                    presentation_skill: Some(1.5),
                    contribution_to_project: Some(2.0),
                })
                .collect(),
            ..Default::default()
        }
    }

    async fn seed(storage: &SeaOrmStorage) -> (i64, SeededTeam) {
        let mentor = seed_user(storage, "Mentor", UserRole::Mentor).await;
        let lead = seed_user(storage, "Lead", UserRole::Student).await;
        let team = seed_team(
            storage,
            "T-01",
            Some(mentor),
            lead,
            &[("Lead", Some(lead)), ("Bina", None), ("Chetan", None)],
        )
        .await;
        (mentor, team)
    }

    async fn fixture() -> (SeaOrmStorage, i64, SeededTeam) {
        let storage = storage().await;
        let (mentor, team) = seed(&storage).await;
        (storage, mentor, team)
    }

    /// 多连接的文件数据库，返回的连接可供多个存储实例共用
    async fn shared_file_db(dir: &tempfile::TempDir) -> DatabaseConnection {
        SeaOrmStorage::file_backed(&dir.path().join("portal.db"), 4)
            .await
            .expect("file-backed sqlite should start")
    }

    async fn row_count(storage: &SeaOrmStorage, evaluation_id: i64) -> u64 {
        IndividualEvaluations::find()
            .filter(RowColumn::EvaluationId.eq(evaluation_id))
            .count(&storage.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_derived_fields() {
        let (storage, mentor, team) = fixture().await;
        let validated = validate_evaluation(&payload(team.team_id, &team.member_ids)).unwrap();

        let created = storage
            .create_evaluation_impl(team.team_id, mentor, validated)
            .await
            .unwrap();
        assert_eq!(created.status, EvaluationStatus::Draft);
        assert_eq!(created.group_score, Marks::from_halves(21));

        let first = storage
            .get_evaluation_by_team_id_impl(team.team_id)
            .await
            .unwrap()
            .unwrap();
        let second = storage
            .get_evaluation_by_team_id_impl(team.team_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, created);

        let ids: Vec<_> = first
            .individual_evaluations
            .iter()
            .map(|row| row.team_member_id)
            .collect();
        assert_eq!(ids, team.member_ids);

        for row in &first.individual_evaluations {
            let external = scoring::external_evaluator_marks(
                row.learning_contribution,
                row.presentation_skill,
                row.contribution_to_project,
            );
            assert_eq!(row.external_evaluator_marks, external);
            assert_eq!(
                row.total_individual_marks,
                scoring::grand_total(first.group_score, row.individual_score, external)
            );
            assert_eq!(row.total_individual_marks, Marks::from_halves(37));
            assert!(row.team_member.is_some());
        }
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts_and_keeps_first() {
        let (storage, mentor, team) = fixture().await;
        let first = validate_evaluation(&payload(team.team_id, &team.member_ids)).unwrap();
        let created = storage
            .create_evaluation_impl(team.team_id, mentor, first)
            .await
            .unwrap();

        let mut second = payload(team.team_id, &team.member_ids);
        second.poster_marks = Some(0.0);
        let second = validate_evaluation(&second).unwrap();
        let err = storage
            .create_evaluation_impl(team.team_id, mentor, second)
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Conflict(_)));

        let current = storage
            .get_evaluation_by_team_id_impl(team.team_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current, created);
    }

    #[tokio::test]
    async fn test_replace_is_full_replace_of_member_rows() {
        let (storage, mentor, team) = fixture().await;
        let validated = validate_evaluation(&payload(team.team_id, &team.member_ids)).unwrap();
        storage
            .create_evaluation_impl(team.team_id, mentor, validated)
            .await
            .unwrap();

        let newcomer =
            add_member(&storage, team.team_id, "Divya", None, MemberRole::Member, 3).await;
        let new_list = vec![team.member_ids[2], newcomer, team.member_ids[0]];
        let mut request = payload(team.team_id, &new_list);
        request.status = Some(EvaluationStatus::Submitted);
        request.video_marks = Some(1.0);
        let validated = validate_evaluation(&request).unwrap();

        let updated = storage
            .replace_evaluation_impl(team.team_id, validated)
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<_> = updated
            .individual_evaluations
            .iter()
            .map(|row| row.team_member_id)
            .collect();
        assert_eq!(ids, new_list);
        assert_eq!(updated.status, EvaluationStatus::Submitted);
        assert_eq!(updated.group_score, Marks::from_halves(17));
        assert_eq!(
            updated.individual_evaluations[0].total_individual_marks,
            Marks::from_halves(33)
        );
    }

    #[tokio::test]
    async fn test_replace_keeps_status_when_omitted() {
        let (storage, mentor, team) = fixture().await;
        let mut request = payload(team.team_id, &team.member_ids);
        request.status = Some(EvaluationStatus::Submitted);
        storage
            .create_evaluation_impl(team.team_id, mentor, validate_evaluation(&request).unwrap())
            .await
            .unwrap();

        request.status = None;
        let updated = storage
            .replace_evaluation_impl(team.team_id, validate_evaluation(&request).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, EvaluationStatus::Submitted);
    }

    #[tokio::test]
    async fn test_replace_without_evaluation_returns_none() {
        let (storage, _mentor, team) = fixture().await;
        let validated = validate_evaluation(&payload(team.team_id, &team.member_ids)).unwrap();
        let result = storage
            .replace_evaluation_impl(team.team_id, validated)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(
            storage
                .get_evaluation_by_team_id_impl(team.team_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_concurrent_replaces_never_mix_member_lists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SeaOrmStorage::from_connection(shared_file_db(&dir).await);
        let (mentor, team) = seed(&storage).await;
        let validated = validate_evaluation(&payload(team.team_id, &team.member_ids)).unwrap();
        let created = storage
            .create_evaluation_impl(team.team_id, mentor, validated)
            .await
            .unwrap();

        let list_a = vec![team.member_ids[0], team.member_ids[1]];
        let list_b = vec![team.member_ids[2]];
        let a = validate_evaluation(&payload(team.team_id, &list_a)).unwrap();
        let b = validate_evaluation(&payload(team.team_id, &list_b)).unwrap();

        // 两个写入各自占用连接池中的连接，只有团队锁让它们先后执行
        let (ra, rb) = tokio::join!(
            storage.replace_evaluation_impl(team.team_id, a),
            storage.replace_evaluation_impl(team.team_id, b),
        );
        assert!(ra.unwrap().is_some());
        assert!(rb.unwrap().is_some());

        let current = storage
            .get_evaluation_by_team_id_impl(team.team_id)
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<_> = current
            .individual_evaluations
            .iter()
            .map(|row| row.team_member_id)
            .collect();
        assert!(ids == list_a || ids == list_b, "mixed rows: {ids:?}");
        assert_eq!(row_count(&storage, created.id).await, ids.len() as u64);
    }

    #[tokio::test]
    async fn test_create_race_across_instances_yields_one_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let db = shared_file_db(&dir).await;
        // 两个实例各有独立的团队锁，相当于两个服务进程
        let first = SeaOrmStorage::from_connection(db.clone());
        let second = SeaOrmStorage::from_connection(db);
        let (mentor, team) = seed(&first).await;

        let a = validate_evaluation(&payload(team.team_id, &team.member_ids)).unwrap();
        let mut other = payload(team.team_id, &team.member_ids);
        other.poster_marks = Some(0.0);
        let b = validate_evaluation(&other).unwrap();

        let (ra, rb) = tokio::join!(
            first.create_evaluation_impl(team.team_id, mentor, a),
            second.create_evaluation_impl(team.team_id, mentor, b),
        );

        let (winner, loser) = match (ra, rb) {
            (Ok(created), Err(err)) | (Err(err), Ok(created)) => (created, err),
            (ra, rb) => panic!("expected exactly one success, got {ra:?} and {rb:?}"),
        };
        assert!(matches!(loser, PortalError::Conflict(_)), "got {loser:?}");

        let stored = second
            .get_evaluation_by_team_id_impl(team.team_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, winner);
        assert_eq!(row_count(&first, winner.id).await, team.member_ids.len() as u64);
    }

    #[tokio::test]
    async fn test_export_rows_one_per_member() {
        let (storage, mentor, team) = fixture().await;
        let validated = validate_evaluation(&payload(team.team_id, &team.member_ids)).unwrap();
        storage
            .create_evaluation_impl(team.team_id, mentor, validated)
            .await
            .unwrap();

        let rows = storage.list_evaluation_export_rows_impl().await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].team_number, "T-01");
        assert_eq!(rows[0].mentor_email, "mentor@example.edu");
        assert_eq!(rows[0].total_individual_marks, Marks::from_halves(37));
    }

    #[tokio::test]
    async fn test_export_groups_rows_by_team_and_evaluator() {
        let (storage, mentor, team) = fixture().await;
        let other_mentor = seed_user(&storage, "Reviewer", UserRole::Mentor).await;
        let lead = seed_user(&storage, "Lead2", UserRole::Student).await;
        let earlier = seed_team(
            &storage,
            "T-00",
            Some(other_mentor),
            lead,
            &[("Zara", Some(lead)), ("Yusuf", None)],
        )
        .await;

        for (team_id, members, evaluator) in [
            (team.team_id, &team.member_ids, mentor),
            (earlier.team_id, &earlier.member_ids, other_mentor),
        ] {
            let validated = validate_evaluation(&payload(team_id, members)).unwrap();
            storage
                .create_evaluation_impl(team_id, evaluator, validated)
                .await
                .unwrap();
        }

        let rows = storage.list_evaluation_export_rows_impl().await.unwrap();
        let summary: Vec<(String, String, String)> = rows
            .into_iter()
            .map(|r| (r.team_number, r.mentor_email, r.member_name))
            .collect();
        let expected = |number: &str, email: &str, member_id: i64| {
            (number.to_string(), email.to_string(), format!("Member {member_id}"))
        };
        assert_eq!(
            summary,
            vec![
                expected("T-00", "reviewer@example.edu", earlier.member_ids[0]),
                expected("T-00", "reviewer@example.edu", earlier.member_ids[1]),
                expected("T-01", "mentor@example.edu", team.member_ids[0]),
                expected("T-01", "mentor@example.edu", team.member_ids[1]),
                expected("T-01", "mentor@example.edu", team.member_ids[2]),
            ]
        );
    }
}
