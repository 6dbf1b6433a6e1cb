use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store::{ApplicationStore, DeleteOutcome, StatusWrite};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationRow, NewApplication};
use crate::models::status::ApplicationStatus;
use crate::utils::time::now;

const COLUMNS: &str = "id, student_id, internship_title, contact_name, contact_email, \
    contact_phone, resume_link, status, applied_at, status_updated_at";

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: Uuid) -> Result<Option<ApplicationStatus>> {
        let status: Option<String> =
            sqlx::query_scalar(r#"SELECT status FROM applications WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        status
            .map(|s| {
                s.parse::<ApplicationStatus>()
                    .map_err(|e| Error::CorruptRecord(format!("application {}: {}", id, e)))
            })
            .transpose()
    }
}

fn into_applications(rows: Vec<ApplicationRow>) -> Result<Vec<Application>> {
    rows.into_iter().map(Application::try_from).collect()
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, new: NewApplication) -> Result<Application> {
        let applied_at = now();
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications (
                id, student_id, internship_title, contact_name, contact_email,
                contact_phone, resume_link, status, applied_at, status_updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.student_id)
        .bind(new.internship_title)
        .bind(new.contact.name)
        .bind(new.contact.email)
        .bind(new.contact.phone)
        .bind(new.contact.resume_link)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(applied_at)
        .fetch_one(&self.pool)
        .await?;

        Application::try_from(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Application::try_from).transpose()
    }

    async fn list_by_student(&self, student_id: &str) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {COLUMNS} FROM applications WHERE student_id = $1 \
             ORDER BY applied_at DESC, id DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        into_applications(rows)
    }

    async fn list_all(&self, status: Option<ApplicationStatus>) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {COLUMNS} FROM applications WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY applied_at DESC, id DESC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        into_applications(rows)
    }

    async fn delete_pre_terminal(&self, id: Uuid) -> Result<DeleteOutcome> {
        let open: Vec<&str> = ApplicationStatus::ALL
            .iter()
            .filter(|s| !s.is_terminal())
            .map(|s| s.as_str())
            .collect();

        let result = sqlx::query(r#"DELETE FROM applications WHERE id = $1 AND status = ANY($2)"#)
            .bind(id)
            .bind(&open)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(DeleteOutcome::Deleted);
        }
        Ok(match self.current_status(id).await? {
            Some(status) => DeleteOutcome::Terminal(status),
            None => DeleteOutcome::Missing,
        })
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusWrite> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications
            SET status = $3, status_updated_at = GREATEST($4, applied_at)
            WHERE id = $1 AND status = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(StatusWrite::Applied(Application::try_from(row)?));
        }
        Ok(match self.current_status(id).await? {
            Some(current) => StatusWrite::Stale(current),
            None => StatusWrite::Missing,
        })
    }

    async fn count_by_status(&self) -> Result<Vec<(ApplicationStatus, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"SELECT status, COUNT(*) FROM applications GROUP BY status"#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count)| {
                status
                    .parse::<ApplicationStatus>()
                    .map(|s| (s, count))
                    .map_err(Error::CorruptRecord)
            })
            .collect()
    }
}
