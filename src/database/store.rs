use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, NewApplication};
use crate::models::status::ApplicationStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Missing,
    Terminal(ApplicationStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusWrite {
    Applied(Application),
    Missing,
    /// The stored status no longer matched the expected one.
    Stale(ApplicationStatus),
}

/// Persistence for application records.
///
/// `compare_and_set_status` is the only status write and is reserved for
/// `TransitionService`. Implementations must apply it atomically against
/// the expected status so concurrent writers cannot both succeed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, new: NewApplication) -> Result<Application>;

    async fn get(&self, id: Uuid) -> Result<Option<Application>>;

    /// Newest `applied_at` first.
    async fn list_by_student(&self, student_id: &str) -> Result<Vec<Application>>;

    /// Newest `applied_at` first.
    async fn list_all(&self, status: Option<ApplicationStatus>) -> Result<Vec<Application>>;

    /// Removes the record only while its status is not terminal.
    async fn delete_pre_terminal(&self, id: Uuid) -> Result<DeleteOutcome>;

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        next: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusWrite>;

    /// Statuses with no records may be omitted.
    async fn count_by_status(&self) -> Result<Vec<(ApplicationStatus, i64)>>;
}
