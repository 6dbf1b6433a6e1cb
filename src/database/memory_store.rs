use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::database::store::{ApplicationStore, DeleteOutcome, StatusWrite};
use crate::error::Result;
use crate::models::application::{Application, NewApplication};
use crate::models::status::ApplicationStatus;
use crate::utils::time::now;

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    application: Application,
}

/// Process-local store. Status writes take the per-key shard lock, which
/// gives the same compare-and-swap guarantee as the Postgres `UPDATE`.
#[derive(Debug, Default)]
pub struct MemoryApplicationStore {
    records: DashMap<Uuid, Entry>,
    next_seq: AtomicU64,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, keep: impl Fn(&Application) -> bool) -> Vec<Application> {
        let mut entries: Vec<Entry> = self
            .records
            .iter()
            .filter(|e| keep(&e.application))
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| {
            b.application
                .applied_at
                .cmp(&a.application.applied_at)
                .then(b.seq.cmp(&a.seq))
        });
        entries.into_iter().map(|e| e.application).collect()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, new: NewApplication) -> Result<Application> {
        let application = new.into_application(Uuid::new_v4(), now());
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.records.insert(
            application.id,
            Entry {
                seq,
                application: application.clone(),
            },
        );
        Ok(application)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(self.records.get(&id).map(|e| e.application.clone()))
    }

    async fn list_by_student(&self, student_id: &str) -> Result<Vec<Application>> {
        Ok(self.sorted(|a| a.student_id == student_id))
    }

    async fn list_all(&self, status: Option<ApplicationStatus>) -> Result<Vec<Application>> {
        Ok(self.sorted(|a| status.map_or(true, |s| a.status == s)))
    }

    async fn delete_pre_terminal(&self, id: Uuid) -> Result<DeleteOutcome> {
        if self
            .records
            .remove_if(&id, |_, e| !e.application.status.is_terminal())
            .is_some()
        {
            return Ok(DeleteOutcome::Deleted);
        }
        Ok(match self.records.get(&id) {
            Some(e) => DeleteOutcome::Terminal(e.application.status),
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
        let Some(mut entry) = self.records.get_mut(&id) else {
            return Ok(StatusWrite::Missing);
        };
        let application = &mut entry.application;
        if application.status != expected {
            return Ok(StatusWrite::Stale(application.status));
        }
        application.status = next;
        application.status_updated_at = at.max(application.applied_at);
        Ok(StatusWrite::Applied(application.clone()))
    }

    async fn count_by_status(&self) -> Result<Vec<(ApplicationStatus, i64)>> {
        let mut counts: HashMap<ApplicationStatus, i64> = HashMap::new();
        for entry in self.records.iter() {
            *counts.entry(entry.application.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::Contact;

    fn new_app(student: &str, title: &str) -> NewApplication {
        NewApplication::new(student, title, Contact::default()).unwrap()
    }

    #[tokio::test]
    async fn lists_newest_first_per_student() {
        let store = MemoryApplicationStore::new();
        let first = store.insert(new_app("s1", "AI Internship")).await.unwrap();
        let second = store.insert(new_app("s1", "Web Dev")).await.unwrap();
        store.insert(new_app("s2", "Data")).await.unwrap();

        let listed = store.list_by_student("s1").await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(store.list_all(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn cas_rejects_stale_expectation() {
        let store = MemoryApplicationStore::new();
        let app = store.insert(new_app("s1", "AI Internship")).await.unwrap();

        let write = store
            .compare_and_set_status(app.id, ApplicationStatus::Approved, ApplicationStatus::Completed, now())
            .await
            .unwrap();
        assert_eq!(write, StatusWrite::Stale(ApplicationStatus::Pending));

        let write = store
            .compare_and_set_status(app.id, ApplicationStatus::Pending, ApplicationStatus::Approved, now())
            .await
            .unwrap();
        let StatusWrite::Applied(updated) = write else {
            panic!("expected applied write, got {write:?}");
        };
        assert_eq!(updated.status, ApplicationStatus::Approved);
        assert!(updated.status_updated_at >= updated.applied_at);

        let missing = store
            .compare_and_set_status(Uuid::new_v4(), ApplicationStatus::Pending, ApplicationStatus::Approved, now())
            .await
            .unwrap();
        assert_eq!(missing, StatusWrite::Missing);
    }

    #[tokio::test]
    async fn status_timestamp_never_precedes_creation() {
        let store = MemoryApplicationStore::new();
        let app = store.insert(new_app("s1", "AI Internship")).await.unwrap();
        let earlier = app.applied_at - chrono::Duration::hours(1);

        let StatusWrite::Applied(updated) = store
            .compare_and_set_status(app.id, ApplicationStatus::Pending, ApplicationStatus::Approved, earlier)
            .await
            .unwrap()
        else {
            panic!("write should apply");
        };
        assert_eq!(updated.status_updated_at, app.applied_at);
    }

    #[tokio::test]
    async fn delete_refuses_terminal_records() {
        let store = MemoryApplicationStore::new();
        let open = store.insert(new_app("s1", "Web Dev")).await.unwrap();
        let closed = store.insert(new_app("s1", "AI Internship")).await.unwrap();
        store
            .compare_and_set_status(closed.id, ApplicationStatus::Pending, ApplicationStatus::Rejected, now())
            .await
            .unwrap();

        assert_eq!(store.delete_pre_terminal(open.id).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(store.delete_pre_terminal(open.id).await.unwrap(), DeleteOutcome::Missing);
        assert_eq!(
            store.delete_pre_terminal(closed.id).await.unwrap(),
            DeleteOutcome::Terminal(ApplicationStatus::Rejected)
        );
        assert!(store.get(closed.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn filters_and_counts_by_status() {
        let store = MemoryApplicationStore::new();
        let a = store.insert(new_app("s1", "A")).await.unwrap();
        store.insert(new_app("s2", "B")).await.unwrap();
        store
            .compare_and_set_status(a.id, ApplicationStatus::Pending, ApplicationStatus::Approved, now())
            .await
            .unwrap();

        let approved = store.list_all(Some(ApplicationStatus::Approved)).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a.id);

        let mut counts = store.count_by_status().await.unwrap();
        counts.sort();
        assert_eq!(
            counts,
            vec![(ApplicationStatus::Pending, 1), (ApplicationStatus::Approved, 1)]
        );
    }
}
