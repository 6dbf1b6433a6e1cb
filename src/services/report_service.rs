use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::database::store::ApplicationStore;
use crate::error::{Error, Result};
use crate::models::status::ApplicationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BadgeCategory {
    PendingLike,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub category: BadgeCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDictionaryEntry {
    pub status: ApplicationStatus,
    pub badge: StatusBadge,
    pub terminal: bool,
    pub next: Vec<ApplicationStatus>,
}

pub fn status_badge(status: ApplicationStatus) -> StatusBadge {
    let category = match status {
        ApplicationStatus::Pending => BadgeCategory::PendingLike,
        ApplicationStatus::Approved | ApplicationStatus::Completed => BadgeCategory::Success,
        ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => BadgeCategory::Failure,
    };
    StatusBadge {
        label: status.as_str(),
        category,
    }
}

/// Client vocabulary accepted on input. Dashboards historically sent
/// "accepted", "Ongoing", "Not Completed" and friends.
const SYNONYMS: &[(&str, ApplicationStatus)] = &[
    ("pending", ApplicationStatus::Pending),
    ("applied", ApplicationStatus::Pending),
    ("approved", ApplicationStatus::Approved),
    ("accepted", ApplicationStatus::Approved),
    ("ongoing", ApplicationStatus::Approved),
    ("shortlisted", ApplicationStatus::Approved),
    ("not completed", ApplicationStatus::Approved),
    ("rejected", ApplicationStatus::Rejected),
    ("declined", ApplicationStatus::Rejected),
    ("completed", ApplicationStatus::Completed),
    ("withdrawn", ApplicationStatus::Withdrawn),
    ("cancelled", ApplicationStatus::Withdrawn),
];

pub fn parse_status_label(label: &str) -> Result<ApplicationStatus> {
    let normalized = label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == normalized)
        .map(|(_, status)| *status)
        .ok_or_else(|| Error::Validation(format!("Unknown application status '{}'", label.trim())))
}

pub fn status_dictionary() -> Vec<StatusDictionaryEntry> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|status| StatusDictionaryEntry {
            status,
            badge: status_badge(status),
            terminal: status.is_terminal(),
            next: status.allowed_targets(),
        })
        .collect()
}

/// Read-side aggregates, recomputed from the store on every call.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ApplicationStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    pub async fn count_by_status(&self) -> Result<BTreeMap<ApplicationStatus, i64>> {
        let mut counts: BTreeMap<ApplicationStatus, i64> =
            ApplicationStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for (status, count) in self.store.count_by_status().await? {
            *counts.entry(status).or_default() += count;
        }
        Ok(counts)
    }
}
