use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::models::application::{Application, Contact};
use crate::models::status::ApplicationStatus;
use crate::services::report_service::{parse_status_label, status_badge, StatusBadge};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicationPayload {
    #[serde(default, alias = "studentId", alias = "studentUsername")]
    pub student_id: Option<String>,
    #[serde(alias = "internshipTitle")]
    #[validate(length(min = 1, max = 200))]
    pub internship_title: String,
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[serde(default, alias = "resumeLink")]
    #[validate(url)]
    pub resume_link: Option<String>,
}

impl CreateApplicationPayload {
    /// Dashboards post empty strings for untouched inputs; treat them as absent.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            student_id: clean(self.student_id),
            internship_title: self.internship_title.trim().to_string(),
            name: clean(self.name),
            email: clean(self.email),
            phone: clean(self.phone),
            resume_link: clean(self.resume_link),
        }
    }

    pub fn contact(&self) -> Contact {
        Contact {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            resume_link: self.resume_link.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
    #[serde(default, alias = "expectedStatus")]
    pub expected_status: Option<String>,
}

impl UpdateStatusPayload {
    pub fn requested(&self) -> Result<ApplicationStatus> {
        parse_status_label(&self.status)
    }

    pub fn expected(&self) -> Result<Option<ApplicationStatus>> {
        self.expected_status
            .as_deref()
            .map(parse_status_label)
            .transpose()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationListQuery {
    #[serde(alias = "studentId")]
    pub student_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationResponse {
    #[serde(flatten)]
    pub application: Application,
    pub badge: StatusBadge,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        let badge = status_badge(application.status);
        Self { application, badge }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub total: usize,
}

impl From<Vec<Application>> for ApplicationListResponse {
    fn from(items: Vec<Application>) -> Self {
        Self {
            total: items.len(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountsResponse {
    pub counts: BTreeMap<ApplicationStatus, i64>,
    pub total: i64,
}

impl From<BTreeMap<ApplicationStatus, i64>> for StatusCountsResponse {
    fn from(counts: BTreeMap<ApplicationStatus, i64>) -> Self {
        Self {
            total: counts.values().sum(),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_legacy_field_names_and_blank_inputs() {
        let payload: CreateApplicationPayload = serde_json::from_value(json!({
            "studentUsername": "s1",
            "internshipTitle": "AI Internship",
            "email": "",
            "resumeLink": "  ",
        }))
        .unwrap();
        let payload = payload.normalized();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.student_id.as_deref(), Some("s1"));
        assert_eq!(payload.contact(), Contact::default());
    }

    #[test]
    fn rejects_malformed_contact_fields() {
        let payload: CreateApplicationPayload = serde_json::from_value(json!({
            "internship_title": "Web Dev",
            "email": "not-an-email",
            "resume_link": "nope",
        }))
        .unwrap();
        let errors = payload.normalized().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("resume_link"));
    }

    #[test]
    fn status_payload_uses_the_synonym_map() {
        let payload = UpdateStatusPayload {
            status: "accepted".into(),
            expected_status: Some("pending".into()),
        };
        assert_eq!(payload.requested().unwrap(), ApplicationStatus::Approved);
        assert_eq!(payload.expected().unwrap(), Some(ApplicationStatus::Pending));
    }
}
