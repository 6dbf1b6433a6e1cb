use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::status::ApplicationStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub resume_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub student_id: String,
    pub internship_title: String,
    pub contact: Contact,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

/// Input for a new record; fields are already trimmed and checked.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub student_id: String,
    pub internship_title: String,
    pub contact: Contact,
}

impl NewApplication {
    pub fn new(student_id: &str, internship_title: &str, contact: Contact) -> Result<Self> {
        let student_id = student_id.trim();
        let internship_title = internship_title.trim();
        if student_id.is_empty() {
            return Err(Error::Validation("studentId is required".into()));
        }
        if internship_title.is_empty() {
            return Err(Error::Validation("internshipTitle is required".into()));
        }

        Ok(Self {
            student_id: student_id.to_string(),
            internship_title: internship_title.to_string(),
            contact: Contact {
                name: non_blank(contact.name),
                email: non_blank(contact.email),
                phone: non_blank(contact.phone),
                resume_link: non_blank(contact.resume_link),
            },
        })
    }

    pub fn into_application(self, id: Uuid, applied_at: DateTime<Utc>) -> Application {
        Application {
            id,
            student_id: self.student_id,
            internship_title: self.internship_title,
            contact: self.contact,
            status: ApplicationStatus::Pending,
            applied_at,
            status_updated_at: applied_at,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Row shape of the `applications` table.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub student_id: String,
    pub internship_title: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub resume_link: Option<String>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub status_updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        let status = row
            .status
            .parse::<ApplicationStatus>()
            .map_err(|e| Error::CorruptRecord(format!("application {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            student_id: row.student_id,
            internship_title: row.internship_title,
            contact: Contact {
                name: row.contact_name,
                email: row.contact_email,
                phone: row.contact_phone,
                resume_link: row.resume_link,
            },
            status,
            applied_at: row.applied_at,
            status_updated_at: row.status_updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> ApplicationRow {
        let now = Utc::now();
        ApplicationRow {
            id: Uuid::new_v4(),
            student_id: "s1".into(),
            internship_title: "AI Internship".into(),
            contact_name: Some("Asha".into()),
            contact_email: None,
            contact_phone: None,
            resume_link: None,
            status: status.into(),
            applied_at: now,
            status_updated_at: now,
        }
    }

    #[test]
    fn rejects_blank_required_fields() {
        assert!(matches!(
            NewApplication::new("  ", "Web Dev", Contact::default()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            NewApplication::new("s1", "", Contact::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn trims_input_and_drops_empty_contact_fields() {
        let contact = Contact {
            name: Some(" Asha ".into()),
            email: Some("   ".into()),
            ..Default::default()
        };
        let new = NewApplication::new(" s1 ", " Web Dev ", contact).unwrap();
        assert_eq!(new.student_id, "s1");
        assert_eq!(new.internship_title, "Web Dev");
        assert_eq!(new.contact.name.as_deref(), Some("Asha"));
        assert_eq!(new.contact.email, None);
    }

    #[test]
    fn new_records_start_pending_with_equal_timestamps() {
        let now = Utc::now();
        let app = NewApplication::new("s1", "Web Dev", Contact::default())
            .unwrap()
            .into_application(Uuid::new_v4(), now);
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.applied_at, app.status_updated_at);
    }

    #[test]
    fn stored_rows_must_carry_a_known_status() {
        let app = Application::try_from(row("Approved")).unwrap();
        assert_eq!(app.status, ApplicationStatus::Approved);
        assert_eq!(app.contact.name.as_deref(), Some("Asha"));

        assert!(matches!(
            Application::try_from(row("Ongoing")),
            Err(Error::CorruptRecord(_))
        ));
    }
}
