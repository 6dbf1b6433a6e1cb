use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::{ApplicationStore, DeleteOutcome};
use crate::error::{Error, Result};
use crate::models::actor::Actor;
use crate::models::application::{Application, Contact, NewApplication};
use crate::models::status::ApplicationStatus;

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        student_id: &str,
        internship_title: &str,
        contact: Contact,
    ) -> Result<Application> {
        let new = NewApplication::new(student_id, internship_title, contact)?;
        let application = self.store.insert(new).await?;
        tracing::info!(
            application_id = %application.id,
            student_id = %application.student_id,
            "application created"
        );
        Ok(application)
    }

    /// Students apply for themselves; reviewers must name the student.
    pub async fn apply(
        &self,
        actor: &Actor,
        student_id: Option<&str>,
        internship_title: &str,
        contact: Contact,
    ) -> Result<Application> {
        let student_id = match student_id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) if !actor.can_access(id) => {
                return Err(Error::Forbidden(
                    "Students can only apply on their own behalf".into(),
                ))
            }
            Some(id) => id,
            None if actor.role.is_reviewer() => {
                return Err(Error::Validation("studentId is required".into()))
            }
            None => actor.id.as_str(),
        };
        self.create(student_id, internship_title, contact).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Application> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))
    }

    pub async fn get_for(&self, id: Uuid, actor: &Actor) -> Result<Application> {
        let application = self.get(id).await?;
        ensure_access(actor, &application)?;
        Ok(application)
    }

    pub async fn list_by_student(&self, student_id: &str) -> Result<Vec<Application>> {
        self.store.list_by_student(student_id.trim()).await
    }

    pub async fn list_all(&self, status: Option<ApplicationStatus>) -> Result<Vec<Application>> {
        self.store.list_all(status).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        match self.store.delete_pre_terminal(id).await? {
            DeleteOutcome::Deleted => {
                tracing::info!(application_id = %id, "application deleted");
                Ok(())
            }
            DeleteOutcome::Missing => Err(Error::NotFound(format!("Application {} not found", id))),
            DeleteOutcome::Terminal(status) => {
                tracing::warn!(application_id = %id, %status, "refused to delete terminal application");
                Err(Error::TerminalRecord { status })
            }
        }
    }

    /// Withdrawal by the owning student or removal by a reviewer.
    pub async fn remove(&self, id: Uuid, actor: &Actor) -> Result<()> {
        self.get_for(id, actor).await?;
        self.delete(id).await
    }
}

pub(crate) fn ensure_access(actor: &Actor, application: &Application) -> Result<()> {
    if actor.can_access(&application.student_id) {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "Application belongs to another student".into(),
        ))
    }
}
