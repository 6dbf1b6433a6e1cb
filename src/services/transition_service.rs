use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::{ApplicationStore, StatusWrite};
use crate::error::{Error, Result};
use crate::models::actor::Actor;
use crate::models::application::Application;
use crate::models::status::{permits, ApplicationStatus};
use crate::services::application_service::ensure_access;
use crate::utils::time::now;

/// The only path that changes an application's status.
#[derive(Clone)]
pub struct TransitionService {
    store: Arc<dyn ApplicationStore>,
}

impl TransitionService {
    pub fn new(store: Arc<dyn ApplicationStore>) -> Self {
        Self { store }
    }

    /// Moves the record from whatever status it holds now. The write is a
    /// compare-and-swap against the status read here, so it never applies
    /// over a change it did not see, but two sequentially legal requests can
    /// both succeed: an approval followed by a withdrawal ends in `Withdrawn`.
    /// Callers that need one of two competing requests to lose should use
    /// `transition_from` (`expected_status` over HTTP).
    pub async fn transition(
        &self,
        id: Uuid,
        requested: ApplicationStatus,
        actor: &Actor,
    ) -> Result<Application> {
        self.apply(id, None, requested, actor).await
    }

    /// Like `transition`, but fails with `ConcurrencyConflict` unless the
    /// record is still in the status the caller last observed.
    pub async fn transition_from(
        &self,
        id: Uuid,
        expected: ApplicationStatus,
        requested: ApplicationStatus,
        actor: &Actor,
    ) -> Result<Application> {
        self.apply(id, Some(expected), requested, actor).await
    }

    pub async fn approve(&self, id: Uuid, actor: &Actor) -> Result<Application> {
        self.transition(id, ApplicationStatus::Approved, actor).await
    }

    pub async fn reject(&self, id: Uuid, actor: &Actor) -> Result<Application> {
        self.transition(id, ApplicationStatus::Rejected, actor).await
    }

    pub async fn complete(&self, id: Uuid, actor: &Actor) -> Result<Application> {
        self.transition(id, ApplicationStatus::Completed, actor).await
    }

    async fn apply(
        &self,
        id: Uuid,
        expected: Option<ApplicationStatus>,
        requested: ApplicationStatus,
        actor: &Actor,
    ) -> Result<Application> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", id)))?;
        ensure_access(actor, &current)?;

        if let Some(expected) = expected {
            if expected != current.status {
                tracing::warn!(application_id = %id, %expected, current = %current.status, "stale transition request");
                return Err(Error::ConcurrencyConflict {
                    current: current.status,
                });
            }
        }

        if !permits(current.status, requested, actor.role) {
            tracing::warn!(
                application_id = %id,
                from = %current.status,
                to = %requested,
                role = %actor.role,
                "illegal transition rejected"
            );
            return Err(Error::IllegalTransition {
                from: current.status,
                to: requested,
            });
        }

        match self
            .store
            .compare_and_set_status(id, current.status, requested, now())
            .await?
        {
            StatusWrite::Applied(updated) => {
                tracing::info!(
                    application_id = %id,
                    from = %current.status,
                    to = %updated.status,
                    actor_id = %actor.id,
                    role = %actor.role,
                    "application status changed"
                );
                Ok(updated)
            }
            StatusWrite::Stale(now_status) => {
                tracing::warn!(application_id = %id, expected = %current.status, current = %now_status, "lost status race");
                Err(Error::ConcurrencyConflict {
                    current: now_status,
                })
            }
            StatusWrite::Missing => Err(Error::NotFound(format!("Application {} not found", id))),
        }
    }
}
