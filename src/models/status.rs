use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::actor::ActorRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Completed,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Completed => "Completed",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Completed | ApplicationStatus::Withdrawn
        )
    }

    /// Targets reachable from this status by any actor.
    pub fn allowed_targets(&self) -> Vec<ApplicationStatus> {
        TRANSITIONS
            .iter()
            .filter(|rule| rule.from == *self)
            .map(|rule| rule.to)
            .collect()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the canonical stored spelling only. Client synonyms go through
/// `services::report_service::parse_status_label`.
impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status '{}'", s))
    }
}

/// Which side of the lifecycle may perform a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionActor {
    Reviewer,
    Applicant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRule {
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
    pub actor: TransitionActor,
}

const fn rule(
    from: ApplicationStatus,
    to: ApplicationStatus,
    actor: TransitionActor,
) -> TransitionRule {
    TransitionRule { from, to, actor }
}

pub const TRANSITIONS: [TransitionRule; 6] = [
    rule(ApplicationStatus::Pending, ApplicationStatus::Approved, TransitionActor::Reviewer),
    rule(ApplicationStatus::Pending, ApplicationStatus::Rejected, TransitionActor::Reviewer),
    rule(ApplicationStatus::Pending, ApplicationStatus::Withdrawn, TransitionActor::Applicant),
    rule(ApplicationStatus::Approved, ApplicationStatus::Completed, TransitionActor::Reviewer),
    rule(ApplicationStatus::Approved, ApplicationStatus::Withdrawn, TransitionActor::Applicant),
    rule(ApplicationStatus::Approved, ApplicationStatus::Rejected, TransitionActor::Reviewer),
];

pub fn rule_for(from: ApplicationStatus, to: ApplicationStatus) -> Option<&'static TransitionRule> {
    TRANSITIONS
        .iter()
        .find(|rule| rule.from == from && rule.to == to)
}

pub fn permits(from: ApplicationStatus, to: ApplicationStatus, role: ActorRole) -> bool {
    rule_for(from, to).is_some_and(|rule| role.transition_actor() == rule.actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REVIEWERS: [ActorRole; 2] = [ActorRole::Admin, ActorRole::Employer];

    #[test]
    fn table_matches_lifecycle() {
        use ApplicationStatus::*;

        for role in REVIEWERS {
            assert!(permits(Pending, Approved, role));
            assert!(permits(Pending, Rejected, role));
            assert!(permits(Approved, Completed, role));
            assert!(permits(Approved, Rejected, role));
            assert!(!permits(Pending, Withdrawn, role));
            assert!(!permits(Approved, Withdrawn, role));
        }

        assert!(permits(Pending, Withdrawn, ActorRole::Student));
        assert!(permits(Approved, Withdrawn, ActorRole::Student));
        assert!(!permits(Pending, Approved, ActorRole::Student));
        assert!(!permits(Approved, Completed, ActorRole::Student));
    }

    #[test]
    fn self_transitions_are_never_legal() {
        for status in ApplicationStatus::ALL {
            assert!(rule_for(status, status).is_none(), "{status} -> {status}");
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in ApplicationStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(status.allowed_targets().is_empty());
            for target in ApplicationStatus::ALL {
                assert!(rule_for(status, target).is_none());
            }
        }
    }

    #[test]
    fn only_the_six_listed_pairs_exist() {
        let legal = ApplicationStatus::ALL
            .iter()
            .flat_map(|from| ApplicationStatus::ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| rule_for(*from, *to).is_some())
            .count();
        assert_eq!(legal, 6);
    }

    #[test]
    fn canonical_spelling_round_trips() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert!("accepted".parse::<ApplicationStatus>().is_err());
        assert!("pending".parse::<ApplicationStatus>().is_err());
    }
}
