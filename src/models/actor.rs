use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::status::TransitionActor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Student,
    Admin,
    Employer,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Student => "student",
            ActorRole::Admin => "admin",
            ActorRole::Employer => "employer",
        }
    }

    pub fn is_reviewer(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::Employer)
    }

    pub fn transition_actor(&self) -> TransitionActor {
        if self.is_reviewer() {
            TransitionActor::Reviewer
        } else {
            TransitionActor::Applicant
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = s.trim();
        [ActorRole::Student, ActorRole::Admin, ActorRole::Employer]
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(role))
            .ok_or_else(|| format!("unknown actor role '{}'", role))
    }
}

/// Identity of whoever is calling, as asserted by the token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self { id: id.into(), role }
    }

    pub fn student(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Student)
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Admin)
    }

    pub fn employer(id: impl Into<String>) -> Self {
        Self::new(id, ActorRole::Employer)
    }

    /// Reviewers see everything; students only their own records.
    pub fn can_access(&self, student_id: &str) -> bool {
        self.role.is_reviewer() || self.id == student_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Admin".parse::<ActorRole>().unwrap(), ActorRole::Admin);
        assert_eq!(" employer".parse::<ActorRole>().unwrap(), ActorRole::Employer);
        assert_eq!("STUDENT".parse::<ActorRole>().unwrap(), ActorRole::Student);
        assert!("hr".parse::<ActorRole>().is_err());
    }

    #[test]
    fn students_only_reach_their_own_records() {
        let student = Actor::student("s1");
        assert!(student.can_access("s1"));
        assert!(!student.can_access("s2"));
        assert!(Actor::employer("e1").can_access("s2"));
    }
}
