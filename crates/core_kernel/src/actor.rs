//! The acting user behind every state transition
//!
//! Review and closure actions never read an ambient session; the caller
//! passes the acting user's identity and role explicitly so that domain
//! logic stays unit-testable without an HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifiers::{FacilityId, TpaId};

/// The role an actor holds within the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ActorRole {
    /// Staff of a healthcare facility, scoped to that facility
    Facility { facility_id: FacilityId },
    /// Staff of a third-party administrator, scoped to that TPA
    Tpa { tpa_id: TpaId },
    /// NHIS administrator with portal-wide authority
    Admin,
}

impl ActorRole {
    /// Short role name for error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            ActorRole::Facility { .. } => "facility",
            ActorRole::Tpa { .. } => "tpa",
            ActorRole::Admin => "admin",
        }
    }
}

/// An authenticated user identity with portal role
///
/// Authentication itself happens upstream; by the time an `Actor` exists
/// the identity is trusted. Domain transitions only decide whether the
/// role is allowed to perform them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    id: String,
    #[serde(flatten)]
    role: ActorRole,
}

impl Actor {
    /// Creates a facility staff actor
    pub fn facility(id: impl Into<String>, facility_id: FacilityId) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Facility { facility_id },
        }
    }

    /// Creates a TPA staff actor
    pub fn tpa(id: impl Into<String>, tpa_id: TpaId) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Tpa { tpa_id },
        }
    }

    /// Creates an NHIS admin actor
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ActorRole::Admin,
        }
    }

    /// The upstream identity string (staff number or email)
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> ActorRole {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, ActorRole::Admin)
    }

    /// True if this actor belongs to the given facility
    pub fn represents_facility(&self, facility_id: FacilityId) -> bool {
        matches!(self.role, ActorRole::Facility { facility_id: f } if f == facility_id)
    }

    /// True if this actor belongs to the given TPA
    pub fn represents_tpa(&self, tpa_id: TpaId) -> bool {
        matches!(self.role, ActorRole::Tpa { tpa_id: t } if t == tpa_id)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.role.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_actor_scoping() {
        let ours = FacilityId::new();
        let theirs = FacilityId::new();
        let actor = Actor::facility("staff-114", ours);

        assert!(actor.represents_facility(ours));
        assert!(!actor.represents_facility(theirs));
        assert!(!actor.is_admin());
    }

    #[test]
    fn test_tpa_actor_scoping() {
        let tpa_id = TpaId::new();
        let actor = Actor::tpa("reviewer@tpa.example", tpa_id);

        assert!(actor.represents_tpa(tpa_id));
        assert!(!actor.represents_facility(FacilityId::new()));
    }

    #[test]
    fn test_admin_is_not_org_scoped() {
        let actor = Actor::admin("nhis-admin-1");

        assert!(actor.is_admin());
        assert!(!actor.represents_facility(FacilityId::new()));
        assert!(!actor.represents_tpa(TpaId::new()));
    }

    #[test]
    fn test_actor_serde_shape() {
        let actor = Actor::admin("nhis-admin-1");
        let json = serde_json::to_value(&actor).unwrap();

        assert_eq!(json["id"], "nhis-admin-1");
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn test_actor_display() {
        let actor = Actor::tpa("rv-9", TpaId::new());
        assert_eq!(actor.to_string(), "rv-9 (tpa)");
    }
}
