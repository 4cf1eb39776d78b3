use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Role of the caller, as asserted by the identity layer in front of this
/// service. The core never authenticates; it only maps roles to capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Dentist,
    Staff,
    Admin,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "dentist" => Ok(Role::Dentist),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// What a caller is allowed to do. Resolved once at the request boundary so
/// no role-keyed branching leaks into the scheduling core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Create appointments through the booking validator.
    pub can_book: bool,
    /// Create/delete weekly windows and time-off entries.
    pub can_modify_schedule: bool,
    /// Drive the appointment status lifecycle (confirm/complete/cancel).
    pub can_admit: bool,
}

impl Role {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Role::Patient => Capabilities {
                can_book: true,
                can_modify_schedule: false,
                can_admit: false,
            },
            Role::Dentist => Capabilities {
                can_book: false,
                can_modify_schedule: true,
                can_admit: true,
            },
            Role::Staff => Capabilities {
                can_book: true,
                can_modify_schedule: false,
                can_admit: true,
            },
            Role::Admin => Capabilities {
                can_book: true,
                can_modify_schedule: true,
                can_admit: true,
            },
        }
    }
}

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }
}
