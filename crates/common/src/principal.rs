use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The principal that issued a command or event.
///
/// Every stored event records who caused it. A principal is either an
/// authenticated end user, an internal system actor, or unauthenticated
/// (no identity at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Principal {
    /// An authenticated end user.
    Authenticated(Uuid),

    /// An internal system actor (background jobs, migrations).
    System(Uuid),

    /// No identity. Commands issued anonymously.
    Unauthenticated,
}

impl Principal {
    /// Returns the principal's identity, if it has one.
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Principal::Authenticated(id) | Principal::System(id) => Some(*id),
            Principal::Unauthenticated => None,
        }
    }

    /// Returns true for authenticated end users.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated(_))
    }

    /// Returns true for internal system actors.
    pub fn is_system(&self) -> bool {
        matches!(self, Principal::System(_))
    }
}

impl Default for Principal {
    fn default() -> Self {
        Principal::Unauthenticated
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Principal::Authenticated(id) => write!(f, "authenticated:{id}"),
            Principal::System(id) => write!(f, "system:{id}"),
            Principal::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}
