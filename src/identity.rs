//! Who is using the portal
//!
//! Read-only; only the HTTP layer consults it. The conversation never
//! depends on who is asking.

/// Source of the current member's display name
pub trait CurrentActor: Send + Sync {
    fn display_name(&self) -> &str;
}

pub const GUEST: &str = "Guest";

/// Fixed identity configured at startup
#[derive(Debug, Clone)]
pub struct StaticActor {
    name: String,
}

impl StaticActor {
    /// Blank names fall back to [`GUEST`]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            GUEST.to_string()
        } else {
            name.trim().to_string()
        };
        Self { name }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("PORTAL_MEMBER_NAME").unwrap_or_default())
    }
}

impl Default for StaticActor {
    fn default() -> Self {
        Self::new(GUEST)
    }
}

impl CurrentActor for StaticActor {
    fn display_name(&self) -> &str {
        &self.name
    }
}
