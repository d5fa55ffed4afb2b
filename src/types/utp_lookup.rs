use std::{fmt, sync::Arc};

/// Result of asking which UTP a municipality belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtpLookup {
    /// The municipality is not in the hierarchy.
    NotFound,
    /// The municipality exists but has no UTP parent.
    Unassigned,
    Assigned(Arc<str>),
}

impl UtpLookup {
    pub fn utp(&self) -> Option<&Arc<str>> {
        match self { UtpLookup::Assigned(id) => Some(id), _ => None }
    }

    /// Returns `true` if the municipality currently belongs to `utp_id`.
    pub fn is(&self, utp_id: &str) -> bool {
        self.utp().is_some_and(|id| id.as_ref() == utp_id)
    }
}

impl fmt::Display for UtpLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtpLookup::NotFound => f.write_str("NAO_ENCONTRADO"),
            UtpLookup::Unassigned => f.write_str("SEM_UTP"),
            UtpLookup::Assigned(id) => f.write_str(id),
        }
    }
}
