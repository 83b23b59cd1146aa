//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Remote cart session status (from the platform API).
///
/// Only `Active` sessions are loaded and written by the synchronizer;
/// the platform moves sessions to `CheckedOut` when an order completes
/// and sweeps stale ones to `Abandoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartSessionStatus {
    Active,
    CheckedOut,
    Abandoned,
}

impl CartSessionStatus {
    /// Whether the session can still accept item writes.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&CartSessionStatus::CheckedOut).expect("serialize");
        assert_eq!(json, "\"checked_out\"");
    }

    #[test]
    fn test_is_active() {
        assert!(CartSessionStatus::Active.is_active());
        assert!(!CartSessionStatus::Abandoned.is_active());
    }
}
