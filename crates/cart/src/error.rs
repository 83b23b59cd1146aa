//! User-facing failure messages.
//!
//! No error from the synchronizer ever propagates as a `Result` to calling
//! code; failures land in `CartState::error` as a human-readable string and
//! are cleared by the next successful operation. This module owns the
//! mapping from store failures to those strings.

use crate::store::StoreError;

/// Load failed after retries and the failure looked like connectivity.
pub const LOAD_OFFLINE_MESSAGE: &str =
    "We couldn't reach Pulsefit. Check your connection and try again.";

/// Load failed after retries for a non-connectivity reason.
pub const LOAD_FAILED_MESSAGE: &str = "We were unable to load your cart. Please try again.";

/// Save failed after retries. The cart stays fully usable; local edits are
/// kept and re-synced later.
pub const SAVE_FAILED_MESSAGE: &str =
    "Your changes are saved on this device but haven't synced yet. We'll keep trying.";

/// Message shown after a cart load gives up, distinguishing connectivity
/// problems from platform-side failures.
#[must_use]
pub fn load_failure_message(error: &StoreError) -> &'static str {
    if error.is_connectivity() {
        LOAD_OFFLINE_MESSAGE
    } else {
        LOAD_FAILED_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_failure_gets_offline_message() {
        let err = StoreError::Unreachable("dns".to_string());
        assert_eq!(load_failure_message(&err), LOAD_OFFLINE_MESSAGE);
    }

    #[test]
    fn test_platform_failure_gets_generic_message() {
        let err = StoreError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(load_failure_message(&err), LOAD_FAILED_MESSAGE);
    }
}
