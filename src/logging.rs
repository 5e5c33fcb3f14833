// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Deduplicated warning log.
//!
//! Distance computations run in hot mutation loops, so a recoverable failure
//! (bad glob, missing argument) would otherwise flood the log with the same
//! line. [`unique_warn`] emits each distinct message once per process.

use dashmap::DashMap;
use std::sync::LazyLock;
use tracing::warn;

/// Messages already emitted. Append-only.
static SEEN: LazyLock<DashMap<String, ()>> = LazyLock::new(DashMap::new);

/// Emit `message` at warn level unless it was emitted before.
///
/// Returns `true` if the message was logged by this call.
pub fn unique_warn(message: impl Into<String>) -> bool {
    let message = message.into();
    if SEEN.contains_key(&message) {
        return false;
    }
    // insert() returns the previous value: only the first racer logs
    if SEEN.insert(message.clone(), ()).is_some() {
        return false;
    }
    warn!(message = %message, "Heuristic computation degraded to worst case");
    true
}

/// Number of distinct warnings emitted so far
pub fn unique_warning_count() -> usize {
    SEEN.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_warn_deduplicates() {
        let msg = "logging::tests unique message 1";
        assert!(unique_warn(msg));
        assert!(!unique_warn(msg));
        assert!(!unique_warn(msg.to_string()));
    }

    #[test]
    fn test_distinct_messages_both_logged() {
        assert!(unique_warn("logging::tests distinct a"));
        assert!(unique_warn("logging::tests distinct b"));
        assert!(unique_warning_count() >= 2);
    }
}
