//! Process-wide deduplication of informational messages.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

static EMITTED: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Emits `msg` at `info` level the first time it is seen in this process.
/// Returns whether it was emitted.
pub fn inform_once(msg: &str) -> bool {
    let emitted = EMITTED.get_or_init(Default::default);
    let first = match emitted.lock() {
        Ok(mut seen) => seen.insert(msg.to_string()),
        Err(poisoned) => poisoned.into_inner().insert(msg.to_string()),
    };
    if first {
        tracing::info!("{msg}");
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_call_is_suppressed() {
        let msg = "inform_once unit test message";
        assert!(inform_once(msg));
        assert!(!inform_once(msg));
        assert!(inform_once("inform_once unit test message, different text"));
    }
}
