//! Process-local runner and tag liveness tracking.
//!
//! Written on every authenticated runner check-in, read by operators.
//! Never persisted; loss on restart is acceptable.

use std::collections::HashMap;

use aura_core::types::UnixTime;
use parking_lot::RwLock;

#[derive(Default)]
pub struct CheckinBoard {
    runners: RwLock<HashMap<String, UnixTime>>,
    tags: RwLock<HashMap<String, UnixTime>>,
}

impl CheckinBoard {
    pub fn record_runner(&self, name: &str, now: UnixTime) {
        self.runners.write().insert(name.to_string(), now);
    }

    pub fn record_tag(&self, tag: &str, now: UnixTime) {
        self.tags.write().insert(tag.to_string(), now);
    }

    pub fn runner_last_seen(&self, name: &str) -> Option<UnixTime> {
        self.runners.read().get(name).copied()
    }

    pub fn tag_last_seen(&self, tag: &str) -> Option<UnixTime> {
        self.tags.read().get(tag).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_overwrites_last_seen() {
        let board = CheckinBoard::default();
        assert_eq!(board.runner_last_seen("r1"), None);

        board.record_runner("r1", 100);
        board.record_tag("linux", 100);
        assert_eq!(board.runner_last_seen("r1"), Some(100));
        assert_eq!(board.tag_last_seen("linux"), Some(100));

        board.record_runner("r1", 200);
        assert_eq!(board.runner_last_seen("r1"), Some(200));
    }
}
