use chrono::{DateTime, Duration, Utc};

/// Last observed presence of the bot in the target chat, plus the time of
/// the last check. Starts as "absent" and "never checked" on every start.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    last_known: bool,
    last_check: Option<DateTime<Utc>>,
    min_interval: Duration,
}

impl PresenceTracker {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_known: false,
            last_check: None,
            min_interval,
        }
    }

    #[allow(dead_code)]
    pub fn last_known(&self) -> bool {
        self.last_known
    }

    #[allow(dead_code)]
    pub fn last_check(&self) -> Option<DateTime<Utc>> {
        self.last_check
    }

    /// Whether a check is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_check {
            Some(last) => now - last >= self.min_interval,
            None => true,
        }
    }

    /// Claim the next check slot: returns true and records `now` if a check
    /// is due, false otherwise.
    pub fn try_begin(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.mark_checked(now);
        true
    }

    /// Record that a check ran at `now`. Never moves the timestamp backwards.
    pub fn mark_checked(&mut self, now: DateTime<Utc>) {
        if self.last_check.map_or(true, |last| now > last) {
            self.last_check = Some(now);
        }
    }

    /// Record a fresh observation. Returns `Some(present)` when it differs
    /// from the previous one.
    pub fn observe(&mut self, present: bool) -> Option<bool> {
        if present == self.last_known {
            return None;
        }
        self.last_known = present;
        Some(present)
    }
}
