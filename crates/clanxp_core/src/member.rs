//! Tracked clan members and their weekly XP bookkeeping.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RosterRecord;

/// A clan member as persisted in the store.
///
/// `xp_baseline` is the cumulative XP at the start of the current tracking
/// window and `xp_current` the latest raw reading. The weekly gain is the
/// difference between the two, computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct Member {
    /// Store-assigned row id
    id: i32,
    /// Stable account id from the roster feed
    external_id: String,
    /// In-game name, may change between roster syncs
    display_name: String,
    /// Identity in the messaging system, set once
    #[builder(default)]
    messaging_id: Option<i64>,
    /// Cumulative XP at the start of the tracking window
    #[builder(default)]
    xp_baseline: i64,
    /// Most recent cumulative XP reading
    #[builder(default)]
    xp_current: i64,
}

/// What [`Member::apply_reading`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct ReadingEffect {
    /// The baseline was seeded from a first observation
    seeded: bool,
    /// The tracking window was closed and a new one opened
    rolled_over: bool,
}

impl Member {
    /// Start a builder.
    pub fn builder() -> MemberBuilder {
        MemberBuilder::default()
    }

    /// Replace both XP fields, as loaded from storage.
    pub fn with_xp(mut self, xp_baseline: i64, xp_current: i64) -> Self {
        self.xp_baseline = xp_baseline;
        self.xp_current = xp_current;
        self
    }

    /// Raw difference between the current reading and the baseline.
    ///
    /// Negative when the upstream counter regressed.
    pub fn raw_delta(&self) -> i64 {
        self.xp_current - self.xp_baseline
    }

    /// XP gained in the current window, never below zero.
    pub fn weekly_gain(&self) -> i64 {
        self.raw_delta().max(0)
    }

    /// Apply a cumulative XP reading.
    ///
    /// A member that was never observed (`xp_baseline == 0`) gets its
    /// baseline seeded so the first gain is zero. On rollover the baseline
    /// advances to the reading, unless the reading is zero: a transient zero
    /// must not wipe a week of progress.
    pub fn apply_reading(&mut self, reading: i64, is_rollover: bool) -> ReadingEffect {
        let seeded = self.xp_baseline == 0;
        if seeded {
            self.xp_baseline = reading;
        }

        self.xp_current = reading;

        let rolled_over = is_rollover && reading > 0;
        if rolled_over {
            debug!(member = %self.display_name, reading, "Closing tracking window");
            self.xp_baseline = reading;
        }

        ReadingEffect {
            seeded,
            rolled_over,
        }
    }

    /// Take the roster's current name. Returns whether it changed.
    pub fn rename(&mut self, display_name: &str) -> bool {
        if self.display_name == display_name {
            return false;
        }
        self.display_name = display_name.to_string();
        true
    }

    /// Record the messaging identity if none is known yet.
    ///
    /// An existing identity is never overwritten. Returns whether it changed.
    pub fn assign_messaging_id(&mut self, messaging_id: Option<i64>) -> bool {
        match (self.messaging_id, messaging_id) {
            (None, Some(id)) => {
                self.messaging_id = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Bring name and messaging identity in line with a roster record.
    ///
    /// Returns whether anything changed.
    pub fn reconcile(&mut self, record: &RosterRecord) -> bool {
        let renamed = self.rename(record.nickname());
        let linked = self.assign_messaging_id(*record.messaging_id());
        renamed || linked
    }
}

/// A member that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct NewMember {
    /// Stable account id from the roster feed
    external_id: String,
    /// In-game name
    display_name: String,
    /// Identity in the messaging system
    messaging_id: Option<i64>,
    /// Starting baseline, zero until the first XP reading
    #[new(value = "0")]
    xp_baseline: i64,
    /// Starting reading
    #[new(value = "0")]
    xp_current: i64,
}

impl From<&RosterRecord> for NewMember {
    fn from(record: &RosterRecord) -> Self {
        NewMember::new(
            record.external_id().clone(),
            record.nickname().clone(),
            *record.messaging_id(),
        )
    }
}

impl NewMember {
    /// Attach a row id, producing the stored form.
    pub fn into_member(self, id: i32) -> Member {
        Member {
            id,
            external_id: self.external_id,
            display_name: self.display_name,
            messaging_id: self.messaging_id,
            xp_baseline: self.xp_baseline,
            xp_current: self.xp_current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(baseline: i64, current: i64) -> Member {
        Member::builder()
            .id(1)
            .external_id("ubi-1")
            .display_name("Frosty")
            .xp_baseline(baseline)
            .xp_current(current)
            .build()
            .unwrap()
    }

    #[test]
    fn first_reading_seeds_baseline() {
        let mut m = member(0, 0);
        let effect = m.apply_reading(500, false);

        assert!(*effect.seeded());
        assert_eq!(*m.xp_baseline(), 500);
        assert_eq!(*m.xp_current(), 500);
        assert_eq!(m.weekly_gain(), 0);
    }

    #[test]
    fn later_reading_grows_gain() {
        let mut m = member(500, 500);
        let effect = m.apply_reading(700, false);

        assert!(!*effect.seeded());
        assert_eq!(*m.xp_baseline(), 500);
        assert_eq!(*m.xp_current(), 700);
        assert_eq!(m.weekly_gain(), 200);
    }

    #[test]
    fn rollover_advances_baseline() {
        let mut m = member(500, 700);
        let effect = m.apply_reading(700, true);

        assert!(*effect.rolled_over());
        assert_eq!(*m.xp_baseline(), 700);
        assert_eq!(m.weekly_gain(), 0);
    }

    #[test]
    fn zero_reading_on_rollover_keeps_window_open() {
        let mut m = member(500, 700);
        let effect = m.apply_reading(0, true);

        assert!(!*effect.rolled_over());
        assert_eq!(*m.xp_baseline(), 500);
        assert_eq!(*m.xp_current(), 0);
    }

    #[test]
    fn regressed_counter_clamps_gain() {
        let m = member(505, 500);
        assert_eq!(m.raw_delta(), -5);
        assert_eq!(m.weekly_gain(), 0);
    }

    #[test]
    fn messaging_id_is_never_overwritten() {
        let mut m = member(0, 0);
        assert!(m.assign_messaging_id(Some(42)));
        assert!(!m.assign_messaging_id(Some(99)));
        assert!(!m.assign_messaging_id(None));
        assert_eq!(*m.messaging_id(), Some(42));
    }
}
