//! Popup display state machine.
//!
//! Server-side model of the behaviour the generated script ships to
//! browsers: an explicit machine over `{NotShown, Shown, Dismissed}` whose
//! frequency policy reads persisted state through a storage port rather than
//! global storage calls. The machine is constructed fresh per page load; the
//! generated JavaScript in [`crate::domain::templates`] mirrors these
//! transitions.

use chrono::{DateTime, Duration, Utc};

use super::intake::{DisplayFrequency, DisplayTrigger};

/// Storage key shared by the frequency policy and the generated script.
pub const SHOWN_STORAGE_KEY: &str = "aisim_ad_shown";

/// Port over the visitor-scoped key/value stores (localStorage and
/// sessionStorage in a browser; in-memory fakes in tests).
pub trait DisplayStorage {
    /// Timestamp of the last successful show, if any (durable store).
    fn last_shown(&self) -> Option<DateTime<Utc>>;
    /// Record a successful show (durable store).
    fn record_shown(&mut self, at: DateTime<Utc>);
    /// Whether this browsing session has already shown the popup.
    fn session_shown(&self) -> bool;
    /// Flag the popup as shown for this browsing session.
    fn record_session_shown(&mut self);
}

impl<S: DisplayStorage + ?Sized> DisplayStorage for &mut S {
    fn last_shown(&self) -> Option<DateTime<Utc>> {
        (**self).last_shown()
    }

    fn record_shown(&mut self, at: DateTime<Utc>) {
        (**self).record_shown(at);
    }

    fn session_shown(&self) -> bool {
        (**self).session_shown()
    }

    fn record_session_shown(&mut self) {
        (**self).record_session_shown();
    }
}

/// In-memory [`DisplayStorage`] used by tests and the preview pipeline.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDisplayStorage {
    last_shown: Option<DateTime<Utc>>,
    session_shown: bool,
}

impl DisplayStorage for InMemoryDisplayStorage {
    fn last_shown(&self) -> Option<DateTime<Utc>> {
        self.last_shown
    }

    fn record_shown(&mut self, at: DateTime<Utc>) {
        self.last_shown = Some(at);
    }

    fn session_shown(&self) -> bool {
        self.session_shown
    }

    fn record_session_shown(&mut self) {
        self.session_shown = true;
    }
}

/// Machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    NotShown,
    Shown,
    Dismissed,
}

/// Events driving transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEvent {
    /// The configured trigger fired (timer elapsed, scroll threshold reached,
    /// exit intent detected, or immediate on load).
    Triggered,
    /// Close button, overlay click, or Escape.
    Dismissed,
}

/// Popup behaviour configuration carried by the generated script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupConfig {
    pub trigger: DisplayTrigger,
    pub frequency: DisplayFrequency,
    /// Delay for the `time-delay` trigger, in milliseconds.
    pub delay_ms: u32,
    /// Page-scroll percentage for the `scroll` trigger.
    pub scroll_threshold: u8,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            trigger: DisplayTrigger::Immediate,
            frequency: DisplayFrequency::Daily,
            delay_ms: 2_000,
            scroll_threshold: 50,
        }
    }
}

/// The popup display machine, constructed fresh per page load.
#[derive(Debug)]
pub struct PopupMachine<S> {
    config: PopupConfig,
    state: PopupState,
    storage: S,
}

impl<S: DisplayStorage> PopupMachine<S> {
    /// Build a machine over the given storage.
    pub fn new(config: PopupConfig, storage: S) -> Self {
        Self {
            config,
            state: PopupState::NotShown,
            storage,
        }
    }

    /// Current state.
    pub fn state(&self) -> PopupState {
        self.state
    }

    /// Whether the frequency policy permits showing the popup at `now`.
    ///
    /// `once`: never again after any recorded show. `daily`: only when the
    /// last show is more than 24 hours old. `session`: only when this
    /// browsing session has not shown it yet.
    pub fn should_show(&self, now: DateTime<Utc>) -> bool {
        if self.state != PopupState::NotShown {
            return false;
        }
        match self.config.frequency {
            DisplayFrequency::Once => self.storage.last_shown().is_none(),
            DisplayFrequency::Daily => self
                .storage
                .last_shown()
                .is_none_or(|last| now - last > Duration::hours(24)),
            DisplayFrequency::Session => !self.storage.session_shown(),
        }
    }

    /// Apply an event, returning the state after the transition.
    ///
    /// A trigger only moves `NotShown → Shown` when the frequency policy
    /// allows it, and records the show in both stores. Dismissal only applies
    /// to a shown popup. Everything else is a no-op.
    pub fn apply(&mut self, event: PopupEvent, now: DateTime<Utc>) -> PopupState {
        match (self.state, event) {
            (PopupState::NotShown, PopupEvent::Triggered) if self.should_show(now) => {
                self.storage.record_shown(now);
                self.storage.record_session_shown();
                self.state = PopupState::Shown;
            }
            (PopupState::Shown, PopupEvent::Dismissed) => {
                self.state = PopupState::Dismissed;
            }
            _ => {}
        }
        self.state
    }
}

/// Scroll progress as a percentage of the scrollable distance.
///
/// Returns `None` when the content fits the viewport (zero or negative
/// scrollable distance): the scroll trigger then simply never fires instead
/// of comparing against NaN or infinity.
pub fn scroll_progress(scroll_y: f64, scroll_height: f64, inner_height: f64) -> Option<f64> {
    let scrollable = scroll_height - inner_height;
    if scrollable <= 0.0 {
        None
    } else {
        Some(scroll_y / scrollable * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).single().expect("valid timestamp")
    }

    fn machine(frequency: DisplayFrequency) -> PopupMachine<InMemoryDisplayStorage> {
        PopupMachine::new(
            PopupConfig {
                frequency,
                ..PopupConfig::default()
            },
            InMemoryDisplayStorage::default(),
        )
    }

    #[test]
    fn trigger_shows_then_dismissal_ends_the_machine() {
        let mut m = machine(DisplayFrequency::Daily);
        assert_eq!(m.state(), PopupState::NotShown);
        assert_eq!(m.apply(PopupEvent::Triggered, at(9)), PopupState::Shown);
        assert_eq!(m.apply(PopupEvent::Dismissed, at(9)), PopupState::Dismissed);
        // Further events are no-ops.
        assert_eq!(m.apply(PopupEvent::Triggered, at(10)), PopupState::Dismissed);
    }

    #[test]
    fn dismissal_before_show_is_a_no_op() {
        let mut m = machine(DisplayFrequency::Daily);
        assert_eq!(m.apply(PopupEvent::Dismissed, at(9)), PopupState::NotShown);
    }

    #[test]
    fn once_never_shows_again_after_first_show() {
        let mut storage = InMemoryDisplayStorage::default();
        {
            let mut m = PopupMachine::new(
                PopupConfig {
                    frequency: DisplayFrequency::Once,
                    ..PopupConfig::default()
                },
                &mut storage,
            );
            assert!(m.should_show(at(9)));
            m.apply(PopupEvent::Triggered, at(9));
        }
        // Fresh page loads over the same durable storage, arbitrarily later.
        for hour in [10, 15, 23] {
            let m = PopupMachine::new(
                PopupConfig {
                    frequency: DisplayFrequency::Once,
                    ..PopupConfig::default()
                },
                &mut storage,
            );
            assert!(!m.should_show(at(hour)));
        }
    }

    #[test]
    fn daily_shows_again_after_24_hours() {
        let mut storage = InMemoryDisplayStorage::default();
        storage.record_shown(at(9));
        let config = PopupConfig {
            frequency: DisplayFrequency::Daily,
            ..PopupConfig::default()
        };
        let m = PopupMachine::new(config, storage.clone());
        assert!(!m.should_show(at(20)));
        let m = PopupMachine::new(config, storage);
        assert!(m.should_show(at(9) + Duration::hours(25)));
    }

    #[test]
    fn session_frequency_resets_with_a_new_session() {
        let mut m = machine(DisplayFrequency::Session);
        m.apply(PopupEvent::Triggered, at(9));
        assert!(!m.should_show(at(10)));

        // A new session means fresh session storage; the durable record does
        // not block the session policy.
        let mut carried = InMemoryDisplayStorage::default();
        carried.record_shown(at(9));
        let m = PopupMachine::new(
            PopupConfig {
                frequency: DisplayFrequency::Session,
                ..PopupConfig::default()
            },
            carried,
        );
        assert!(m.should_show(at(10)));
    }

    #[rstest]
    #[case::fits_viewport(0.0, 600.0, 600.0, None)]
    #[case::shorter_than_viewport(0.0, 400.0, 600.0, None)]
    #[case::halfway(200.0, 1000.0, 600.0, Some(50.0))]
    #[case::bottom(400.0, 1000.0, 600.0, Some(100.0))]
    fn scroll_progress_is_total(
        #[case] scroll_y: f64,
        #[case] scroll_height: f64,
        #[case] inner_height: f64,
        #[case] expected: Option<f64>,
    ) {
        assert_eq!(scroll_progress(scroll_y, scroll_height, inner_height), expected);
    }
}
