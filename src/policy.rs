//! This module computes the alarm effects for a new sample.
//!
//! ```text
//!            percent < level (snapshot, notify)
//!  Clear ───────────────────────────────────────► Armed
//!    ▲                                              │
//!    └──────────────────────────────────────────────┘
//!            percent >= level (restore back-light)
//! ```
//!
//! While armed, the back-light is driven towards a target: the inverse of the
//! snapshot when automatic switching is authorized, the snapshot itself when it
//! is not. The back-light is held at that target rather than blinking on every
//! tick, so repeated evaluations of a low sample emit nothing new.

use log::{debug, info};
use smallvec::SmallVec;

use crate::{
    sensor::PowerSample,
    state::{Backlight, State},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Launch the notification command.
    Notify,
    /// Flip the back-light and redraw from a fresh sample.
    ToggleBacklight,
}

pub(crate) type Effects = SmallVec<[Effect; 2]>;

/// Run the alarm state machine for one sample.
pub(crate) fn evaluate(state: &mut State, sample: &PowerSample, alarm_level: u8) -> Effects {
    let percent = sample.alarm_percent();
    let mut effects = Effects::new();

    if percent < alarm_level {
        if !state.alarm_armed {
            info!("Battery at {percent}% is below {alarm_level}%, raising alarm");
            state.alarm_armed = true;
            state.pre_alarm_backlight = state.backlight;
            effects.push(Effect::Notify);
        }
        if state.backlight != armed_target(state) {
            effects.push(Effect::ToggleBacklight);
        }
    } else if state.alarm_armed {
        info!("Battery at {percent}% recovered, clearing alarm");
        state.alarm_armed = false;
        if state.backlight != state.pre_alarm_backlight {
            effects.push(Effect::ToggleBacklight);
        }
    }

    debug!("State: {state:?}");
    debug!("Effects: {effects:?}");
    effects
}

fn armed_target(state: &State) -> Backlight {
    if state.switch_authorized {
        state.pre_alarm_backlight.toggled()
    } else {
        state.pre_alarm_backlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(percent: i32) -> PowerSample {
        PowerSample {
            percent,
            on_battery: true,
            charging: false,
            seconds_remaining: 600,
            valid: true,
        }
    }

    /// Evaluate and apply toggles the way the monitor does.
    fn step(state: &mut State, percent: i32, level: u8) -> Effects {
        let effects = evaluate(state, &sample(percent), level);
        if effects.contains(&Effect::ToggleBacklight) {
            state.toggle_backlight();
        }
        effects
    }

    #[test]
    fn arms_only_below_level() {
        for level in 0..=100u8 {
            for percent in 0..=100i32 {
                let mut state = State::default();
                let effects = evaluate(&mut state, &sample(percent), level);
                let below = percent < i32::from(level);
                assert_eq!(state.alarm_armed, below, "percent {percent} level {level}");
                assert_eq!(effects.contains(&Effect::Notify), below);
            }
        }
    }

    #[test]
    fn notifies_once_per_episode() {
        let mut state = State::default();
        assert!(step(&mut state, 10, 20).contains(&Effect::Notify));
        for percent in [9, 8, 5, 0, 19] {
            assert!(!step(&mut state, percent, 20).contains(&Effect::Notify));
            assert!(state.alarm_armed);
        }
        // A new episode notifies again.
        step(&mut state, 50, 20);
        assert!(step(&mut state, 10, 20).contains(&Effect::Notify));
    }

    #[test]
    fn evaluation_is_idempotent_once_switched() {
        let mut state = State::default();
        step(&mut state, 10, 20);
        assert_eq!(state.backlight, Backlight::On);
        assert!(evaluate(&mut state, &sample(10), 20).is_empty());
        assert!(evaluate(&mut state, &sample(10), 20).is_empty());
    }

    #[test]
    fn backlight_holds_while_armed() {
        let mut state = State::default();
        step(&mut state, 10, 20);
        for percent in [9, 8, 7, 6, 5] {
            assert!(step(&mut state, percent, 20).is_empty());
            assert_eq!(state.backlight, Backlight::On);
        }
    }

    #[test]
    fn invalid_sample_arms_alarm() {
        let mut state = State::default();
        let bad = PowerSample {
            valid: false,
            ..sample(90)
        };
        let effects = evaluate(&mut state, &bad, 1);
        assert!(state.alarm_armed);
        assert_eq!(effects[0], Effect::Notify);

        let mut state = State::default();
        assert!(evaluate(&mut state, &bad, 0).is_empty());
        assert!(!state.alarm_armed);
    }

    #[test]
    fn unauthorized_onset_notifies_without_switching() {
        let mut state = State::default();
        state.switch_authorized = false;
        let effects = evaluate(&mut state, &sample(5), 20);
        assert_eq!(effects, Effects::from_slice(&[Effect::Notify]));
        assert_eq!(state.pre_alarm_backlight, Backlight::Off);
    }

    #[test]
    fn drift_is_restored_while_unauthorized() {
        let mut state = State::new(Backlight::On);
        state.switch_authorized = false;
        step(&mut state, 5, 20);
        assert_eq!(state.backlight, Backlight::On);

        // User switches the light off by hand.
        state.toggle_backlight();
        let effects = evaluate(&mut state, &sample(5), 20);
        assert_eq!(effects, Effects::from_slice(&[Effect::ToggleBacklight]));
    }

    #[test]
    fn clearing_restores_snapshot() {
        let mut state = State::default();
        assert!(step(&mut state, 30, 20).is_empty());

        let effects = step(&mut state, 15, 20);
        assert_eq!(
            effects,
            Effects::from_slice(&[Effect::Notify, Effect::ToggleBacklight])
        );
        assert_eq!(state.backlight, Backlight::On);

        let effects = step(&mut state, 25, 20);
        assert_eq!(effects, Effects::from_slice(&[Effect::ToggleBacklight]));
        assert_eq!(state.backlight, Backlight::Off);
        assert!(!state.alarm_armed);
    }

    #[test]
    fn clearing_without_drift_does_nothing() {
        let mut state = State::default();
        state.switch_authorized = false;
        step(&mut state, 5, 20);
        assert!(step(&mut state, 50, 20).is_empty());
        assert!(!state.alarm_armed);
    }

    #[test]
    fn authorization_change_applies_on_next_evaluation() {
        let mut state = State::default();
        state.switch_authorized = false;
        step(&mut state, 5, 20);
        assert_eq!(state.backlight, Backlight::Off);

        state.toggle_authorization();
        let effects = step(&mut state, 5, 20);
        assert_eq!(effects, Effects::from_slice(&[Effect::ToggleBacklight]));
        assert_eq!(state.backlight, Backlight::On);
    }
}
