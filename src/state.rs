//! Implements current display state

/// Back-light mode of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Backlight {
    Off,
    On,
}

impl Backlight {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Backlight::Off => Backlight::On,
            Backlight::On => Backlight::Off,
        }
    }
}

#[derive(Debug)]
pub(crate) struct State {
    /// Current back-light mode
    pub backlight: Backlight,
    /// Whether the alarm may switch the back-light on its own. Toggled by the
    /// user with the right button.
    pub switch_authorized: bool,
    /// Battery is below the alarm level and the notification has fired.
    pub alarm_armed: bool,
    /// Back-light as it was when the alarm got armed.
    pub pre_alarm_backlight: Backlight,
}

impl State {
    pub(crate) fn new(backlight: Backlight) -> Self {
        Self {
            backlight,
            switch_authorized: true,
            alarm_armed: false,
            pre_alarm_backlight: backlight,
        }
    }

    pub(crate) fn toggle_backlight(&mut self) {
        self.backlight = self.backlight.toggled();
    }

    pub(crate) fn toggle_authorization(&mut self) {
        self.switch_authorized = !self.switch_authorized;
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new(Backlight::Off)
    }
}
