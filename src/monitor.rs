//! Main event loop

use log::{debug, info};

use crate::{
    config::Config,
    launcher::Launcher,
    policy::{evaluate, Effect},
    render,
    sensor::{refresh, PowerSample, PowerSensor},
    state::State,
    surface::{Button, InputEvent, Modifiers, Surface},
};

#[derive(Debug)]
pub(crate) struct Monitor<P, S, L> {
    config: Config,
    state: State,
    sensor: P,
    surface: S,
    launcher: L,
}

impl<P: PowerSensor, S: Surface, L: Launcher> Monitor<P, S, L> {
    pub(crate) fn new(config: Config, sensor: P, surface: S, launcher: L) -> Self {
        Self {
            state: State::new(config.backlight),
            config,
            sensor,
            surface,
            launcher,
        }
    }

    /// Main loop. Returns only when the user asks to quit or the surface fails.
    pub(crate) fn monitor(&mut self) -> anyhow::Result<()> {
        self.tick()?;
        loop {
            match self.surface.next_event(self.config.interval)? {
                None => self.tick()?,
                Some(InputEvent::Quit) => {
                    info!("Quit requested");
                    return Ok(());
                }
                Some(InputEvent::ButtonPress { button, modifiers }) => {
                    self.button_press(button, modifiers)?;
                }
            }
        }
    }

    /// Timer expiry: sample, run the alarm and redraw.
    fn tick(&mut self) -> anyhow::Result<()> {
        let mut sample = refresh(&mut self.sensor);
        for effect in evaluate(&mut self.state, &sample, self.config.alarm_level) {
            match effect {
                Effect::Notify => {
                    if let Some(cmd) = &self.config.notify_cmd {
                        self.launcher.launch(cmd);
                    }
                }
                Effect::ToggleBacklight => {
                    self.state.toggle_backlight();
                    sample = refresh(&mut self.sensor);
                }
            }
        }
        self.redraw(&sample)
    }

    fn button_press(&mut self, button: Button, modifiers: Modifiers) -> anyhow::Result<()> {
        debug!("Button {button:?} pressed with {modifiers:?}");
        match button {
            Button::Left => {
                self.state.toggle_backlight();
                let sample = refresh(&mut self.sensor);
                self.redraw(&sample)?;
            }
            Button::Middle => {
                let cmd = if modifiers == Modifiers::only(self.config.suspend_modifier) {
                    &self.config.suspend_cmd
                } else {
                    &self.config.standby_cmd
                };
                self.launcher.launch(cmd);
            }
            Button::Right => {
                self.state.toggle_authorization();
                info!(
                    "Automatic back-light switching {}",
                    if self.state.switch_authorized {
                        "enabled"
                    } else {
                        "disabled"
                    }
                );
            }
            Button::WheelUp | Button::WheelDown => (),
        }
        Ok(())
    }

    fn redraw(&mut self, sample: &PowerSample) -> anyhow::Result<()> {
        render::draw(&mut self.surface, self.state.backlight, sample);
        self.surface.flush()?;
        Ok(())
    }
}
