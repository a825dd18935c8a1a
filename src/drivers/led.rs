//! Indicator LEDs and the four-colour LED group.
//!
//! A single LED is an event-driven [`SwitchDevice`].  [`LedGroup`] owns four
//! of them (red, orange, yellow, green) and behaves as one composite device.
//! In `Stack` mode the group also accepts a `Level` command and lights a
//! bar from red upwards.

use core::fmt::Write as _;

use embedded_hal::digital::OutputPin;
use log::debug;
use serde::{Deserialize, Serialize};

use super::switch::{SwitchDevice, SwitchMode};
use crate::app::commands::{CommandToken, Verb};
use crate::app::events::SwitchCause;
use crate::device::composite::{forward_each, initialize_each, update_each};
use crate::device::{Context, Device, Name, Status, Switch, device_name};
use crate::error::{ConfigError, Result};

pub const LED_GROUP_SIZE: usize = 4;

/// Name used when a group is built without one.
pub const DEFAULT_GROUP_NAME: &str = "LED Group";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Red,
    Orange,
    Yellow,
    Green,
}

impl LedColor {
    /// Bar order, bottom first.
    pub const ALL: [LedColor; LED_GROUP_SIZE] = [Self::Red, Self::Orange, Self::Yellow, Self::Green];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedGroupMode {
    /// Each LED is addressed by its own name.
    #[default]
    Individual,
    /// The group shows a 0..=100 level as a bar.
    Stack,
}

/// Plain on/off LED.
pub fn led<P: OutputPin>(name: &str, pin: P) -> Result<SwitchDevice<P>> {
    SwitchDevice::new(name, pin, SwitchMode::EventOnEventOff)
}

/// Number of LEDs a level in 0..=100 lights, rounded to nearest.
pub fn bar_height(level: u8) -> usize {
    let level = usize::from(level.min(100));
    (level * LED_GROUP_SIZE + 50) / 100
}

pub struct LedGroup<P> {
    name: Name,
    mode: LedGroupMode,
    leds: [SwitchDevice<P>; LED_GROUP_SIZE],
    level: Option<u8>,
}

impl<P: OutputPin> LedGroup<P> {
    /// `pins` in bar order: red, orange, yellow, green.  Children are named
    /// `"<group>.<colour>"`.
    pub fn new(name: Option<&str>, pins: [P; LED_GROUP_SIZE], mode: LedGroupMode) -> Result<Self> {
        let name = device_name(name.unwrap_or(DEFAULT_GROUP_NAME))?;
        let [red, orange, yellow, green] = pins;
        let leds = [
            led(&child_name(&name, LedColor::Red)?, red)?,
            led(&child_name(&name, LedColor::Orange)?, orange)?,
            led(&child_name(&name, LedColor::Yellow)?, yellow)?,
            led(&child_name(&name, LedColor::Green)?, green)?,
        ];
        Ok(Self {
            name,
            mode,
            leds,
            level: None,
        })
    }

    pub fn mode(&self) -> LedGroupMode {
        self.mode
    }

    /// Last level shown in `Stack` mode.
    pub fn level(&self) -> Option<u8> {
        self.level
    }

    pub fn led(&self, color: LedColor) -> &SwitchDevice<P> {
        &self.leds[color.index()]
    }

    pub fn lit(&self) -> usize {
        self.leds.iter().filter(|l| l.is_on()).count()
    }

    fn show_level(&mut self, value: i32, ctx: &mut Context<'_>) {
        let level = u8::try_from(value.clamp(0, 100)).unwrap_or(100);
        let height = bar_height(level);
        debug!("{}: level {} -> {} lit", self.name, level, height);
        self.level = Some(level);
        for (i, led) in self.leds.iter_mut().enumerate() {
            // Failures are reported through the sink by `apply`.
            let _ = led.apply(i < height, ctx, SwitchCause::Command);
        }
    }
}

/// `"<group>.<colour>"`, the name each LED in a group registers under.
pub fn child_name(group: &str, color: LedColor) -> Result<Name> {
    let mut name = Name::new();
    write!(name, "{}.{}", group, color.label()).map_err(|_| ConfigError::InvalidName)?;
    Ok(name)
}

impl<P: OutputPin> Device for LedGroup<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self, ctx: &mut Context<'_>) -> Status {
        self.level = None;
        Status::Ok.worst(initialize_each(self.leds.iter_mut(), ctx))
    }

    fn update(&mut self, ctx: &mut Context<'_>) -> Status {
        update_each(self.leds.iter_mut(), ctx)
    }

    fn process_input(&mut self, cmd: &CommandToken, ctx: &mut Context<'_>) {
        if cmd.verb == Verb::Level {
            if self.mode == LedGroupMode::Stack && cmd.targets(&self.name) {
                match cmd.value {
                    Some(v) => self.show_level(v, ctx),
                    None => debug!("{}: level command without value", self.name),
                }
            }
            return;
        }
        if cmd.verb == Verb::Reset && cmd.targets(&self.name) {
            self.level = None;
        }
        forward_each(&self.name, self.leds.iter_mut(), cmd, ctx);
    }
}
