//! Controller configuration.
//!
//! Describes which devices exist, which pins and bus addresses they use and
//! the moisture band each monitor holds.  Loaded from JSON on the host;
//! [`ControllerConfig::default`] is a single-bed greenhouse.

use serde::{Deserialize, Serialize};

use crate::device::bank::MAX_ACTUATORS;
use crate::device::{Name, device_name};
use crate::drivers::led::{DEFAULT_GROUP_NAME, LED_GROUP_SIZE, LedColor, LedGroupMode, child_name};
use crate::drivers::pump::PUMP_RUN_TIME;
use crate::drivers::switch::{Polarity, SwitchMode};
use crate::error::ConfigError;
use crate::pins::{self, PinClaims};
use crate::sensors::soil::{DEFAULT_ADDRESS, PHYSICAL_MAX, PHYSICAL_MIN};
use crate::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Scheduler tick period (milliseconds)
    pub tick_period_ms: u32,
    /// Stand-alone actuators, registered in this order
    pub actuators: Vec<ActuatorConfig>,
    /// Optional four-colour indicator group
    pub led_group: Option<LedGroupConfig>,
    /// Soil monitors, updated in this order
    pub monitors: Vec<MonitorConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    Pump,
    Mister,
    Led,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModeConfig {
    Timed { duration_ms: u64 },
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    pub name: String,
    pub pin: u8,
    pub kind: ActuatorKind,
    /// Overrides the kind's default mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeConfig>,
    #[serde(default)]
    pub polarity: Polarity,
}

impl ActuatorConfig {
    /// Pumps default to a one-minute timed window, everything else to
    /// event mode.
    pub fn switch_mode(&self) -> SwitchMode {
        match (self.mode, self.kind) {
            (Some(ModeConfig::Timed { duration_ms }), _) => {
                SwitchMode::Timed(Duration::millis(duration_ms))
            }
            (Some(ModeConfig::Event), _) => SwitchMode::EventOnEventOff,
            (None, ActuatorKind::Pump) => SwitchMode::Timed(PUMP_RUN_TIME),
            (None, ActuatorKind::Mister | ActuatorKind::Led) => SwitchMode::EventOnEventOff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedGroupConfig {
    /// Defaults to "LED Group"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Red, orange, yellow, green
    pub pins: [u8; LED_GROUP_SIZE],
    #[serde(default)]
    pub mode: LedGroupMode,
}

impl LedGroupConfig {
    pub fn group_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_GROUP_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub name: String,
    /// Probe bus address
    #[serde(default = "default_address")]
    pub address: u8,
    /// Probe output for dry soil
    #[serde(default = "default_physical_min")]
    pub physical_min: f32,
    /// Probe output for saturated soil
    #[serde(default = "default_physical_max")]
    pub physical_max: f32,
    /// Below this moisture (%) the actuator is switched on
    pub moisture_min: u8,
    /// At or above this moisture (%) the actuator is switched off
    pub moisture_max: u8,
    /// Name of the actuator this monitor drives.  Mandatory.
    #[serde(default)]
    pub actuator: Option<String>,
}

fn default_address() -> u8 {
    DEFAULT_ADDRESS
}

fn default_physical_min() -> f32 {
    PHYSICAL_MIN
}

fn default_physical_max() -> f32 {
    PHYSICAL_MAX
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 1000, // 1 Hz
            actuators: vec![
                ActuatorConfig {
                    name: "pump".into(),
                    pin: pins::PUMP_GPIO,
                    kind: ActuatorKind::Pump,
                    mode: None,
                    polarity: Polarity::ActiveHigh,
                },
                ActuatorConfig {
                    name: "mister".into(),
                    pin: pins::MISTER_GPIO,
                    kind: ActuatorKind::Mister,
                    mode: None,
                    polarity: Polarity::ActiveHigh,
                },
            ],
            led_group: Some(LedGroupConfig {
                name: None,
                pins: [
                    pins::LED_RED_GPIO,
                    pins::LED_ORANGE_GPIO,
                    pins::LED_YELLOW_GPIO,
                    pins::LED_GREEN_GPIO,
                ],
                mode: LedGroupMode::Stack,
            }),
            monitors: vec![MonitorConfig {
                name: "bed-1".into(),
                address: DEFAULT_ADDRESS,
                physical_min: PHYSICAL_MIN,
                physical_max: PHYSICAL_MAX,
                moisture_min: 35,
                moisture_max: 65,
                actuator: Some("mister".into()),
            }],
        }
    }
}

impl ControllerConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::millis(u64::from(self.tick_period_ms))
    }

    /// Check everything that can be checked without hardware.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::InvalidTickPeriod);
        }
        if self.actuators.len() > MAX_ACTUATORS {
            return Err(ConfigError::CapacityExceeded);
        }

        let mut names: Vec<Name> = Vec::new();
        let mut claims = PinClaims::new();

        for a in &self.actuators {
            claim_name(&mut names, &a.name)?;
            claims.claim(a.pin)?;
            if let SwitchMode::Timed(d) = a.switch_mode() {
                if d.is_zero() {
                    return Err(ConfigError::ZeroDuration);
                }
            }
        }

        if let Some(group) = &self.led_group {
            claim_name(&mut names, group.group_name())?;
            for color in LedColor::ALL {
                let child = child_name(group.group_name(), color).map_err(|_| ConfigError::InvalidName)?;
                claim_name(&mut names, &child)?;
            }
            for pin in group.pins {
                claims.claim(pin)?;
            }
        }

        for m in &self.monitors {
            claim_name(&mut names, &m.name)?;
            if m.moisture_min > m.moisture_max || m.moisture_max > 100 {
                return Err(ConfigError::InvalidRange);
            }
            if !(m.physical_min.is_finite() && m.physical_max.is_finite())
                || m.physical_min >= m.physical_max
            {
                return Err(ConfigError::InvalidRange);
            }
            let target = m.actuator.as_deref().ok_or(ConfigError::MissingActuator)?;
            if !self.actuators.iter().any(|a| a.name == target) {
                return Err(ConfigError::UnknownActuator);
            }
        }
        Ok(())
    }
}

fn claim_name(names: &mut Vec<Name>, name: &str) -> Result<(), ConfigError> {
    let name = device_name(name).map_err(|_| ConfigError::InvalidName)?;
    if names.contains(&name) {
        return Err(ConfigError::DuplicateName);
    }
    names.push(name);
    Ok(())
}
