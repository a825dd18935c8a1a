//! Build a [`Controller`] from configuration and a [`Board`].
//!
//! Actuators are registered first so monitors can resolve their actuator
//! names to handles; the LED group and monitors follow in configuration
//! order.

use log::info;

use crate::config::{ActuatorConfig, ActuatorKind, ControllerConfig, LedGroupConfig, MonitorConfig};
use crate::device::Switch;
use crate::drivers::led::{LedGroup, led};
use crate::drivers::mister::mister_with_mode;
use crate::drivers::pump::water_pump_for;
use crate::drivers::switch::{SwitchDevice, SwitchMode};
use crate::error::{ConfigError, Result};
use crate::ranged::RangedValue;
use crate::sensors::soil::SoilMonitor;

use super::ports::Board;
use super::service::Controller;

impl Controller {
    /// Validate `config`, claim hardware from `board` and register every
    /// device.  Nothing is initialised yet.
    pub fn from_config<B: Board>(config: &ControllerConfig, board: &mut B) -> Result<Self> {
        config.validate()?;
        let mut ctl = Controller::new();

        for a in &config.actuators {
            let actuator = build_actuator(a, board)?;
            ctl.add_actuator(actuator)?;
        }
        if let Some(group) = &config.led_group {
            ctl.add_device(build_led_group(group, board)?)?;
        }
        for m in &config.monitors {
            let monitor = build_monitor(m, &ctl, board)?;
            ctl.add_device(Box::new(monitor))?;
        }

        info!(
            "Controller: wired {} actuators and {} devices",
            ctl.actuators().len(),
            ctl.devices().count()
        );
        Ok(ctl)
    }
}

fn build_actuator<B: Board>(a: &ActuatorConfig, board: &mut B) -> Result<Box<dyn Switch>> {
    let pin = board.output_pin(a.pin)?;
    let device = match (a.kind, a.switch_mode()) {
        (ActuatorKind::Pump, SwitchMode::Timed(run_time)) => water_pump_for(&a.name, pin, run_time)?,
        (ActuatorKind::Mister, mode) => mister_with_mode(&a.name, pin, mode)?,
        (ActuatorKind::Led, SwitchMode::EventOnEventOff) => led(&a.name, pin)?,
        (_, mode) => SwitchDevice::new(&a.name, pin, mode)?,
    };
    Ok(Box::new(device.with_polarity(a.polarity)))
}

fn build_led_group<B: Board>(g: &LedGroupConfig, board: &mut B) -> Result<Box<LedGroup<B::Pin>>> {
    let [red, orange, yellow, green] = g.pins;
    let pins = [
        board.output_pin(red)?,
        board.output_pin(orange)?,
        board.output_pin(yellow)?,
        board.output_pin(green)?,
    ];
    Ok(Box::new(LedGroup::new(g.name.as_deref(), pins, g.mode)?))
}

fn build_monitor<B: Board>(
    m: &MonitorConfig,
    ctl: &Controller,
    board: &mut B,
) -> Result<SoilMonitor<B::Probe>> {
    let actuator = match m.actuator.as_deref() {
        Some(name) => Some(ctl.actuator_handle(name).ok_or(ConfigError::UnknownActuator)?),
        None => None,
    };
    let acceptable = RangedValue::bounds(m.moisture_min, m.moisture_max)?;
    let probe = board.soil_probe(m.address)?;
    SoilMonitor::new(&m.name, probe, acceptable, actuator)?
        .with_address(m.address)
        .with_physical_range(m.physical_min, m.physical_max)
}
