//! Simulated board, the host-side [`Board`] implementation.
//!
//! Hands out [`SimPin`]s and [`SimulatedProbe`]s by the numbers found in
//! configuration and keeps a handle to each, so the simulator loop and
//! integration tests can observe pin levels and inject soil readings.
//! Pin exclusivity is enforced the same way a real board would.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use log::debug;

use crate::app::ports::Board;
use crate::error::Result;
use crate::pins::PinClaims;
use crate::sensors::sim::SimulatedProbe;

// ── SimPin ────────────────────────────────────────────────────

/// Output pin backed by a shared level cell.  Never fails.
#[derive(Debug, Clone)]
pub struct SimPin {
    number: u8,
    level: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl SimPin {
    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    fn write(&mut self, high: bool) {
        self.level.set(high);
        self.writes.set(self.writes.get() + 1);
    }
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

// ── SimBoard ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SimBoard {
    claims: PinClaims,
    pins: BTreeMap<u8, SimPin>,
    probes: BTreeMap<u8, SimulatedProbe>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logic level of `pin`, `None` when never handed out.
    pub fn level(&self, pin: u8) -> Option<bool> {
        self.pins.get(&pin).map(SimPin::is_high)
    }

    /// Number of writes to `pin` so far.
    pub fn writes(&self, pin: u8) -> u32 {
        self.pins.get(&pin).map_or(0, |p| p.writes.get())
    }

    /// Injection handle for the probe at `address`.
    pub fn probe(&self, address: u8) -> Option<SimulatedProbe> {
        self.probes.get(&address).cloned()
    }

    /// Pre-create the probe at `address` so it can be scripted (for example
    /// taken offline) before wiring.
    pub fn attach_probe(&mut self, address: u8) -> SimulatedProbe {
        self.probes.entry(address).or_default().clone()
    }
}

impl Board for SimBoard {
    type Pin = SimPin;
    type Probe = SimulatedProbe;

    fn output_pin(&mut self, number: u8) -> Result<SimPin> {
        self.claims.claim(number)?;
        debug!("SimBoard: GPIO{} -> output", number);
        let pin = SimPin {
            number,
            level: Rc::new(Cell::new(false)),
            writes: Rc::new(Cell::new(0)),
        };
        self.pins.insert(number, pin.clone());
        Ok(pin)
    }

    fn soil_probe(&mut self, address: u8) -> Result<SimulatedProbe> {
        debug!("SimBoard: soil probe @ {:#04x}", address);
        Ok(self.attach_probe(address))
    }
}
