//! Host-side soil probe.
//!
//! Readings are injected through a shared handle: the simulator (or a
//! test) keeps one clone and writes to it, the monitor polls the other.

use std::cell::RefCell;
use std::rc::Rc;

use crate::app::ports::SoilProbe;
use crate::error::SensorError;

use super::soil::PHYSICAL_MIN;

#[derive(Debug)]
struct SimState {
    online: bool,
    raw: f32,
    temperature_c: f32,
    /// Remaining reads that fail before the probe recovers.
    dropouts: u32,
    opened_at: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct SimulatedProbe(Rc<RefCell<SimState>>);

impl Default for SimulatedProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedProbe {
    /// Dry soil at 20 °C, answering on any address.
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(SimState {
            online: true,
            raw: PHYSICAL_MIN,
            temperature_c: 20.0,
            dropouts: 0,
            opened_at: None,
        })))
    }

    pub fn set_raw(&self, raw: f32) {
        self.0.borrow_mut().raw = raw;
    }

    pub fn raw(&self) -> f32 {
        self.0.borrow().raw
    }

    pub fn set_temperature_c(&self, c: f32) {
        self.0.borrow_mut().temperature_c = c;
    }

    /// An offline probe fails `begin`.
    pub fn set_online(&self, online: bool) {
        self.0.borrow_mut().online = online;
    }

    /// Make the next `count` raw reads fail.
    pub fn drop_reads(&self, count: u32) {
        self.0.borrow_mut().dropouts = count;
    }

    /// Address passed to the last successful `begin`.
    pub fn opened_at(&self) -> Option<u8> {
        self.0.borrow().opened_at
    }
}

impl SoilProbe for SimulatedProbe {
    fn begin(&mut self, address: u8) -> bool {
        let mut s = self.0.borrow_mut();
        if s.online {
            s.opened_at = Some(address);
        }
        s.online
    }

    fn read_raw(&mut self) -> Result<f32, SensorError> {
        let mut s = self.0.borrow_mut();
        if s.dropouts > 0 {
            s.dropouts -= 1;
            return Err(SensorError::AcquisitionFailed);
        }
        Ok(s.raw)
    }

    fn read_temperature_c(&mut self) -> Result<f32, SensorError> {
        Ok(self.0.borrow().temperature_c)
    }

    fn version(&self) -> Option<u32> {
        self.0.borrow().opened_at.map(|_| 0x0FAB_0001)
    }
}
