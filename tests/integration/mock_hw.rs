//! Mock hardware for integration tests.
//!
//! Records every pin write and scripts every probe read so tests can assert
//! on exact edge counts without touching real GPIO or I2C.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use demeter::app::events::{DiagnosticEvent, SwitchCause};
use demeter::app::ports::{Board, EventSink, SoilProbe};
use demeter::error::{ConfigError, Result, SensorError};
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

// ── RecordingPin ──────────────────────────────────────────────

#[derive(Debug, Default)]
struct PinRecord {
    writes: Vec<bool>,
    fail: bool,
}

/// Output pin whose clones share one write history.
#[derive(Debug, Clone, Default)]
pub struct RecordingPin(Rc<RefCell<PinRecord>>);

#[allow(dead_code)]
impl RecordingPin {
    pub fn writes(&self) -> Vec<bool> {
        self.0.borrow().writes.clone()
    }

    pub fn level(&self) -> bool {
        self.0.borrow().writes.last().copied().unwrap_or(false)
    }

    pub fn rising_edges(&self) -> usize {
        self.0.borrow().writes.iter().filter(|&&w| w).count()
    }

    pub fn falling_edges(&self) -> usize {
        self.0.borrow().writes.iter().filter(|&&w| !w).count()
    }

    pub fn set_failing(&self, fail: bool) {
        self.0.borrow_mut().fail = fail;
    }

    fn write(&self, high: bool) -> core::result::Result<(), ErrorKind> {
        let mut rec = self.0.borrow_mut();
        if rec.fail {
            return Err(ErrorKind::Other);
        }
        rec.writes.push(high);
        Ok(())
    }
}

impl ErrorType for RecordingPin {
    type Error = ErrorKind;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.write(true)
    }
}

// ── ScriptedProbe ─────────────────────────────────────────────

#[derive(Debug)]
struct ProbeScript {
    online: bool,
    /// Consumed front to back; when empty the last value repeats.
    raw: VecDeque<core::result::Result<f32, SensorError>>,
    last_raw: f32,
    temperature_c: f32,
    raw_reads: usize,
}

#[derive(Debug, Clone)]
pub struct ScriptedProbe(Rc<RefCell<ProbeScript>>);

impl Default for ScriptedProbe {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(ProbeScript {
            online: true,
            raw: VecDeque::new(),
            last_raw: 1100.0,
            temperature_c: 21.0,
            raw_reads: 0,
        })))
    }
}

#[allow(dead_code)]
impl ScriptedProbe {
    /// Hold `raw` until told otherwise.
    pub fn set_raw(&self, raw: f32) {
        let mut s = self.0.borrow_mut();
        s.raw.clear();
        s.last_raw = raw;
    }

    pub fn queue(&self, samples: &[f32]) {
        self.0.borrow_mut().raw.extend(samples.iter().copied().map(Ok));
    }

    pub fn queue_failure(&self) {
        self.0
            .borrow_mut()
            .raw
            .push_back(Err(SensorError::AcquisitionFailed));
    }

    pub fn set_online(&self, online: bool) {
        self.0.borrow_mut().online = online;
    }

    pub fn set_temperature_c(&self, c: f32) {
        self.0.borrow_mut().temperature_c = c;
    }

    pub fn raw_reads(&self) -> usize {
        self.0.borrow().raw_reads
    }
}

impl SoilProbe for ScriptedProbe {
    fn begin(&mut self, _address: u8) -> bool {
        self.0.borrow().online
    }

    fn read_raw(&mut self) -> core::result::Result<f32, SensorError> {
        let mut s = self.0.borrow_mut();
        s.raw_reads += 1;
        match s.raw.pop_front() {
            Some(Ok(v)) => {
                s.last_raw = v;
                Ok(v)
            }
            Some(Err(e)) => Err(e),
            None => Ok(s.last_raw),
        }
    }

    fn read_temperature_c(&mut self) -> core::result::Result<f32, SensorError> {
        Ok(self.0.borrow().temperature_c)
    }

    fn version(&self) -> Option<u32> {
        Some(0x2A)
    }
}

// ── MockBoard ─────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockBoard {
    pins: BTreeMap<u8, RecordingPin>,
    probes: BTreeMap<u8, ScriptedProbe>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the pin `number`.  Panics when it was never requested.
    pub fn pin(&self, number: u8) -> RecordingPin {
        self.pins[&number].clone()
    }

    /// Handle to the probe at `address`, created on first use so it can be
    /// scripted before wiring.
    pub fn probe(&mut self, address: u8) -> ScriptedProbe {
        self.probes.entry(address).or_default().clone()
    }
}

impl Board for MockBoard {
    type Pin = RecordingPin;
    type Probe = ScriptedProbe;

    fn output_pin(&mut self, number: u8) -> Result<RecordingPin> {
        if self.pins.contains_key(&number) {
            return Err(ConfigError::PinInUse(number).into());
        }
        let pin = RecordingPin::default();
        self.pins.insert(number, pin.clone());
        Ok(pin)
    }

    fn soil_probe(&mut self, address: u8) -> Result<ScriptedProbe> {
        Ok(self.probe(address))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<DiagnosticEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `SwitchChanged` events for `device` with the given cause.
    pub fn switch_changes(&self, device: &str, cause: SwitchCause) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, DiagnosticEvent::SwitchChanged { device: d, cause: c, .. }
                    if d.as_str() == device && *c == cause)
            })
            .count()
    }

    pub fn count(&self, pred: impl Fn(&DiagnosticEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &DiagnosticEvent) {
        self.events.push(event.clone());
    }
}
