//! Device-level behaviour with real drivers on recording pins.

use demeter::app::commands::{CommandToken, Verb};
use demeter::app::events::DiagnosticEvent;
use demeter::app::ports::NullSink;
use demeter::device::{CompositeDevice, Context, Device, Status, Switch, Transition};
use demeter::drivers::led::{LedColor, LedGroup, LedGroupMode};
use demeter::drivers::pump::water_pump;
use demeter::drivers::switch::{Polarity, SwitchDevice, SwitchMode};
use demeter::error::{ActuatorError, Error};
use demeter::time::{Duration, Instant};

use crate::mock_hw::{RecordingPin, RecordingSink};

fn ms(v: u64) -> Instant {
    Instant::from_millis(v)
}

/// Timed switch that is on and whose pin fails the off write.
fn stuck_timed(name: &str, pin: &RecordingPin) -> Box<dyn Device> {
    let mut dev = SwitchDevice::new(name, pin.clone(), SwitchMode::Timed(Duration::millis(10))).unwrap();
    dev.turn_on(ms(0)).unwrap();
    pin.set_failing(true);
    Box::new(dev)
}

#[test]
fn composite_updates_every_child_despite_failure() {
    let (a, b, c) = (RecordingPin::default(), RecordingPin::default(), RecordingPin::default());
    let timed = |name: &str, pin: &RecordingPin| -> Box<dyn Device> {
        let mut dev =
            SwitchDevice::new(name, pin.clone(), SwitchMode::Timed(Duration::millis(10))).unwrap();
        dev.turn_on(ms(0)).unwrap();
        Box::new(dev)
    };
    let mut group = CompositeDevice::new("valves")
        .unwrap()
        .with_child(timed("a", &a))
        .unwrap()
        .with_child(stuck_timed("b", &b))
        .unwrap()
        .with_child(timed("c", &c))
        .unwrap();

    let mut sink = RecordingSink::new();
    let status = group.update(&mut Context::new(ms(10), &mut sink));
    assert_eq!(
        status,
        Status::Degraded(Error::Actuator(ActuatorError::PinWriteFailed))
    );
    assert!(!a.level() && !c.level(), "healthy siblings still expired");
    assert!(b.level(), "failed write leaves the output as it was");

    // The failing child is retried every tick and recovers once the pin does.
    b.set_failing(false);
    let status = group.update(&mut Context::new(ms(11), &mut sink));
    assert_eq!(status, Status::Ok);
    assert!(!b.level());
}

#[test]
fn composite_initialize_reports_worst_child() {
    let (a, b) = (RecordingPin::default(), RecordingPin::default());
    b.set_failing(true);
    let mut group = CompositeDevice::new("pair")
        .unwrap()
        .with_child(Box::new(
            SwitchDevice::new("a", a.clone(), SwitchMode::EventOnEventOff).unwrap(),
        ))
        .unwrap()
        .with_child(Box::new(
            SwitchDevice::new("b", b.clone(), SwitchMode::EventOnEventOff).unwrap(),
        ))
        .unwrap();

    let mut sink = NullSink;
    let status = group.initialize(&mut Context::new(ms(0), &mut sink));
    assert!(status.is_degraded());
    assert_eq!(a.writes(), [false], "first child initialised regardless");
}

#[test]
fn event_switch_stays_on_for_days() {
    let pin = RecordingPin::default();
    let mut dev = SwitchDevice::new("mister", pin.clone(), SwitchMode::EventOnEventOff).unwrap();
    let mut sink = NullSink;
    dev.turn_on(ms(0)).unwrap();
    let day = Duration::hours(24).as_millis();
    for t in (0..=3 * day).step_by(600_000) {
        dev.update(&mut Context::new(ms(t), &mut sink));
    }
    assert!(dev.is_on());
    assert_eq!(dev.turn_off().unwrap(), Transition::Changed);
    assert_eq!(pin.writes(), [true, false]);
}

#[test]
fn active_low_pump_keeps_one_edge_per_transition() {
    let pin = RecordingPin::default();
    let mut pump = water_pump("pump", pin.clone())
        .unwrap()
        .with_polarity(Polarity::ActiveLow);
    let mut sink = NullSink;
    pump.initialize(&mut Context::new(ms(0), &mut sink));
    pump.turn_on(ms(0)).unwrap();
    pump.turn_on(ms(1)).unwrap();
    pump.update(&mut Context::new(ms(60_000), &mut sink));
    assert_eq!(pin.writes(), [true, false, true]);
}

#[test]
fn led_group_fans_out_to_colours_in_order() {
    let pins: [RecordingPin; 4] = Default::default();
    let mut group = LedGroup::new(Some("status"), pins.clone(), LedGroupMode::Stack).unwrap();
    let mut sink = RecordingSink::new();
    let mut ctx = Context::new(ms(0), &mut sink);

    assert_eq!(group.initialize(&mut ctx), Status::Ok);
    group.process_input(&CommandToken::to("status", Verb::On).unwrap(), &mut ctx);
    assert_eq!(group.lit(), 4);

    group.process_input(&CommandToken::to("status", Verb::Level).unwrap().with_value(25), &mut ctx);
    assert!(group.led(LedColor::Red).is_on());
    assert!(!group.led(LedColor::Orange).is_on());

    group.process_input(&CommandToken::to("status.green", Verb::On).unwrap(), &mut ctx);
    assert!(pins[3].level());

    let order: Vec<&str> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            DiagnosticEvent::Initialized { device } => Some(device.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(order, ["status.red", "status.orange", "status.yellow", "status.green"]);
}
