//! Blink worker against the service-owned controller.

use std::thread;
use std::time::{Duration, Instant};

use rpi_led::adapters::hal_gpio::HalGpio;
use rpi_led::adapters::log_sink::LogEventSink;
use rpi_led::app::commands::AppCommand;
use rpi_led::app::events::{AppEvent, CTRL_BLINK_EID};
use rpi_led::app::service::AppService;
use rpi_led::config::CtrlMode;
use rpi_led::control::blink::{self, StepOutcome};
use rpi_led::drivers::delay::StdDelay;
use rpi_led::drivers::sim_pin::SimPin;

use crate::mock_hw::{GpioCall, MockGpio, RecordingDelay, RecordingSink, config};

#[test]
fn cycle_uses_current_timing_from_commands() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Blink, 17), MockGpio::new(), &mut sink);
    let ctrl = svc.controller();
    let mut delay = RecordingDelay::default();

    assert_eq!(blink::run_cycle(&ctrl, &mut sink, &mut delay), StepOutcome::Continue);

    svc.handle_command(AppCommand::SetOnTime(5), &mut sink).unwrap();
    svc.handle_command(AppCommand::SetOffTime(0), &mut sink).unwrap();
    assert_eq!(blink::run_cycle(&ctrl, &mut sink, &mut delay), StepOutcome::Continue);

    assert_eq!(delay.waits_ms, vec![10, 20, 5, 0]);
    let calls = ctrl.lock(|c| c.borrow().gpio().calls.clone());
    assert_eq!(
        &calls[3..],
        &[GpioCall::High(17), GpioCall::Low(17), GpioCall::High(17), GpioCall::Low(17)]
    );
    assert_eq!(
        sink.count_where(|e| matches!(e, AppEvent::BlinkPhase { .. })),
        4
    );
}

#[test]
fn unmapped_controller_stops_the_worker() {
    let mut sink = RecordingSink::default();
    let svc = AppService::new(&config(CtrlMode::Blink, 17), MockGpio::failing_map(), &mut sink);
    let ctrl = svc.controller();
    let mut delay = RecordingDelay::default();

    blink::run_worker(&ctrl, &mut sink, &mut delay);

    assert!(delay.waits_ms.is_empty());
    assert_eq!(sink.last(), Some(AppEvent::WorkerStopped));
    assert_eq!(ctrl.lock(|c| c.borrow().gpio().calls.clone()), vec![GpioCall::Map]);
}

#[test]
fn worker_thread_toggles_a_sim_pin() {
    let pin = SimPin::new("test");
    let mut sink = RecordingSink::default();
    let mut cfg = config(CtrlMode::Blink, 17);
    cfg.ctrl_on_time_ms = 1;
    cfg.ctrl_off_time_ms = 1;
    let svc = AppService::new(&cfg, HalGpio::new(17, pin.clone()), &mut sink);

    let _worker = blink::spawn("blink-test", 16, svc.controller(), sink.clone(), StdDelay).unwrap();

    // Construction drives the pin low once; each phase adds one write.
    let deadline = Instant::now() + Duration::from_secs(5);
    while pin.write_count() < 8 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(pin.write_count() >= 8, "only {} writes", pin.write_count());
    assert!(sink.count_where(|e| matches!(e, AppEvent::BlinkPhase { .. })) >= 7);
}

#[test]
fn log_sink_suppresses_blink_phases_until_reset() {
    let mut sink = LogEventSink::new("blink_tests");
    let mut svc = AppService::new(&config(CtrlMode::Blink, 17), MockGpio::new(), &mut sink);
    let ctrl = svc.controller();
    let mut delay = RecordingDelay::default();

    for _ in 0..5 {
        blink::run_cycle(&ctrl, &mut sink, &mut delay);
    }
    // Ten phases seen; the counter saturates rather than wrapping.
    assert_eq!(sink.filter().count(CTRL_BLINK_EID), Some(10));
    assert!(!sink.filter().admit(CTRL_BLINK_EID));

    svc.handle_record(&AppCommand::Reset.encode(), &mut sink).unwrap();
    assert_eq!(sink.filter().count(CTRL_BLINK_EID), Some(0));
    assert!(sink.filter().admit(CTRL_BLINK_EID));
}
