//! AppService → CommandManager → LedCtrl → GpioPort, end to end with
//! mock adapters.

use rpi_led::app::commands::{AppCommand, Opcode};
use rpi_led::app::dispatch::DispatchError;
use rpi_led::app::events::{AppEvent, BlinkTiming};
use rpi_led::app::service::AppService;
use rpi_led::config::CtrlMode;

use crate::mock_hw::{GpioCall, MockGpio, RecordingSink, config};

fn gpio_calls(svc: &AppService<MockGpio>) -> Vec<GpioCall> {
    svc.controller().lock(|c| c.borrow().gpio().calls.clone())
}

// ── Direct mode ───────────────────────────────────────────────

#[test]
fn mapped_pin_17_turn_on_then_off() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Direct, 17), MockGpio::new(), &mut sink);

    let s = svc.build_status();
    assert!(s.is_mapped);
    assert_eq!(s.out_pin, 17);
    assert!(!s.led_on);

    svc.handle_record(&AppCommand::TurnOn.encode(), &mut sink).unwrap();
    assert!(svc.build_status().led_on);

    svc.handle_record(&AppCommand::TurnOff.encode(), &mut sink).unwrap();
    assert!(!svc.build_status().led_on);

    assert_eq!(
        gpio_calls(&svc),
        vec![
            GpioCall::Map,
            GpioCall::Configure(17),
            GpioCall::Low(17),
            GpioCall::High(17),
            GpioCall::Low(17),
        ]
    );
    assert_eq!(svc.build_status().valid_cmd_count, 2);
}

#[test]
fn failed_map_makes_level_commands_silent_successes() {
    let mut sink = RecordingSink::default();
    let mut svc =
        AppService::new(&config(CtrlMode::Direct, 17), MockGpio::failing_map(), &mut sink);

    assert_eq!(sink.events()[0], AppEvent::MapFailed);
    assert!(!svc.build_status().is_mapped);

    for _ in 0..3 {
        assert!(svc.handle_command(AppCommand::TurnOn, &mut sink).is_ok());
        assert!(svc.handle_command(AppCommand::TurnOff, &mut sink).is_ok());
    }

    let s = svc.build_status();
    assert!(!s.led_on);
    assert_eq!(s.valid_cmd_count, 6);
    assert_eq!(s.invalid_cmd_count, 0);
    assert_eq!(gpio_calls(&svc), vec![GpioCall::Map]);
    assert_eq!(
        sink.count_where(|e| matches!(e, AppEvent::LevelChanged { .. })),
        0
    );
}

#[test]
fn level_change_event_names_pin_and_level() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Direct, 4), MockGpio::new(), &mut sink);
    svc.handle_command(AppCommand::TurnOn, &mut sink).unwrap();
    assert_eq!(sink.last(), Some(AppEvent::LevelChanged { pin: 4, on: true }));
}

// ── Blink mode ────────────────────────────────────────────────

#[test]
fn duration_commands_accept_extremes_and_show_in_status() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Blink, 17), MockGpio::new(), &mut sink);

    svc.handle_record(&AppCommand::SetOnTime(0).encode(), &mut sink).unwrap();
    svc.handle_record(&AppCommand::SetOffTime(u32::MAX).encode(), &mut sink).unwrap();

    assert_eq!(
        svc.build_status().timing,
        Some(BlinkTiming { on_time_ms: 0, off_time_ms: u32::MAX })
    );
    assert_eq!(sink.last(), Some(AppEvent::OffTimeSet(u32::MAX)));

    svc.handle_record(&AppCommand::SetOnTime(250).encode(), &mut sink).unwrap();
    assert_eq!(svc.build_status().timing.map(|t| t.on_time_ms), Some(250));
}

#[test]
fn blink_mode_rejects_level_commands() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Blink, 17), MockGpio::new(), &mut sink);

    assert_eq!(
        svc.handle_record(&[Opcode::TurnOn as u8], &mut sink),
        Err(DispatchError::NotRegistered(Opcode::TurnOn))
    );
    assert_eq!(
        sink.last(),
        Some(AppEvent::InvalidCommand(DispatchError::NotRegistered(Opcode::TurnOn)))
    );
    assert_eq!(svc.build_status().invalid_cmd_count, 1);
    assert!(!svc.build_status().led_on);
}

// ── Reset & dispatch errors ───────────────────────────────────

#[test]
fn reset_zeroes_counters_and_keeps_controller_state() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Direct, 17), MockGpio::new(), &mut sink);

    svc.handle_command(AppCommand::TurnOn, &mut sink).unwrap();
    let _ = svc.handle_record(&[0xFF], &mut sink);
    let _ = svc.handle_record(&[], &mut sink);
    let before = svc.build_status();
    assert_eq!((before.valid_cmd_count, before.invalid_cmd_count), (1, 2));

    svc.handle_record(&AppCommand::Reset.encode(), &mut sink).unwrap();
    let after = svc.build_status();

    assert_eq!((after.valid_cmd_count, after.invalid_cmd_count), (0, 0));
    assert_eq!(after.is_mapped, before.is_mapped);
    assert_eq!(after.out_pin, before.out_pin);
    assert!(after.led_on);
    assert_eq!(sink.filter_resets(), 1);
}

#[test]
fn malformed_records_count_invalid() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Blink, 17), MockGpio::new(), &mut sink);

    let bad: [&[u8]; 5] = [&[], &[6], &[4], &[5, 0x80], &[0, 0]];
    for record in bad {
        assert!(svc.handle_record(record, &mut sink).is_err(), "{record:?}");
    }
    assert_eq!(svc.build_status().invalid_cmd_count, 5);
    assert_eq!(svc.build_status().valid_cmd_count, 0);
}

#[test]
fn counters_wrap_at_u16() {
    let mut sink = RecordingSink::default();
    let mut svc = AppService::new(&config(CtrlMode::Direct, 17), MockGpio::new(), &mut sink);
    for _ in 0..=u16::MAX as u32 {
        svc.handle_command(AppCommand::Noop, &mut sink).unwrap();
    }
    assert_eq!(svc.build_status().valid_cmd_count, 0);
}
