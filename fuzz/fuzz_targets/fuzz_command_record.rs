//! Fuzz target: command record dispatch
//!
//! Arbitrary records go through the full service path in both modes.
//! Nothing may panic, and a record is either accepted or counted invalid.
//!
//! cargo fuzz run fuzz_command_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpi_led::adapters::hal_gpio::HalGpio;
use rpi_led::app::events::AppEvent;
use rpi_led::app::ports::EventSink;
use rpi_led::app::service::AppService;
use rpi_led::config::{AppConfig, CtrlMode};
use rpi_led::drivers::sim_pin::SimPin;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    for mode in [CtrlMode::Direct, CtrlMode::Blink] {
        let config = AppConfig {
            ctrl_mode: mode,
            ..Default::default()
        };
        let gpio = HalGpio::new(config.ctrl_out_pin, SimPin::new("fuzz"));
        let mut svc = AppService::new(&config, gpio, &mut Discard);

        let before = svc.build_status();
        let ok = svc.handle_record(data, &mut Discard).is_ok();
        let after = svc.build_status();

        if data == [1] {
            assert!(ok);
            continue;
        }
        if ok {
            assert_eq!(after.valid_cmd_count, before.valid_cmd_count + 1);
        } else {
            assert_eq!(after.invalid_cmd_count, before.invalid_cmd_count + 1);
        }
    }
});
