//! rpi-led: composition root.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SysfsGpio / HalGpio<SimPin>   LogEventSink   IniFile        │
//! │  (GpioPort)                    (EventSink)    (ConfigPort)   │
//! │  TcpBus (BusTransport)         MonotonicClock                │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │        AppService (CommandManager · LedCtrl)           │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  threads: main (pipe) · bus-io · sched · led-blink           │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use rpi_led::adapters::hal_gpio::HalGpio;
use rpi_led::adapters::ini_file::IniFile;
use rpi_led::adapters::log_sink::LogEventSink;
use rpi_led::adapters::sysfs_gpio::SysfsGpio;
use rpi_led::adapters::tcp_transport::TcpBus;
use rpi_led::adapters::time::MonotonicClock;
use rpi_led::app::ports::{GpioPort, SchedulerDelegate};
use rpi_led::app::service::{APP_VERSION, AppService};
use rpi_led::bus::channels::{self, PIPE, PipeChannel, PipeMsg, RESP};
use rpi_led::bus::io_task::{self, BusLinks};
use rpi_led::bus::router;
use rpi_led::bus::telemetry::StatusPublisher;
use rpi_led::config::{AppConfig, CtrlMode, DEFAULT_INI_PATH, GpioBackend};
use rpi_led::control::blink;
use rpi_led::drivers::delay::StdDelay;
use rpi_led::drivers::sim_pin::SimPin;
use rpi_led::scheduler::{self, Schedule, Scheduler};

/// Label of the status telemetry schedule.
const STATUS_SCHEDULE: &str = "status";

/// GPIO output controller with framed TCP command bus and status telemetry
#[derive(Parser, Debug)]
#[command(name = "rpi-led")]
#[command(version)]
#[command(about = "Drive a GPIO output from bus commands, directly or as a blinker")]
struct Args {
    /// JSON init file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_INI_PATH)]
    config: PathBuf,

    /// Use the in-memory pin instead of sysfs.
    #[arg(long)]
    sim: bool,

    /// Override the bus listen address (host:port).
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,

    /// Override the controller mode.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Direct,
    Blink,
}

impl From<ModeArg> for CtrlMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Direct => CtrlMode::Direct,
            ModeArg::Blink => CtrlMode::Blink,
        }
    }
}

// ── Scheduler delegate ────────────────────────────────────────
//
// Bridges the scheduler (which knows nothing about channels) to the
// command pipe.

struct PipeDelegate {
    pipe: &'static PipeChannel,
}

impl SchedulerDelegate for PipeDelegate {
    fn on_schedule_fired(&mut self, label: &str) {
        if label == STATUS_SCHEDULE {
            channels::post(self.pipe, PipeMsg::SendStatus);
        }
    }
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let ini = IniFile::new(&args.config);
    let mut config = ini
        .load_or_default()
        .with_context(|| format!("loading init file {}", ini.path().display()))?;

    if args.sim {
        config.gpio_backend = GpioBackend::Sim;
    }
    if let Some(addr) = &args.listen {
        config.bus_listen_addr.clone_from(addr);
    }
    if let Some(mode) = args.mode {
        config.ctrl_mode = mode.into();
    }
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn main() -> Result<()> {
    let clock = MonotonicClock::new();
    let args = Args::parse();
    setup_tracing(&args);

    info!("rpi-led v{} starting", APP_VERSION);

    // ── 1. Configuration ──────────────────────────────────────
    let config = load_config(&args)?;
    info!(
        "{}: mode={:?} pin={} backend={:?} bus={}",
        config.app_name,
        config.ctrl_mode,
        config.ctrl_out_pin,
        config.gpio_backend,
        config.bus_listen_addr
    );

    // ── 2. Controller ─────────────────────────────────────────
    let mut sink = LogEventSink::new(&config.app_name);
    let gpio: Box<dyn GpioPort + Send> = match config.gpio_backend {
        GpioBackend::Sysfs => Box::new(SysfsGpio::new(&config.sysfs_root)),
        GpioBackend::Sim => Box::new(HalGpio::new(config.ctrl_out_pin, SimPin::new("led"))),
    };
    let mut service = AppService::new(&config, gpio, &mut sink);

    // ── 3. Blink worker ───────────────────────────────────────
    let _worker = match config.ctrl_mode {
        CtrlMode::Blink => Some(
            blink::spawn(
                &config.child_name,
                config.child_stack_kb as usize,
                service.controller(),
                sink.clone(),
                StdDelay,
            )
            .context("spawning blink worker")?,
        ),
        CtrlMode::Direct => None,
    };

    // ── 4. Bus ────────────────────────────────────────────────
    let bus = TcpBus::bind(&config.bus_listen_addr)
        .with_context(|| format!("binding bus on {}", config.bus_listen_addr))?;
    let links = BusLinks {
        pipe: &PIPE,
        resp: &RESP,
    };
    let _io = io_task::spawn(bus, links).context("spawning bus I/O task")?;

    // ── 5. Status schedule ────────────────────────────────────
    let mut sched = Scheduler::new();
    sched.add(Schedule {
        label: STATUS_SCHEDULE,
        interval_ms: config.status_interval_ms,
    });
    let _sched = scheduler::spawn(sched, PipeDelegate { pipe: &PIPE }, scheduler::TICK_PERIOD)
        .context("spawning scheduler")?;

    // ── 6. Command pipe (never returns) ───────────────────────
    info!("Start-up complete in {}ms", clock.uptime_ms());
    let mut publisher = StatusPublisher::new(clock);
    router::run_pipe(&PIPE, &mut service, &mut sink, &mut publisher, &RESP)
}
