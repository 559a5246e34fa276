//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements    | Connects to                 |
//! |-----------------|---------------|-----------------------------|
//! | `sysfs_gpio`    | GpioPort      | Linux `/sys/class/gpio`     |
//! | `hal_gpio`      | GpioPort      | any `embedded-hal` OutputPin|
//! | `log_sink`      | EventSink     | `log` facade, with filters  |
//! | `ini_file`      | ConfigPort    | JSON init file              |
//! | `tcp_transport` | BusTransport  | TCP listener, 4 clients     |
//! | `time`          |               | monotonic process clock     |

pub mod hal_gpio;
pub mod ini_file;
pub mod log_sink;
pub mod sysfs_gpio;
pub mod tcp_transport;
pub mod time;
