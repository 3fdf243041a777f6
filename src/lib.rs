mod client;
mod error;
mod logger;
mod protocol;
mod reconcile;
mod scheduler;
mod state;
mod transport;
mod types;
mod units;

pub use client::{Delays, DriverConfig, SkyfiClient, SkyfiClientBuilder};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskHandle, TokioScheduler};
pub use state::DeviceState;
pub use transport::{HttpTransport, ResponseSink, Transport};
pub use types::*;
pub use units::{to_device_unit, to_display_unit};
