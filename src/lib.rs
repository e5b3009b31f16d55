//! # altimon: live altitude telemetry monitor
//!
//! A single-process, single-device monitor that continuously acquires an
//! altitude reading from a serial-attached device, keeps a running time
//! series, republishes it to a live display once per second, persists every
//! refresh tick to an append-only CSV log, and shuts down cleanly exactly
//! once whichever terminal condition occurs first (device lost, operator
//! abort, no device available).
//!
//! ## Architecture
//!
//! - **Backend**: owns the serial channel on a dedicated thread and appends
//!   parsed samples to the shared [`store::TelemetryStore`]
//! - **Refresh cycle**: a periodic consumer that snapshots the store, feeds
//!   the CSV log and the display buffer, and derives UI visibility flags
//! - **Shutdown coordinator**: a compare-and-set state machine that
//!   serializes racing termination triggers into exactly one terminate
//!   signal
//! - **Frontend**: eframe/egui with egui_plot for the live chart
//!
//! ## Data flow
//!
//! Port selector -> acquisition worker -> telemetry store -> refresh cycle
//! -> renderer and log. The shutdown coordinator is cross-cutting: any
//! component may request termination; the coordinator deduplicates.
//!
//! ## Example
//!
//! ```ignore
//! use altimon::{
//!     backend::{self, PortSelection},
//!     config::AppConfig,
//!     csv_log::CsvLog,
//!     refresh::RefreshCycle,
//!     shutdown::ShutdownCoordinator,
//!     store::TelemetryStore,
//! };
//!
//! let config = AppConfig::load_or_default();
//! let log = CsvLog::open(&config.log.path)?;
//! let store = TelemetryStore::new();
//! let (coordinator, terminate_rx) = ShutdownCoordinator::new(log.clone());
//!
//! match backend::choose(&backend::discover(), config.serial.port.as_deref()) {
//!     PortSelection::Selected(port) => {
//!         backend::start_acquisition(&port, &config, store.clone(), coordinator.clone())?;
//!     }
//!     PortSelection::None => backend::report_no_device(&store, &coordinator),
//!     PortSelection::NeedsOperator(_) => { /* UI shows the picker */ }
//! }
//!
//! let mut refresh = RefreshCycle::new(store, log, coordinator);
//! // drive refresh.tick(..) once per second, render the output
//! ```

pub mod backend;
pub mod config;
pub mod csv_log;
pub mod error;
pub mod frontend;
pub mod refresh;
pub mod shutdown;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use csv_log::CsvLog;
pub use error::{AltimonError, Result};
pub use frontend::AltimonApp;
pub use refresh::{RefreshCycle, RefreshOutput};
pub use shutdown::{CoordinatorState, ShutdownCoordinator};
pub use store::{StoreSnapshot, TelemetryStore};
pub use types::{PortDescriptor, Sample, SessionStatus, TerminationCause};
