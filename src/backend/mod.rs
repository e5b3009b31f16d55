//! Backend module: serial acquisition in a dedicated thread
//!
//! The backend keeps the UI responsive by doing all serial I/O on its own
//! thread. Data flows one direction: port discovery resolves a device, the
//! acquisition worker owns its channel and appends samples to the shared
//! [`crate::store::TelemetryStore`], and the refresh cycle consumes the
//! store on the UI side.
//!
//! # Components
//!
//! - [`ports`] - Port discovery and the selection policy
//! - [`source`] - [`LineSource`] trait plus the real serial implementation
//! - [`worker`] - The acquisition loop and its failure classification
//! - [`mock_port`] - Scripted source for testing without hardware
//!   (feature-gated)
//!
//! # Example
//!
//! ```ignore
//! use altimon::backend::{self, ports::PortSelection};
//!
//! let discovered = backend::ports::discover();
//! match backend::ports::choose(&discovered, config.serial.port.as_deref()) {
//!     PortSelection::Selected(port) => {
//!         let handle = backend::start_acquisition(&port, &config, store, coordinator)?;
//!     }
//!     PortSelection::NeedsOperator(candidates) => { /* show the picker */ }
//!     PortSelection::None => backend::worker::report_no_device(&store, &coordinator),
//! }
//! ```

#[cfg(feature = "mock-port")]
pub mod mock_port;
pub mod ports;
pub mod source;
pub mod worker;

#[cfg(feature = "mock-port")]
pub use mock_port::{MockEnding, MockLineSource};
pub use ports::{choose, discover, PortSelection};
pub use source::{LineEvent, LineSource, SerialLineSource};
pub use worker::{report_no_device, AcquisitionWorker};

use crate::config::AppConfig;
use crate::error::{Result, ResultExt};
use crate::shutdown::ShutdownCoordinator;
use crate::store::TelemetryStore;
use crate::types::PortDescriptor;
use std::thread::JoinHandle;

/// Open the resolved port and spawn the acquisition worker
///
/// Must be called at most once per process: the worker owns the channel
/// exclusively and is never restarted.
pub fn start_acquisition(
    port: &PortDescriptor,
    config: &AppConfig,
    store: TelemetryStore,
    coordinator: ShutdownCoordinator,
) -> Result<JoinHandle<()>> {
    let source = SerialLineSource::open(port, config.serial.baud_rate, config.read_timeout())
        .with_context(|| format!("failed to open serial port {}", port.name))?;
    Ok(AcquisitionWorker::spawn(
        Box::new(source),
        store,
        coordinator,
    )?)
}
