//! Altitude Monitor - Main Entry Point
//!
//! Wires the core together: configuration, the CSV audit log, the shared
//! telemetry store, the shutdown coordinator, port discovery, the
//! acquisition thread, and the eframe application.

use altimon::{
    backend::{self, PortSelection},
    config::AppConfig,
    csv_log::CsvLog,
    frontend::AltimonApp,
    refresh::RefreshCycle,
    shutdown::ShutdownCoordinator,
    store::TelemetryStore,
    types::TerminationCause,
};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,altimon=trace")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Altitude Monitor");

    let config = AppConfig::load_or_default();

    let log = CsvLog::open(&config.log.path)
        .with_context(|| format!("failed to open log file {:?}", config.log.path))?;
    tracing::info!("telemetry log at {}", log.path().display());

    let store = TelemetryStore::new();
    let (coordinator, terminate_rx) = ShutdownCoordinator::new(log.clone());
    let refresh = RefreshCycle::new(store.clone(), log, coordinator.clone());

    // Resolve the acquisition device before the UI comes up; when several
    // ports exist the app shows a picker and acquisition starts after the
    // operator chooses.
    let discovered = backend::discover();
    tracing::info!("discovered {} serial port(s)", discovered.len());

    let pending_choice = match backend::choose(&discovered, config.serial.port.as_deref()) {
        PortSelection::Selected(port) => {
            match backend::start_acquisition(&port, &config, store.clone(), coordinator.clone()) {
                Ok(_handle) => {
                    tracing::info!("acquisition started on {}", port.name);
                }
                Err(e) => {
                    tracing::error!("failed to open {}: {}", port.name, e);
                    store.set_status(altimon::types::SessionStatus::DeviceDisconnected);
                    coordinator.request_async(TerminationCause::DeviceDisconnected);
                }
            }
            None
        }
        PortSelection::NeedsOperator(candidates) => Some(candidates),
        PortSelection::None => {
            backend::report_no_device(&store, &coordinator);
            None
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 720.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Altitude Monitor"),
        ..Default::default()
    };

    tracing::info!("Setup complete");

    let app_config = config.clone();
    let app_store = store.clone();
    let app_coordinator = coordinator.clone();
    let result = eframe::run_native(
        "Altitude Monitor",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(AltimonApp::new(
                cc,
                app_config,
                app_store,
                app_coordinator,
                terminate_rx,
                refresh,
                pending_choice,
            )))
        }),
    );

    // Closing the window without the stop button still logs a cause line
    // and unblocks the worker; a no-op if a trigger already won.
    coordinator.request(TerminationCause::UserTerminated);

    tracing::info!("Shutting down...");
    result.map_err(|e| anyhow::anyhow!("eframe error: {e}"))
}
