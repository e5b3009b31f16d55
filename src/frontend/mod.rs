//! Frontend module: the eframe application
//!
//! The UI is a pull-based consumer of the core: once per refresh period it
//! runs a [`RefreshCycle`] tick and renders whatever the tick produced -
//! the headline altitude, the live chart, and (once a terminal condition is
//! reached) the matching shutdown modal. Its single inbound event is the
//! stop button, which flows into the shutdown coordinator.
//!
//! When several serial ports exist at startup, the app first shows a
//! selection screen; acquisition starts only after the operator picks one.

pub mod plot;

pub use plot::AltitudePlot;

use crate::backend;
use crate::config::AppConfig;
use crate::refresh::{RefreshCycle, RefreshOutput};
use crate::shutdown::ShutdownCoordinator;
use crate::store::TelemetryStore;
use crate::types::{ModalKind, PortDescriptor, SessionStatus, TerminationCause};
use crossbeam_channel::Receiver;
use std::time::{Duration, Instant};

/// Which screen the app is on
enum AppPhase {
    /// Several ports were discovered; waiting for the operator to choose
    PickingPort {
        candidates: Vec<PortDescriptor>,
        selected: usize,
    },
    /// Acquisition resolved (running, or already terminal)
    Monitoring,
}

/// The altimon eframe application
pub struct AltimonApp {
    config: AppConfig,
    store: TelemetryStore,
    coordinator: ShutdownCoordinator,
    terminate_rx: Receiver<TerminationCause>,
    refresh: RefreshCycle,
    plot: AltitudePlot,
    phase: AppPhase,
    last_tick: Option<Instant>,
    latest: Option<RefreshOutput>,
    stop_pressed: bool,
}

impl AltimonApp {
    /// Create the app
    ///
    /// `pending_choice` is `Some` when port discovery needs the operator;
    /// otherwise acquisition was already resolved by `main`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        store: TelemetryStore,
        coordinator: ShutdownCoordinator,
        terminate_rx: Receiver<TerminationCause>,
        refresh: RefreshCycle,
        pending_choice: Option<Vec<PortDescriptor>>,
    ) -> Self {
        if config.ui.dark_mode {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        }

        let phase = match pending_choice {
            Some(candidates) if !candidates.is_empty() => AppPhase::PickingPort {
                candidates,
                selected: 0,
            },
            _ => AppPhase::Monitoring,
        };

        Self {
            config,
            store,
            coordinator,
            terminate_rx,
            refresh,
            plot: AltitudePlot::default(),
            phase,
            last_tick: None,
            latest: None,
            stop_pressed: false,
        }
    }

    fn tick_due(&self) -> bool {
        match self.last_tick {
            None => true,
            Some(at) => at.elapsed() >= self.config.refresh_interval(),
        }
    }

    fn run_tick_if_due(&mut self) {
        if !self.tick_due() {
            return;
        }
        self.last_tick = Some(Instant::now());
        self.latest = Some(self.refresh.tick(chrono::Local::now()));
    }

    fn request_stop(&mut self) {
        if self.stop_pressed {
            return;
        }
        self.stop_pressed = true;
        tracing::info!("operator requested stop");
        self.store.set_status(SessionStatus::UserTerminated);
        self.coordinator.request_async(TerminationCause::UserTerminated);
    }

    fn connect_chosen_port(&mut self, port: &PortDescriptor) {
        match backend::start_acquisition(
            port,
            &self.config,
            self.store.clone(),
            self.coordinator.clone(),
        ) {
            // The handle is intentionally detached; the worker exits via the
            // coordinator's cancel flag or a channel failure.
            Ok(_handle) => {
                tracing::info!("acquisition started on {}", port.name);
                // Remember the choice so the next session skips the picker
                self.config.serial.port = Some(port.name.clone());
                if let Err(e) = self.config.save() {
                    tracing::warn!("failed to persist chosen port: {}", e);
                }
                self.phase = AppPhase::Monitoring;
            }
            Err(e) => {
                tracing::error!("failed to open {}: {}", port.name, e);
                self.store.set_status(SessionStatus::DeviceDisconnected);
                self.coordinator
                    .request_async(TerminationCause::DeviceDisconnected);
                self.phase = AppPhase::Monitoring;
            }
        }
    }

    fn show_picker(&mut self, ctx: &egui::Context) {
        let mut chosen: Option<PortDescriptor> = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let AppPhase::PickingPort {
                candidates,
                selected,
            } = &mut self.phase
            else {
                return;
            };

            ui.heading("Select COM Port");
            ui.add_space(8.0);
            ui.label("Several serial devices were found. Pick the altitude feed:");
            ui.add_space(8.0);

            egui::ComboBox::from_label("Port")
                .selected_text(candidates[*selected].label.clone())
                .show_ui(ui, |ui| {
                    for (i, port) in candidates.iter().enumerate() {
                        ui.selectable_value(selected, i, port.label.clone());
                    }
                });

            ui.add_space(12.0);
            if ui.button("Connect").clicked() {
                chosen = Some(candidates[*selected].clone());
            }
        });

        if let Some(port) = chosen {
            self.connect_chosen_port(&port);
        }
    }

    fn show_monitor(&mut self, ctx: &egui::Context) {
        let current = self.latest.as_ref().map(|o| o.current_value).unwrap_or(0.0);
        let modal = self.latest.as_ref().and_then(|o| o.modal);
        let terminal = modal.is_some();
        let stop_enabled = !terminal && !self.stop_pressed;
        let mut stop_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Arduino Live Data Feed");
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!("Altitude: {} ft", current))
                    .size(36.0)
                    .strong(),
            );
            ui.add_space(8.0);

            let plot_height = ui.available_height() - 48.0;
            ui.allocate_ui(egui::vec2(ui.available_width(), plot_height.max(120.0)), |ui| {
                self.plot.render(ui, self.refresh.display());
            });

            ui.add_space(8.0);
            ui.add_enabled_ui(stop_enabled, |ui| {
                if ui.button("STOP").clicked() {
                    stop_clicked = true;
                }
            });
        });

        if stop_clicked {
            self.request_stop();
        }

        if let Some(modal) = modal {
            show_shutdown_modal(ctx, modal);
        }
    }
}

fn show_shutdown_modal(ctx: &egui::Context, modal: ModalKind) {
    egui::Window::new(modal.title())
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(modal.body());
        });
}

impl eframe::App for AltimonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // The terminate signal fires exactly once; on receipt the viewport
        // closes and main unwinds.
        if let Ok(cause) = self.terminate_rx.try_recv() {
            tracing::info!("terminate signal received: {}", cause);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        match self.phase {
            AppPhase::PickingPort { .. } => {
                self.show_picker(ctx);
            }
            AppPhase::Monitoring => {
                self.run_tick_if_due();
                self.show_monitor(ctx);
            }
        }

        // Keep ticking even without input events.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
