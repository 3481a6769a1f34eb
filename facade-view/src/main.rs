//! Application entry point for the facade generator.
//!
//! This binary sets up logging and eframe/egui, then hands all interactive
//! logic and rendering to [`FacadeViewer`] from the `viewer` module.

mod viewer;

use viewer::FacadeViewer;

/// Starts the native eframe application.
///
/// Core events are emitted through `tracing`; with its `log` bridge they
/// reach `env_logger`, so `RUST_LOG=debug` shows stage timings and counts.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Facade",
        options,
        Box::new(|_cc| Ok(Box::new(FacadeViewer::new()))),
    )
}
