mod app;
mod border;
mod color;
mod ratio;
mod throttle;
mod ui_theme;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    env_logger::init(); // Initialize logger

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([980.0, 640.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Insta Border Studio",
        options,
        Box::new(|_cc| Ok(Box::new(app::BorderStudioApp::new()))),
    )
}
