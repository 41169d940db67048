use log::{error, info};
use timeline_engine::types::config::TimelineConfig;
use timeline_engine::ui::app::TimelineDemoApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match TimelineConfig::load_from_file(&path) {
            Ok(config) => {
                info!("loaded config from {path}");
                config
            }
            Err(err) => {
                error!("could not load config {path}: {err}; using defaults");
                TimelineConfig::default()
            }
        },
        None => TimelineConfig::default(),
    };

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1400.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Timeline Engine Demo",
        native_options,
        Box::new(|cc| Ok(Box::new(TimelineDemoApp::new(cc, config)?))),
    )
}
