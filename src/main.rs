mod app;
mod coach;
mod config;
mod event;
mod progress;
mod storage;
mod theme;
mod ui;
mod workout;

use app::SinisterApp;
use coach::{CoachClient, CoachProxy};
use config::AppConfig;
use eframe::egui;
use log::info;
use std::sync::mpsc;
use storage::{KvStore, SETTINGS_KEY};
use workout::{UserSettings, WorkoutStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    info!("data directory: {}", config.data_dir.display());
    let kv = KvStore::new(config.data_dir.clone());
    let settings: UserSettings = kv.load(SETTINGS_KEY, UserSettings::default());
    let store = WorkoutStore::open(kv);
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("sinister-runtime")
        .build()?;

    let coach =
        runtime.block_on(async { CoachClient::new(CoachProxy::from_config(&config.coach), tx) })?;
    coach.start();

    let app = SinisterApp::new(rx, coach, store, settings);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 860.0])
            .with_min_inner_size([360.0, 560.0]),
        ..Default::default()
    };

    eframe::run_native(
        "S&S Tracker",
        native_options,
        Box::new(move |creation_context| {
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
