// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod calibrator;
mod config;
mod engine;
mod gates;
mod gui;
mod oscope;
mod types;
use anyhow::{anyhow, Context};
use eframe::egui;
use log::info;
use config::ScopeConfig;
fn load_config() -> anyhow::Result<ScopeConfig> {
    match ScopeConfig::locate(std::env::args().nth(1)) {
        Some(path) => ScopeConfig::load(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => {
            info!("no config given, using defaults");
            Ok(ScopeConfig::default())
        }
    }
}
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = load_config()?;
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1100.0, 760.0])
        .with_min_inner_size([800.0, 560.0])
        .with_title("UT Scope");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "UT Scope",
        options,
        Box::new(move |_cc| Box::new(gui::UtScopeApp::new(config))),
    )
    .map_err(|err| anyhow!("window error: {err}"))
}
