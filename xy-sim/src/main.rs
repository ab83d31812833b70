//! XY-model Metropolis simulator with native egui visualization.

mod cli;
mod gui;
mod headless;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::headless::HeadlessRun;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.engine_config();
    log::debug!("{:?}", config);

    match cli.command.unwrap_or(Commands::Gui) {
        Commands::Gui => {
            let options = eframe::NativeOptions {
                viewport: eframe::egui::ViewportBuilder::default()
                    .with_inner_size([1280.0, 720.0])
                    .with_title("XY Model  ·  Metropolis"),
                renderer: eframe::Renderer::Wgpu,
                ..Default::default()
            };
            eframe::run_native(
                "xy-sim",
                options,
                Box::new(move |cc| Ok(Box::new(gui::XyApp::new(cc, config)))),
            )?;
        }
        Commands::Headless { sweeps, report_every, commands } => {
            let job = HeadlessRun { sweeps, report_every, commands };
            let rows = headless::run(&config, &job)?;
            headless::print_trace(&rows);
        }
    }
    Ok(())
}
