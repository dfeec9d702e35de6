mod align;
mod audit;
mod cli;
mod commands;
mod config;
mod error;
mod images;
mod lyrics;
mod pipeline;
mod progress;
mod transcribe;
mod ui;

use clap::Parser;

use crate::cli::Cli;
use crate::ui::prelude::*;

fn main() {
    let cli = Cli::parse();
    ui::init(cli.output_format(), true);
    ui::set_debug_mode(cli.debug);

    if let Err(err) = commands::handle_command(&cli.command) {
        emit(Level::Error, "app.error", &format!("{err:#}"), None);
        std::process::exit(1);
    }
}
