use anyhow::Result;

use crate::audit::handle_audit;
use crate::cli::Commands;
use crate::config::SyncConfig;
use crate::pipeline::handle_generate;
use crate::transcribe::handle_transcribe;

pub fn handle_command(command: &Commands) -> Result<()> {
    let config = SyncConfig::load()?;
    match command {
        Commands::Transcribe(args) => handle_transcribe(args, &config),
        Commands::Generate(args) => handle_generate(args, &config),
        Commands::Audit(args) => handle_audit(args, &config),
    }
}
