use anyhow::{bail, Result};
use presync_sync::{Config, SyncService};
use tracing::{error, info};

enum Command {
    Apply,
    Clean,
}

fn parse_command() -> Result<Command> {
    match std::env::args().nth(1).as_deref() {
        None | Some("apply") => Ok(Command::Apply),
        Some("clean") => Ok(Command::Clean),
        Some(other) => bail!("unknown command '{other}', expected 'apply' or 'clean'"),
    }
}

async fn run(service: &SyncService, command: Command) -> Result<()> {
    match command {
        Command::Apply => {
            let report = service.apply().await?;
            info!("Sync complete: {} file(s) written", report.total());
        }
        Command::Clean => service.clean()?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = parse_command()?;

    // Load configuration
    let config = Config::load()?;
    presync_logging::init_logging(&config.logging.level, config.logging.format)?;

    let service = SyncService::new(config);
    if let Err(e) = run(&service, command).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
