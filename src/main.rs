use clap::Command;
use std::process::ExitCode;
use tracing::{error, info};
use zonehook::config::{HookAction, HookConfig};
use zonehook::error::ConfigError;
use zonehook::zone::ZoneEditor;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("zonehook")
        .version(env!("CARGO_PKG_VERSION"))
        .about("ACME DNS-01 challenge hook for BIND zone files")
        .subcommand_required(true)
        .subcommand(
            Command::new("auth").about("Publish the challenge TXT record and bump the serial"),
        )
        .subcommand(
            Command::new("cleanup").about("Remove the challenge TXT record and bump the serial"),
        )
        .get_matches();

    let action = match matches.subcommand_name() {
        Some("auth") => HookAction::Auth,
        Some("cleanup") => HookAction::Cleanup,
        _ => unreachable!("subcommand is required"),
    };

    match run(action) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(action: HookAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = HookConfig::from_env(action)?;
    let owner = config.validation_domain();
    let mut editor = ZoneEditor::load(&config.zone_dir, &config.domain)?;

    match action {
        HookAction::Auth => {
            let token = config
                .validation_token
                .as_deref()
                .ok_or(ConfigError::MissingVar("CERTBOT_VALIDATION"))?;
            if config.force_register {
                editor.force_replace_txt(&owner, token)?;
            } else {
                editor.upsert_txt(&owner, token)?;
            }
        }
        HookAction::Cleanup => {
            editor.delete_txt(&owner)?;
        }
    }

    editor.save()?;

    if !config.settle_delay.is_zero() {
        info!(
            "Waiting {}s for zone propagation",
            config.settle_delay.as_secs()
        );
        std::thread::sleep(config.settle_delay);
    }

    if let Some(command) = &config.reload_command {
        reload_server(command)?;
    }

    Ok(())
}

/// Run the configured reload command (e.g. `rndc reload example.com`).
/// Most deployments skip this and let a file watcher pick up the change.
fn reload_server(command: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Running reload command: {}", command);

    let status = std::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()?;

    if !status.success() {
        return Err(format!("Reload command failed with status {}", status).into());
    }

    Ok(())
}
