//! netopt - network optimization tool
//!
//! Binary entry point for the netopt CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use clap::CommandFactory;
use netopt::cli::{Cli, Commands, ConfigAction, OutputFormat};
use netopt::config::{ConfigLoader, Settings};
use netopt::error::{Error, Result};
use netopt::net::elevation::{ensure_elevated, Elevation};
use netopt::net::{find_profile, NetworkUtils, DNS_PROFILES};
use netopt::tui::App;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// The interactive window owns the terminal, so it logs to a file instead
/// of stderr.
fn setup_logging(verbose: bool, quiet: bool, interactive: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_file = if interactive {
        let path = ConfigLoader::log_path();
        path.parent()
            .map(std::fs::create_dir_all)
            .transpose()
            .ok()
            .and_then(|_| {
                std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .ok()
            })
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(filter);
    match log_file {
        Some(file) => registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        None if interactive => registry.init(),
        None => registry
            .with(fmt::layer().without_time().with_writer(std::io::stderr))
            .init(),
    }
}

/// Load settings and apply command-line overrides.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = ConfigLoader::load(cli.config.as_deref())?;
    if let Some(interface) = &cli.interface {
        settings.interface.clone_from(interface);
    }
    settings.validate()?;
    Ok(settings)
}

/// Commands that change system settings and therefore need elevation.
fn needs_elevation(command: Option<&Commands>) -> bool {
    matches!(
        command,
        None | Some(
            Commands::Interactive
                | Commands::Activate { .. }
                | Commands::Deactivate
                | Commands::Mtu { .. }
        )
    )
}

/// Print a serializable value as JSON, or the text fallback.
fn emit<T: serde::Serialize>(format: OutputFormat, value: &T, text: &str) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => println!("{text}"),
    }
    Ok(())
}

fn run_profiles(format: OutputFormat) -> Result<()> {
    let mut text = format!("{:<4} {:<20} {:<18} {:<18}\n", "#", "Name", "Primary", "Secondary");
    text.push_str(&"-".repeat(62));
    for (idx, p) in DNS_PROFILES.iter().enumerate() {
        text.push_str(&format!(
            "\n{:<4} {:<20} {:<18} {:<18}",
            idx + 1,
            p.name,
            p.primary,
            p.secondary
        ));
    }
    emit(format, &DNS_PROFILES, &text)
}

fn run_config(action: ConfigAction, settings: &Settings, format: OutputFormat) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let json = serde_json::to_string_pretty(settings)?;
            emit(format, settings, &json)
        }
        ConfigAction::Init { output } => {
            let path = output.unwrap_or_else(ConfigLoader::default_path);
            ConfigLoader::write_defaults(&path)?;
            println!("Wrote default settings to {}", path.display());
            Ok(())
        }
    }
}

async fn run_command(cli: Cli, settings: Settings) -> Result<()> {
    let format = cli.format;
    let utils = NetworkUtils::system(&settings)?;

    match cli.command {
        None | Some(Commands::Interactive) => {
            let mut app = App::new(utils, settings);
            app.run().await?;
        }

        Some(Commands::Activate { profile }) => {
            let name = profile.unwrap_or_else(|| settings.default_profile.clone());
            let profile = find_profile(&name)
                .ok_or_else(|| Error::config(format!("unknown DNS profile: {name}")))?;
            utils
                .change_dns(profile.primary, profile.secondary, &settings.interface)
                .await?;
            tracing::info!(target: "netopt::changes", "Activated with DNS: {}", profile.name);
            println!("Active: {} on {}", profile.name, settings.interface);
        }

        Some(Commands::Deactivate) => {
            utils.change_dns("", "", &settings.interface).await?;
            tracing::info!(target: "netopt::changes", "Deactivated");
            println!("Inactive: DNS cleared on {}", settings.interface);
        }

        Some(Commands::Mtu { mtu }) => {
            let mtu = mtu.unwrap_or(settings.mtu);
            let mut checked = settings.clone();
            checked.mtu = mtu;
            checked.validate()?;
            utils.set_adapter_settings(&settings.interface, mtu).await?;
            tracing::info!(target: "netopt::changes", "MTU set to {mtu} on {}", settings.interface);
            println!("MTU {mtu} applied to {}", settings.interface);
        }

        Some(Commands::Ping { host }) => {
            let host = host.unwrap_or_else(|| settings.ping_host.clone());
            let result = utils.check_ping(&host).await;
            emit(
                format,
                &serde_json::json!({ "host": host, "result": result }),
                &format!("Ping {host}: {result}"),
            )?;
        }

        Some(Commands::Stats) => {
            let stats = utils.get_network_stats();
            emit(format, &stats, &stats.label())?;
        }

        Some(Commands::Speed) => {
            println!("Running speed test...");
            let report = utils.run_speed_test().await?;
            emit(format, &report, &report.summary())?;
        }

        Some(Commands::Optimize) => {
            utils.optimize_traffic().await?;
            println!("Network optimization complete.");
        }

        Some(Commands::Profiles) => run_profiles(format)?,

        Some(Commands::Config { action }) => run_config(action, &settings, format)?,

        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "netopt", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Main entry point for the netopt CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = netopt::cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Interactive));
    setup_logging(cli.verbose, cli.quiet, interactive);

    tracing::info!("netopt starting...");

    if !cli.no_elevate && needs_elevation(cli.command.as_ref()) {
        if let Elevation::Relaunched = ensure_elevated(cli.elevated)? {
            // The elevated copy carries on; its exit status is not propagated
            return Ok(());
        }
    }

    let settings = load_settings(&cli)?;
    run_command(cli, settings).await
}
