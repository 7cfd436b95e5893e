// trustprobe — Desktop CLI for device trust signals
//
// Evaluates captured device snapshots (or the local machine) with the same
// probes and bridge the mobile bindings use.

mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use trustprobe_core::{
    compose_probe, parse_package_listing, DeviceSnapshot, HostFilesystem, MethodBridge,
    MethodCall, Platform, ProbeConfig, KNOWN_SIGNATURES,
};

#[derive(Parser)]
#[command(name = "trustprobe")]
#[command(
    about = "Device trust signals: mock location and jailbreak heuristics",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full trust signal check
    ///
    /// Without --snapshot the local machine is evaluated with the sandboxed
    /// heuristics. Suspicious-path checks only apply on iOS hosts, since
    /// desktop systems ship those paths.
    Check {
        /// Device snapshot JSON captured by a host app
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        json: bool,
        /// Exit with status 2 when the verdict is mocked
        #[arg(long)]
        fail_on_mock: bool,
    },
    /// Match installed packages against signatures
    Detect {
        /// Signatures to match (built-in set when omitted)
        signatures: Vec<String>,
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
        /// `pm list packages` output to use as the installed package list
        #[arg(short, long)]
        packages: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Send a raw method call through the bridge
    Call {
        method: String,
        /// JSON arguments, e.g. '{"signatures":["fakegps"]}'
        #[arg(short, long)]
        args: Option<String>,
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },
    /// Print the built-in signature set
    Signatures,
    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Set { key: String, value: String },
    Get { key: String },
    List,
    Signature {
        #[command(subcommand)]
        action: SignatureAction,
    },
}

#[derive(Subcommand)]
enum SignatureAction {
    Add { signature: String },
    Remove { signature: String },
    List,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli.log_level, cli.log_json, cli.log_file.as_deref())?;

    let config_path = match cli.config {
        Some(path) => path,
        None => config::Config::config_file()?,
    };
    let config = config::Config::load_from(&config_path)?;

    match cli.command {
        Commands::Check {
            snapshot,
            json,
            fail_on_mock,
        } => return cmd_check(&config, snapshot.as_deref(), json, fail_on_mock),
        Commands::Detect {
            signatures,
            snapshot,
            packages,
            json,
        } => cmd_detect(&config, signatures, snapshot.as_deref(), packages.as_deref(), json),
        Commands::Call {
            method,
            args,
            snapshot,
        } => cmd_call(&config, method, args, snapshot.as_deref()),
        Commands::Signatures => cmd_signatures(&config),
        Commands::Config { action } => cmd_config(config, &config_path, action),
    }?;
    Ok(ExitCode::SUCCESS)
}

fn init_logging(level: &str, json: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path.file_name().context("Log file path has no file name")?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false);
            if json {
                builder.json().init();
            } else {
                builder.init();
            }
            Ok(Some(guard))
        }
        None => {
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr);
            if json {
                builder.json().init();
            } else {
                builder.init();
            }
            Ok(None)
        }
    }
}

fn load_snapshot(path: Option<&Path>) -> Result<DeviceSnapshot> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
            let snapshot = DeviceSnapshot::from_json(&contents)
                .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
            tracing::debug!("Loaded {} snapshot from {}", snapshot.platform, path.display());
            Ok(snapshot)
        }
        None => Ok(DeviceSnapshot::local()),
    }
}

/// Probe settings for a snapshot. The local machine only gets the
/// suspicious-path heuristic when it is itself an iOS device.
fn probe_config_for(config: &config::Config, local: bool) -> ProbeConfig {
    let mut probe = config.probe.clone();
    if local && !cfg!(target_os = "ios") {
        probe.suspicious_paths.clear();
    }
    probe
}

fn bridge_for(
    config: &config::Config,
    snapshot: DeviceSnapshot,
    local: bool,
) -> Result<MethodBridge> {
    let probe = compose_probe(
        snapshot,
        Arc::new(HostFilesystem),
        &probe_config_for(config, local),
    )
    .context("Failed to compose probe")?;
    Ok(MethodBridge::new(probe))
}

fn cmd_check(
    config: &config::Config,
    snapshot: Option<&Path>,
    json: bool,
    fail_on_mock: bool,
) -> Result<ExitCode> {
    let bridge = bridge_for(config, load_snapshot(snapshot)?, snapshot.is_none())?;
    let verdict = bridge.probe().check_trust_signals();

    if json || config.output_json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        render::verdict(&verdict);
    }

    if fail_on_mock && verdict.is_mock {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_detect(
    config: &config::Config,
    signatures: Vec<String>,
    snapshot: Option<&Path>,
    packages: Option<&Path>,
    json: bool,
) -> Result<()> {
    let local = snapshot.is_none() && packages.is_none();
    let mut snapshot = load_snapshot(snapshot)?;
    if let Some(path) = packages {
        let listing = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read package listing {}", path.display()))?;
        snapshot.platform = Platform::Android;
        snapshot.installed_packages = Some(parse_package_listing(&listing));
        snapshot.listing_error = None;
    }

    let signatures = if signatures.is_empty() {
        config.probe.signature_set().iter().map(str::to_string).collect()
    } else {
        signatures
    };

    let bridge = bridge_for(config, snapshot, local)?;
    let result = bridge.probe().detect_known_signature_matches(&signatures);

    if json || config.output_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render::detection(&result);
    }
    Ok(())
}

fn cmd_call(
    config: &config::Config,
    method: String,
    args: Option<String>,
    snapshot: Option<&Path>,
) -> Result<()> {
    let arguments = match args {
        Some(raw) => serde_json::from_str(&raw).context("Arguments must be valid JSON")?,
        None => Value::Null,
    };

    let bridge = bridge_for(config, load_snapshot(snapshot)?, snapshot.is_none())?;
    let response = bridge.handle(&MethodCall::new(method, arguments));
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn cmd_signatures(config: &config::Config) -> Result<()> {
    println!("{}", "Built-in signatures".bold());
    for signature in KNOWN_SIGNATURES.iter() {
        println!("  {}", signature.bright_cyan());
    }

    if !config.probe.extra_signatures.is_empty() {
        println!();
        println!("{}", "Configured extras".bold());
        for signature in &config.probe.extra_signatures {
            println!("  {}", signature.bright_yellow());
        }
    }
    Ok(())
}

fn cmd_config(mut config: config::Config, path: &Path, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            config.save_to(path)?;
            println!("  {} {} = {}", "✓".green(), key, value);
        }
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("Unknown config key: {}", key),
        },
        ConfigAction::List => {
            println!("{}", "Configuration".bold());
            for (key, value) in config.list() {
                println!("  {:<30} {}", key, value.bright_cyan());
            }
            println!();
            println!("  File: {}", path.display());
        }
        ConfigAction::Signature { action } => match action {
            SignatureAction::Add { signature } => {
                if config.add_signature(&signature) {
                    config.save_to(path)?;
                    println!("  {} Added {}", "✓".green(), signature);
                } else {
                    println!("  {} {} already present", "•".yellow(), signature);
                }
            }
            SignatureAction::Remove { signature } => {
                if config.remove_signature(&signature) {
                    config.save_to(path)?;
                    println!("  {} Removed {}", "✓".green(), signature);
                } else {
                    println!("  {} {} not configured", "•".yellow(), signature);
                }
            }
            SignatureAction::List => {
                for signature in &config.probe.extra_signatures {
                    println!("{}", signature);
                }
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_machine_skips_desktop_paths() {
        let config = config::Config::default();
        let local = probe_config_for(&config, true);
        if cfg!(target_os = "ios") {
            assert_eq!(local.suspicious_paths, config.probe.suspicious_paths);
        } else {
            assert!(local.suspicious_paths.is_empty());
        }
        assert_eq!(local.write_probe_path, config.probe.write_probe_path);
    }

    #[test]
    fn test_snapshot_keeps_configured_paths() {
        let config = config::Config::default();
        assert_eq!(probe_config_for(&config, false), config.probe);
    }
}
