use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vaultfill_secrets::{ProcessEnv, Resolution, VaultCli};

mod config;
mod format;

use config::{Settings, DEFAULT_INPUT, DEFAULT_OUTPUT};
use format::Format;

/// Environment variable naming the vault executable
const VAULT_EXE_VAR: &str = "VAULT_EXE";

/// Exit status when `--strict` is set and a secret lookup failed
const EXIT_LOOKUP_FAILED: i32 = 2;

/// vaultfill - Fill Vault secrets and environment variables into config files
#[derive(Parser, Debug)]
#[command(name = "vaultfill", version)]
#[command(about = "Resolve Vault secret paths and $ENV references in a YAML/JSON/TOML document")]
struct Cli {
    /// Document to resolve (defaults to the settings file, then ./gateway/automate/gw-ssl-vault.yaml)
    input: Option<PathBuf>,

    /// Where to write the resolved document, '-' for stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (defaults to the output file extension)
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Path to the vault executable (overrides VAULT_EXE)
    #[arg(long)]
    vault_exe: Option<String>,

    /// Settings file (defaults to ~/.config/vaultfill/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Exit with status 2 if any secret lookup failed
    #[arg(long)]
    strict: bool,

    /// Do not load a .env file from the working directory
    #[arg(long)]
    no_dotenv: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Run options after merging CLI args, environment and settings file
#[derive(Debug)]
struct RunOptions {
    vault_exe: PathBuf,
    input: PathBuf,
    output: PathBuf,
    format: Format,
}

impl RunOptions {
    /// Resolve options: CLI first, then environment, then settings file, then defaults
    fn resolve(cli: &Cli, settings: &Settings) -> Result<Self> {
        let vault_exe = match cli
            .vault_exe
            .clone()
            .or_else(|| std::env::var(VAULT_EXE_VAR).ok().filter(|v| !v.is_empty()))
        {
            Some(raw) => config::expand_path(&raw)?,
            None => settings
                .vault_exe_expanded()?
                .ok_or(VaultExeMissing)?,
        };

        let input = cli
            .input
            .clone()
            .or_else(|| settings.input.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

        let output = cli
            .output
            .clone()
            .or_else(|| settings.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let format = cli
            .format
            .or(settings.output_format)
            .unwrap_or_else(|| Format::from_path(&output));

        Ok(Self {
            vault_exe,
            input,
            output,
            format,
        })
    }
}

/// No vault executable configured anywhere
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
#[error("VAULT_EXE environment variable not set")]
#[diagnostic(
    code(vaultfill::config::vault_exe_missing),
    severity(error),
    help("Set VAULT_EXE (or add it to .env), pass --vault-exe, or set vault_exe in the settings file")
)]
struct VaultExeMissing;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    if !cli.no_dotenv {
        load_dotenv();
    }

    let settings = Settings::load_or_default(cli.config.as_deref())?;

    let options = match RunOptions::resolve(&cli, &settings) {
        Ok(options) => options,
        Err(e) => match e.downcast::<VaultExeMissing>() {
            Ok(missing) => {
                eprintln!("{:?}", miette::Report::new(missing));
                std::process::exit(1);
            }
            Err(e) => return Err(e),
        },
    };

    let resolution = run(&options)?;

    if cli.strict && !resolution.is_clean() {
        tracing::error!(
            "{} secret lookup(s) failed, exiting with status {}",
            resolution.failures.len(),
            EXIT_LOOKUP_FAILED
        );
        std::process::exit(EXIT_LOOKUP_FAILED);
    }

    Ok(())
}

/// Read, resolve and write one document
fn run(options: &RunOptions) -> Result<Resolution> {
    tracing::info!("Loading config from '{}'...", options.input.display());
    let document = format::read_document(&options.input)?;

    tracing::info!("Resolving Vault secrets and environment variables...");
    let vault = VaultCli::new(&options.vault_exe);
    tracing::debug!("Using vault executable '{}'", vault.exe().display());
    let resolution = vaultfill_secrets::resolve(&document, &vault, &ProcessEnv);

    if !resolution.is_clean() {
        tracing::warn!(
            "{} secret lookup(s) failed, original text kept for: {}",
            resolution.failures.len(),
            resolution
                .failures
                .iter()
                .map(|f| f.reference.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    tracing::info!("Writing resolved config to '{}'...", display_output(&options.output));
    format::write_document(&resolution.document, &options.output, options.format)?;

    tracing::info!("Done.");
    Ok(resolution)
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("vaultfill={}", level).parse()?)
                .add_directive(format!("vaultfill_secrets={}", level).parse()?),
        )
        .init();

    Ok(())
}

/// Load `.env` from the working directory, if there is one
fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring .env file: {}", e),
    }
}

fn display_output(path: &Path) -> String {
    if path == Path::new("-") {
        "stdout".to_string()
    } else {
        path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vaultfill").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_flag_wins_over_settings() {
        let settings = Settings {
            vault_exe: Some("/from/settings/vault".to_string()),
            input: Some(PathBuf::from("settings.yaml")),
            output: Some(PathBuf::from("settings-out.json")),
            output_format: None,
        };
        let cli = cli(&["--vault-exe", "/from/cli/vault", "in.yaml", "-o", "out.toml"]);

        let options = RunOptions::resolve(&cli, &settings).unwrap();

        assert_eq!(options.vault_exe, PathBuf::from("/from/cli/vault"));
        assert_eq!(options.input, PathBuf::from("in.yaml"));
        assert_eq!(options.output, PathBuf::from("out.toml"));
        assert_eq!(options.format, Format::Toml);
    }

    #[test]
    fn test_settings_fill_gaps() {
        let settings = Settings {
            output: Some(PathBuf::from("resolved.json")),
            ..Default::default()
        };
        let cli = cli(&["--vault-exe", "vault", "--format", "yaml"]);

        let options = RunOptions::resolve(&cli, &settings).unwrap();

        assert_eq!(options.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(options.output, PathBuf::from("resolved.json"));
        assert_eq!(options.format, Format::Yaml);
    }

    #[test]
    fn test_defaults() {
        let cli = cli(&["--vault-exe", "vault"]);
        let options = RunOptions::resolve(&cli, &Settings::default()).unwrap();
        assert_eq!(options.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(options.format, Format::Yaml);
    }

    #[test]
    fn test_display_output() {
        assert_eq!(display_output(Path::new("-")), "stdout");
        assert_eq!(display_output(Path::new("out.yaml")), "out.yaml");
    }

    #[test]
    fn test_run_resolves_env_and_literals() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.yaml");
        let output = dir.path().join("out.json");
        std::fs::write(&input, "port: $VAULTFILL_MAIN_TEST_PORT\nname: gateway\n").unwrap();
        std::env::set_var("VAULTFILL_MAIN_TEST_PORT", "8001");

        let options = RunOptions {
            vault_exe: PathBuf::from("/definitely/not/a/real/vault"),
            input,
            output: output.clone(),
            format: Format::Json,
        };
        let resolution = run(&options).unwrap();
        std::env::remove_var("VAULTFILL_MAIN_TEST_PORT");

        assert!(resolution.is_clean());
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"port": 8001, "name": "gateway"}));
    }
}
