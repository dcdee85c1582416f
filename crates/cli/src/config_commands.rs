use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    clap::Subcommand,
    framecast_config::{
        FramecastConfig,
        validate::{self, Severity},
    },
    secrecy::Secret,
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML (API key redacted).
    Show,
    /// Print the config file in use, or where one would be created.
    Path,
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Write a default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => show(config_path),
        ConfigAction::Path => {
            let (path, exists) = resolve_path(config_path);
            if exists {
                println!("{}", path.display());
            } else {
                println!("{} (not created)", path.display());
            }
            Ok(())
        },
        ConfigAction::Check { verbose } => check(config_path, verbose),
        ConfigAction::Init { force } => init(config_path, force),
    }
}

fn resolve_path(config_path: Option<&Path>) -> (PathBuf, bool) {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(framecast_config::find_or_default_config_path);
    let exists = path.exists();
    (path, exists)
}

fn show(config_path: Option<&Path>) -> Result<()> {
    let config = framecast_config::load_or_discover(config_path)?;
    print!("{}", render_redacted(&config)?);
    Ok(())
}

fn render_redacted(config: &FramecastConfig) -> Result<String> {
    let mut config = config.clone();
    if config.api.api_key.is_some() {
        config.api.api_key = Some(Secret::new("[REDACTED]".into()));
    }
    toml::to_string_pretty(&config).context("failed to render config")
}

fn init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let (path, exists) = resolve_path(config_path);
    if exists && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    framecast_config::write_default_config(&path)?;
    eprintln!("Wrote {}", path.display());
    Ok(())
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let result = validate::validate(config_path);

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
        }
        shown += 1;
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}
