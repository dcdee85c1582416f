mod config_commands;
mod generate_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "framecast",
    version,
    about = "Framecast: images and videos from prompts and reference media"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./framecast.toml and ~/.config/framecast/).
    #[arg(long, global = true, env = "FRAMECAST_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for generated assets (overrides `output.dir`).
    #[arg(long, global = true, env = "FRAMECAST_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a still image from a prompt.
    Image(generate_commands::ImageArgs),
    /// Generate a video.
    Video {
        #[command(subcommand)]
        action: generate_commands::VideoAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

/// Initialise tracing. Logs go to stderr so stdout only carries asset paths.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "framecast starting");

    match cli.command {
        Commands::Image(args) => {
            let ctx = generate_commands::RunContext::load(cli.config.as_deref(), cli.output_dir)?;
            generate_commands::handle_image(args, &ctx).await
        },
        Commands::Video { action } => {
            let ctx = generate_commands::RunContext::load(cli.config.as_deref(), cli.output_dir)?;
            generate_commands::handle_video(action, &ctx).await
        },
        Commands::Config { action } => {
            config_commands::handle_config(action, cli.config.as_deref())
        },
    }
}
