use std::path::{Path, PathBuf};

use {
    anyhow::{Context, Result},
    clap::{Args, Subcommand},
    framecast_config::{
        FramecastConfig, ImageConfig, VideoConfig,
        validate::{self, Severity},
    },
    framecast_generate::{
        AspectRatio, GeminiProvider, GenerateImageParams, GenerateVideoParams, GenerationMode,
        ImageFile, PollConfig, Resolution, Studio, StudioEvent, VideoHandle,
    },
    framecast_media::{load_image, load_sidecar, save_asset, save_sidecar},
    tracing::info,
};

#[derive(Args)]
pub struct ImageArgs {
    /// What to draw.
    #[arg(short, long)]
    pub prompt: String,
    /// 16:9, 9:16, 1:1, 4:3 or 3:4.
    #[arg(long)]
    pub aspect_ratio: Option<AspectRatio>,
    #[arg(long)]
    pub model: Option<String>,
    /// `image/jpeg` or `image/png`.
    #[arg(long)]
    pub output_mime_type: Option<String>,
}

/// Settings shared by every video mode. Unset values come from `[video]`.
#[derive(Args, Default)]
pub struct VideoOptions {
    /// 16:9 or 9:16.
    #[arg(long)]
    pub aspect_ratio: Option<AspectRatio>,
    /// 720p or 1080p.
    #[arg(long)]
    pub resolution: Option<Resolution>,
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum VideoAction {
    /// Video from a prompt alone.
    Text {
        #[arg(short, long)]
        prompt: String,
        #[command(flatten)]
        options: VideoOptions,
    },
    /// Video that starts (and optionally ends) on the given frames.
    Frames {
        #[arg(long)]
        start: PathBuf,
        #[arg(long, conflicts_with = "looping")]
        end: Option<PathBuf>,
        /// End on the start frame.
        #[arg(long = "loop")]
        looping: bool,
        #[arg(short, long)]
        prompt: Option<String>,
        #[command(flatten)]
        options: VideoOptions,
    },
    /// Video that keeps the subjects of up to three asset images.
    References {
        #[arg(short, long)]
        prompt: String,
        /// Asset image; repeat for more (max 3).
        #[arg(long = "asset", required = true)]
        assets: Vec<PathBuf>,
        /// Image whose look the video should follow.
        #[arg(long)]
        style: Option<PathBuf>,
        #[command(flatten)]
        options: VideoOptions,
    },
    /// Continue a previously generated video.
    Extend {
        /// Video or handle sidecar written by an earlier run.
        #[arg(long, required_unless_present = "video_uri", conflicts_with = "video_uri")]
        from: Option<PathBuf>,
        /// Remote video URI, for handles not saved by framecast.
        #[arg(long)]
        video_uri: Option<String>,
        #[arg(short, long)]
        prompt: Option<String>,
        #[command(flatten)]
        options: VideoOptions,
    },
}

/// Loaded config plus CLI overrides.
pub struct RunContext {
    pub config: FramecastConfig,
    pub output_dir: PathBuf,
}

impl RunContext {
    pub fn load(config_path: Option<&Path>, output_dir: Option<PathBuf>) -> Result<Self> {
        let config = framecast_config::load_or_discover(config_path).with_context(|| {
            format!(
                "failed to load config{}",
                config_path
                    .map(|p| format!(" from {}", p.display()))
                    .unwrap_or_default()
            )
        })?;

        let problems: Vec<String> = validate::validate_config(&config)
            .diagnostics
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("{}: {}", d.path, d.message))
            .collect();
        if !problems.is_empty() {
            anyhow::bail!(
                "invalid configuration ({}); run `framecast config check`",
                problems.join("; ")
            );
        }

        let output_dir = output_dir.unwrap_or_else(|| config.output.dir.clone());
        Ok(Self { config, output_dir })
    }

    fn studio(&self) -> Studio<GeminiProvider> {
        Studio::new(
            GeminiProvider::from_config(&self.config.api),
            PollConfig::from(&self.config.polling),
        )
    }
}

pub async fn handle_image(args: ImageArgs, ctx: &RunContext) -> Result<()> {
    let params = image_params(args, &ctx.config.image)?;
    let output = ctx.studio().generate_image(&params).await?;

    let path = save_asset(&ctx.output_dir, &params.prompt, &output.data, &output.mime_type).await?;
    info!(path = %path.display(), "image saved");
    println!("{}", path.display());
    Ok(())
}

pub async fn handle_video(action: VideoAction, ctx: &RunContext) -> Result<()> {
    let params = video_params(action, &ctx.config.video).await?;
    let stem = params
        .prompt_text()
        .map(str::to_owned)
        .unwrap_or_else(|| params.mode.to_string());

    let output = ctx
        .studio()
        .generate_video_with_progress(params, report_progress)
        .await?;

    let path = save_asset(&ctx.output_dir, &stem, &output.data, &output.mime_type).await?;
    let sidecar = save_sidecar(&path, &output.handle).await?;
    info!(path = %path.display(), handle = %sidecar.display(), "video saved");
    println!("{}", path.display());
    Ok(())
}

fn report_progress(event: StudioEvent) {
    match event {
        StudioEvent::Submitted { operation } => eprintln!("Submitted {operation}"),
        StudioEvent::Polling { attempt } => eprintln!("Generating... (check {attempt})"),
        StudioEvent::Downloading { .. } => eprintln!("Downloading video"),
        StudioEvent::Finished => {},
    }
}

fn image_params(args: ImageArgs, defaults: &ImageConfig) -> Result<GenerateImageParams> {
    let aspect_ratio = match args.aspect_ratio {
        Some(ratio) => ratio,
        None => defaults
            .aspect_ratio
            .parse()
            .context("invalid image.aspect_ratio in config")?,
    };
    Ok(GenerateImageParams {
        prompt: args.prompt,
        model: args.model.unwrap_or_else(|| defaults.model.clone()),
        aspect_ratio,
        output_mime_type: args
            .output_mime_type
            .unwrap_or_else(|| defaults.output_mime_type.clone()),
    })
}

async fn video_params(action: VideoAction, defaults: &VideoConfig) -> Result<GenerateVideoParams> {
    let (mut params, options) = match action {
        VideoAction::Text { prompt, options } => (
            GenerateVideoParams {
                mode: GenerationMode::TextToVideo,
                prompt,
                ..Default::default()
            },
            options,
        ),
        VideoAction::Frames {
            start,
            end,
            looping,
            prompt,
            options,
        } => {
            let end_frame = match end {
                Some(path) => Some(load_frame(&path).await?),
                None => None,
            };
            (
                GenerateVideoParams {
                    mode: GenerationMode::FramesToVideo,
                    prompt: prompt.unwrap_or_default(),
                    start_frame: Some(load_frame(&start).await?),
                    end_frame,
                    is_looping: looping,
                    ..Default::default()
                },
                options,
            )
        },
        VideoAction::References {
            prompt,
            assets,
            style,
            options,
        } => {
            let mut reference_images = Vec::with_capacity(assets.len());
            for path in &assets {
                reference_images.push(load_frame(path).await?);
            }
            let style_image = match style {
                Some(path) => Some(load_frame(&path).await?),
                None => None,
            };
            (
                GenerateVideoParams {
                    mode: GenerationMode::ReferencesToVideo,
                    prompt,
                    reference_images,
                    style_image,
                    ..Default::default()
                },
                options,
            )
        },
        VideoAction::Extend {
            from,
            video_uri,
            prompt,
            options,
        } => {
            let handle = match (from, video_uri) {
                (Some(path), _) => load_sidecar::<VideoHandle>(&path)
                    .await
                    .with_context(|| format!("failed to read video handle for {}", path.display()))?,
                (None, Some(uri)) => VideoHandle::new(uri),
                (None, None) => anyhow::bail!("--from or --video-uri is required"),
            };
            (
                GenerateVideoParams {
                    mode: GenerationMode::ExtendVideo,
                    prompt: prompt.unwrap_or_default(),
                    input_video: Some(handle),
                    ..Default::default()
                },
                options,
            )
        },
    };

    params.model = options.model.unwrap_or_else(|| defaults.model.clone());
    params.aspect_ratio = match options.aspect_ratio {
        Some(ratio) => ratio,
        None => defaults
            .aspect_ratio
            .parse()
            .context("invalid video.aspect_ratio in config")?,
    };
    params.resolution = match options.resolution {
        Some(resolution) => resolution,
        None => defaults
            .resolution
            .parse()
            .context("invalid video.resolution in config")?,
    };
    Ok(params)
}

async fn load_frame(path: &Path) -> Result<ImageFile> {
    let loaded = load_image(path).await?;
    Ok(ImageFile::new(loaded.data, loaded.mime_type))
}
