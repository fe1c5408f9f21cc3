use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use watermarker::{
    Config,
    batch::{BatchEvent, BatchJob},
    preflight,
    watermark::{Compositor, Position, WatermarkKind},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "watermarker.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark every image in a directory, writing `<name>_wm.jpg` copies
    Apply {
        #[command(flatten)]
        watermark: WatermarkArgs,

        /// Skip files that are outputs of an earlier run
        #[arg(long)]
        skip_watermarked: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Watermark only the first image and write the result to a separate file
    Preview {
        #[command(flatten)]
        watermark: WatermarkArgs,

        #[arg(short, long, default_value = "watermark_preview.jpg")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct WatermarkArgs {
    /// Directory containing the images
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Text watermark; `{year}` expands to the current year
    #[arg(long, conflicts_with = "image")]
    text: Option<String>,

    /// Image file used as watermark
    #[arg(long)]
    image: Option<PathBuf>,

    /// top_left, top_right, bottom_left, bottom_right or center
    #[arg(short, long)]
    position: Option<String>,

    /// Opacity in percent (10-100)
    #[arg(long)]
    opacity: Option<u8>,

    /// Font size for text watermarks (12-100)
    #[arg(long)]
    font_size: Option<u32>,

    /// JPEG quality of the written files
    #[arg(long)]
    quality: Option<u8>,
}

impl WatermarkArgs {
    /// Command line values take precedence over the config file
    fn apply_to(&self, config: &mut Config) {
        if let Some(text) = &self.text {
            config.watermark.kind = WatermarkKind::Text;
            config.watermark.text = text.clone();
        }
        if let Some(image) = &self.image {
            config.watermark.kind = WatermarkKind::Image;
            config.watermark.image = Some(image.clone());
        }
        if let Some(position) = &self.position {
            config.watermark.position = Position::from(position.as_str());
        }
        if let Some(opacity) = self.opacity {
            config.watermark.opacity = opacity;
        }
        if let Some(font_size) = self.font_size {
            config.watermark.font_size = font_size;
        }
        if let Some(quality) = self.quality {
            config.output.jpeg_quality = quality;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Apply {
            watermark,
            skip_watermarked,
            json,
        } => {
            watermark.apply_to(&mut config);
            config.output.skip_watermarked |= skip_watermarked;
            run_batch(config, watermark.dir, json).await
        }
        Commands::Preview { watermark, output } => {
            watermark.apply_to(&mut config);
            run_preview(config, watermark.dir, output).await
        }
    }
}

async fn run_batch(
    config: Config,
    directory: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (spec, files) = match preflight::preflight(
        directory.as_deref(),
        &config.watermark,
        config.output.skip_watermarked,
    ) {
        Ok(checked) => checked,
        Err(e) => {
            error!("Preflight check failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let job = BatchJob::new(spec, files)
        .with_fonts(config.fonts.loader())
        .with_jpeg_quality(config.output.jpeg_quality);

    let (handle, mut events) = job.spawn();

    while let Some(event) = events.recv().await {
        if let BatchEvent::FileStarted { path, .. } = &event {
            info!(
                "[{:>3.0}%] Processing {}",
                event.progress_percent(),
                path.display()
            );
        }
    }

    let summary = handle.await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.report());
    }

    if !summary.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

async fn run_preview(
    config: Config,
    directory: Option<PathBuf>,
    output: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let (spec, files) =
        match preflight::preflight(directory.as_deref(), &config.watermark, false) {
            Ok(checked) => checked,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };

    let source = files.first().cloned().ok_or("No image files found")?;
    let fonts = config.fonts.loader();
    let quality = config.output.jpeg_quality;
    let destination = output.clone();

    tokio::task::spawn_blocking(move || -> Result<(), watermarker::watermark::WatermarkError> {
        let compositor = Compositor::prepare(spec, &fonts, quality)?;
        compositor.process_file_to(&source, &destination)
    })
    .await??;

    println!("Preview written to {}", output.display());
    Ok(())
}
