use anyhow::{Context, Result};
use avatar_generator::app::App;
use avatar_generator::composer::compose_avatar;
use avatar_generator::config::{self, Config};
use avatar_generator::models::{InputImage, Mode};
use avatar_generator::vocabulary::FeatureVocabulary;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "avatar-generator")]
#[command(about = "Generate minimalist avatars or Ghibli-style portraits")]
struct CliArgs {
    /// Directory generated images are written to.
    #[arg(long, global = true, default_value = "output")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a random Notion Faces style avatar.
    Avatar {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Repaint a photo in the Studio Ghibli style.
    Transform {
        /// Path to a photo, or a base64 `data:` URL.
        #[arg(long, value_name = "PATH|DATA_URL")]
        input: String,
    },
    /// Print a composed avatar prompt without calling the model.
    Prompt {
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_input(input: &str) -> avatar_generator::Result<InputImage> {
    if input.trim_start().starts_with("data:") {
        InputImage::from_data_url(input)
    } else {
        InputImage::from_path(Path::new(input))
    }
}

fn print_prompt(seed: Option<u64>) -> Result<()> {
    let vocabulary_path = config::vocabulary_path_from_env();
    let vocabulary = FeatureVocabulary::from_optional_path(vocabulary_path.as_deref())?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("{}", compose_avatar(&vocabulary, &mut rng).text);
    Ok(())
}

async fn generate(args: CliArgs) -> Result<()> {
    let (mode, input, seed) = match args.command {
        Command::Avatar { seed } => (Mode::RandomAvatar, None, seed),
        Command::Transform { input } => (
            Mode::StyleTransform,
            Some(parse_input(&input).context("Failed to read input image")?),
            None,
        ),
        Command::Prompt { seed } => return print_prompt(seed),
    };

    let config = Config::from_env()?;
    let app = App::from_config(&config, seed)?;

    let image = app.generate(mode, input).await?;
    let path = image
        .save_to(&args.output_dir)
        .with_context(|| format!("Failed to write image to {}", args.output_dir.display()))?;

    info!("Saved {} image to {}", mode, path.display());
    println!("{}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "avatar_generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match generate(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Generation failed: {:#}", e);
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
