use clap::{Parser, Subcommand};
use notion_press::config::{self, PressConfig};
use notion_press::convert::{self, ConvertError, ConvertRequest};
use notion_press::front_matter::{self, MergePolicy, Overrides};
use notion_press::previews::{self, PreviewConfig};
use notion_press::store::PostStore;
use notion_press::transform::TransformOptions;
use notion_press::{naming, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "notion-press")]
#[command(about = "Turn Notion HTML exports into blog posts")]
#[command(long_about = "\
Turn Notion HTML exports into blog posts

Each export becomes one post file: a YAML front matter block followed by the
page body. Running convert again on the same page updates the post and keeps
the title, tags, date and slug it already had unless new ones are given.

  content/blog/
  └── notion-12677955515e8037be53e7832bb10412.html
      ---
      title: How I built a thermostat
      tags:
      - diy
      date: 2024-05-06T07:08:09.000Z
      draft: false
      ---
      <article>...</article>

With --lazy-images, <img> tags point at blurred previews under
<image dir>/previews/. Generate those with the previews command.

Run 'notion-press gen-config' to generate a documented notion-press.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./notion-press.toml, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Exported Notion page (.html)
    source: PathBuf,

    /// Post key, the output file stem (default: derived from the source name)
    #[arg(long)]
    key: Option<String>,

    /// Post title
    #[arg(long)]
    title: Option<String>,

    /// URL slug
    #[arg(long)]
    slug: Option<String>,

    /// Tag, repeat for several
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Publication date, RFC 3339 (default: kept, or now for new posts)
    #[arg(long)]
    date: Option<String>,

    /// Point images at their blurred previews for lazy loading
    #[arg(long)]
    lazy_images: bool,

    /// Posts directory (overrides [posts].output_dir)
    #[arg(long)]
    out_dir: Option<String>,

    /// Print the post instead of writing it
    #[arg(long)]
    dry_run: bool,
}

#[derive(clap::Args)]
struct PreviewsArgs {
    /// Directory with the page's images
    dir: PathBuf,

    /// Output directory (default: <DIR>/previews)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Preview width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Gaussian blur sigma
    #[arg(long)]
    blur: Option<f32>,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an exported page into a post
    Convert(ConvertArgs),
    /// Generate blurred lazy-load previews for a directory of images
    Previews(PreviewsArgs),
    /// Print a stock notion-press.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Convert(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dir) = &args.out_dir {
                config.posts.output_dir = dir.clone();
            }
            if args.lazy_images {
                config.transform.lazy_load_images = true;
            }
            if let Some(date) = &args.date {
                front_matter::validate_date(date)?;
            }

            let key = match args.key {
                Some(key) => key,
                None => naming::post_key_for(&args.source)
                    .ok_or_else(|| ConvertError::NoKey(args.source.clone()))?,
            };
            let request = ConvertRequest {
                source: args.source,
                key,
                overrides: Overrides {
                    title: args.title,
                    tags: (!args.tags.is_empty()).then_some(args.tags),
                    slug: args.slug,
                    date: args.date,
                },
                transform: TransformOptions::from_config(&config.transform),
                policy: MergePolicy::from_config(&config.front_matter),
                dry_run: args.dry_run,
            };
            let store = PostStore::from_config(&config.posts);

            let report = convert::convert(&request, &store, chrono::Utc::now())?;
            match &report.rendered {
                Some(rendered) => print!("{}", rendered),
                None => output::print_convert_report(&report),
            }
        }
        Command::Previews(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(width) = args.width {
                config.previews.width = width;
            }
            if let Some(blur) = args.blur {
                config.previews.blur = blur;
            }
            config.validate()?;
            init_thread_pool(&config.processing);

            let report = previews::generate_previews(
                &args.dir,
                args.output.as_deref(),
                &PreviewConfig::from_config(&config.previews),
            )?;
            output::print_preview_report(&report);
            if report.failed() > 0 {
                let failed = report.failed();
                return Err(format!("{failed} of {} previews failed", report.outcomes.len()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` or else by `-v` count.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "notion_press=warn",
        1 => "notion_press=info",
        _ => "notion_press=debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the explicit config file, or `notion-press.toml` in the working directory if present.
fn load_config(path: Option<&Path>) -> Result<PressConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) if !path.exists() => {
            Err(format!("config file {} not found", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(config::CONFIG_FILENAME))?),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores; config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
