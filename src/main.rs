use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pixview::config::{Config, DEFAULT_CONFIG_FILE};
use pixview::navigation::NavigationIndex;
use pixview::observability;
use pixview::plugin::PluginRegistry;
use pixview::session::{EditorSession, Navigation};
use pixview::transform::Transform;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pixview", about = "Browse and edit a directory of images")]
struct Cli {
    /// Configuration file. Missing means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Plugin directory, overriding the configuration.
    #[arg(long)]
    plugins: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List discovered plugin transforms and rejected candidates.
    Plugins,
    /// Print the status line of an image.
    Info {
        /// Image to load.
        image: PathBuf,
    },
    /// Show the sorted siblings of an image and its neighbors.
    Neighbors {
        /// Image whose directory is listed.
        image: PathBuf,
    },
    /// Apply transforms to an image and save the result.
    Edit {
        /// Image to load.
        image: PathBuf,
        /// Transforms to apply, in order.
        #[arg(long = "apply", required = true)]
        transforms: Vec<String>,
        /// Output file. The extension picks the format.
        #[arg(long)]
        output: PathBuf,
    },
    /// Step through the directory starting from an image.
    Browse {
        /// Starting image.
        image: PathBuf,
        /// Direction to move in.
        #[arg(long, value_enum, default_value_t = Step::Next)]
        step: Step,
        /// Number of steps.
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Step {
    Next,
    Previous,
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn discover(cli: &Cli, config: &Config) -> Result<Arc<PluginRegistry>> {
    let dir = match &cli.plugins {
        Some(dir) => dir.clone(),
        None => config.plugin_dir().context("failed to locate plugin directory")?,
    };
    // SAFETY: The plugin directory is chosen by the user running the binary
    // and its modules are trusted.
    let registry = unsafe { PluginRegistry::discover(&dir) };
    Ok(Arc::new(registry))
}

fn open(cli: &Cli, config: &Config, image: &Path) -> Result<EditorSession> {
    let mut session = EditorSession::from_config(config, discover(cli, config)?);
    session
        .load(image)
        .with_context(|| format!("failed to load {}", image.display()))?;
    Ok(session)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("failed to read {}", cli.config.display()))?;
    init_tracing(&config);
    observability::init_metrics();

    match &cli.command {
        Command::Plugins => {
            let registry = discover(&cli, &config)?;
            for transform in registry.transforms() {
                println!(
                    "{:<16} {:<40} {}",
                    transform.name(),
                    transform.description(),
                    transform.origin().display()
                );
            }
            for diagnostic in registry.diagnostics() {
                println!("skipped: {diagnostic}");
            }
            if registry.is_empty() {
                println!("no plugin transforms found");
            }
        }
        Command::Info { image } => {
            let session = open(&cli, &config, image)?;
            if let Some(status) = session.status() {
                println!("{status}");
            }
            println!("transforms: {}", session.transform_names().join(", "));
        }
        Command::Neighbors { image } => {
            let index = NavigationIndex::new();
            for name in index.list_siblings(image)? {
                println!("{name}");
            }
            match index.predecessor(image)?.into_result() {
                Ok(path) => println!("previous: {}", path.display()),
                Err(boundary) => println!("previous: {boundary}"),
            }
            match index.successor(image)?.into_result() {
                Ok(path) => println!("next: {}", path.display()),
                Err(boundary) => println!("next: {boundary}"),
            }
        }
        Command::Edit {
            image,
            transforms,
            output,
        } => {
            let mut session = open(&cli, &config, image)?;
            for name in transforms {
                session
                    .apply_transform(name)
                    .with_context(|| format!("failed to apply {name}"))?;
            }
            session
                .save(output)
                .with_context(|| format!("failed to save {}", output.display()))?;
            if let Some(status) = session.status() {
                println!("{status}");
            }
        }
        Command::Browse { image, step, count } => {
            let mut session = open(&cli, &config, image)?;
            for _ in 0..*count {
                let moved = match step {
                    Step::Next => session.go_to_next()?,
                    Step::Previous => session.go_to_previous()?,
                };
                match moved {
                    Navigation::Moved(_) => {
                        if let Some(status) = session.status() {
                            println!("{status}");
                        }
                    }
                    Navigation::Boundary(notice) => {
                        println!("{notice}");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
