use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tripart::builder::TripleBuilder;
use tripart::source::ImageSource;
use tripart::{batch, config, output};

fn version_string() -> &'static str {
    let on_tag = env!("TRIPART_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("TRIPART_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "tripart")]
#[command(about = "Build three-part image messages: full image, preview, info record")]
#[command(long_about = "\
Build three-part image messages: full image, preview, info record

Each input photo becomes three parts, written side by side:

  out/
  ├── dawn.full.jpg       # part 0: image/jpeg, the source bytes untouched
  ├── dawn.preview.jpg    # part 1: image/jpeg+preview, scaled, orientation kept
  └── dawn.info.json      # part 2: application/json+imageSize

The info record holds the size a viewer sees after EXIF rotation:

  {\"orientation\":2,\"width\":4000,\"height\":3000}

Orientation codes: 0 = none, 1 = 180°, 2 = 90°, 3 = 270°.

Logging goes to stderr. RUST_LOG overrides --log-level.
Run 'tripart gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a triple per input and write the parts to a directory
    Build {
        /// Image files, directories of images, or - for stdin
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(long, short, default_value = "out")]
        out: PathBuf,
    },
    /// Show size, orientation and the planned preview without rendering
    Probe {
        /// Image file, or - for stdin
        input: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Command::Build { inputs, out } => {
            let config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);
            let inputs = batch::collect_inputs(&inputs)?;
            let builder = TripleBuilder::new(config.preview_config());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = batch::run_batch(&builder, &inputs, &out, Some(tx))?;
            printer
                .join()
                .map_err(|_| "output printer thread panicked")?;
            output::print_batch_summary(&summary);

            if summary.failed > 0 {
                return Err(format!(
                    "{} of {} inputs failed",
                    summary.failed,
                    summary.failed + summary.built
                )
                .into());
            }
        }
        Command::Probe { input } => {
            let config = config::load_config(cli.config.as_deref())?;
            let builder = TripleBuilder::new(config.preview_config());

            let (label, source) = probe_source(&input);
            let data = source.read_all()?;
            let plan = builder.plan(&data)?;
            let info = plan.info().to_json()?;
            output::print_probe_output(&label, &plan, &info);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn probe_source(input: &Path) -> (String, ImageSource) {
    if input.as_os_str() == "-" {
        (
            "<stdin>".to_string(),
            ImageSource::from_reader(std::io::stdin(), None),
        )
    } else {
        (input.display().to_string(), ImageSource::from_path(input))
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--log-level`.
fn setup_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
