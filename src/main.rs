use clap::{Parser, Subcommand};
use pinhaoju::{config, generate, output, scan, widgets};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn version_string() -> &'static str {
    let on_tag = env!("PINHAOJU_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("PINHAOJU_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "pinhaoju")]
#[command(about = "Static site generator for a browser tool collection")]
#[command(long_about = "\
Static site generator for a browser tool collection

Markdown pages become HTML pages. A page mounts an interactive tool by
naming its component tag where the widget should appear.

Content structure:

  docs/
  ├── config.toml                  # Site config: title, nav, sidebar, colors
  ├── index.md                     # Home page (animated background)
  ├── uuid.md                      # → /uuid, contains <UUIDGenerator />
  ├── CHANGELOG.md                 # → /CHANGELOG
  └── public/                      # Copied verbatim to the output root
      ├── favicon.ico
      └── logo.png

Built-in components:
  UUIDGenerator, RandomKey, QRcode, CurrencyConverter, JsonFormatter,
  Base64Converter, ArticleMetadata

Run 'pinhaoju gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "docs", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate content and component references without writing output
    Check {
        /// Print the scan manifest as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// List the registered component names
    Components,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pinhaoju=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let registry = widgets::builtin_registry()?;

            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let report = generate::generate(&manifest, &registry, &cli.source, &cli.output)?;
            output::print_generate_output(&report);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check { json } => {
            let registry = widgets::builtin_registry()?;
            let manifest = scan::scan(&cli.source)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                println!("==> Checking {}", cli.source.display());
                output::print_scan_output(&manifest);
                output::print_check_output(&manifest, &registry);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Components => {
            let registry = widgets::builtin_registry()?;
            output::print_components(&registry);
        }
    }

    Ok(())
}
