use clap::{Parser, Subcommand};
use seqhub::{config, generate, history, output, scan};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "seqhub")]
#[command(about = "Static catalog generator for SynapSeq sequence repositories")]
#[command(long_about = "\
Static catalog generator for SynapSeq sequence repositories

The repository is the data source. Directories name the category and the
author, .spsq files are the sequences, and @presetlist / @background markers
declare the files a sequence depends on.

Content structure:

  .
  ├── hub.toml                        # Optional config (see gen-config)
  ├── page-template/
  │   ├── base.html                   # {{placeholders}} filled by `page`
  │   ├── style.css                   # Copied to dist/static/
  │   └── main.js
  └── packages/
      └── relax/                      # Category
          ├── presets-calm.spsq       # Preset list (not listed)
          ├── rain.wav                # Background audio
          └── r/                      # First letter of the author
              └── ruanklein/          # Author
                  ├── focus.spsq      # → ruanklein.relax.focus
                  └── focus.png       # Thumbnail (optional)

Every check is fatal: a bad path, an oversized file, a remote or missing
dependency, or a duplicate identifier aborts the run with a non-zero exit.

Run 'seqhub gen-config' to print a documented hub.toml.")]
#[command(version)]
struct Cli {
    /// Content source directory (repository root)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    /// Config file [default: <source>/hub.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate content and write the manifest
    Manifest {
        /// Manifest path [default: <source>/<manifest.file>]
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render the static site from an existing manifest
    Page(PageArgs),
    /// Run both stages: manifest → page
    Build(PageArgs),
    /// Validate content without writing anything
    Check,
    /// Print a stock hub.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct PageArgs {
    /// Manifest path [default: <source>/<manifest.file>]
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Output directory [default: <source>/<page.output_dir>]
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = cli.source;
    let config_path = cli
        .config
        .unwrap_or_else(|| source.join(config::CONFIG_FILENAME));

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Manifest { out } => {
            let config = config::load_config(&config_path)?;
            let out = out.unwrap_or_else(|| source.join(&config.manifest.file));
            build_manifest(&source, &config, &out)?;
        }
        Command::Page(args) => {
            let config = config::load_config(&config_path)?;
            let manifest_path = args
                .manifest
                .unwrap_or_else(|| source.join(&config.manifest.file));
            build_page(&source, &config, &manifest_path, args.output)?;
        }
        Command::Build(args) => {
            let config = config::load_config(&config_path)?;
            let manifest_path = args
                .manifest
                .unwrap_or_else(|| source.join(&config.manifest.file));
            println!("==> Stage 1: Scanning {}", source.display());
            build_manifest(&source, &config, &manifest_path)?;
            println!();
            println!("==> Stage 2: Generating page");
            build_page(&source, &config, &manifest_path, args.output)?;
        }
        Command::Check => {
            let config = config::load_config(&config_path)?;
            println!("==> Checking {}", source.display());
            let history = history::from_config(config.history.source, &source);
            let manifest = scan::scan(&source, &config, history.as_ref())?;
            for line in output::format_entries(&manifest) {
                println!("{}", line);
            }
            println!("==> Content is valid");
        }
    }

    Ok(())
}

fn build_manifest(
    source: &Path,
    config: &config::HubConfig,
    out: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = history::from_config(config.history.source, source);
    let manifest = scan::scan(source, config, history.as_ref())?;
    scan::write_manifest(&manifest, out)?;
    output::print_manifest_output(&manifest);
    println!("==> Manifest written to {}", out.display());
    Ok(())
}

fn build_page(
    source: &Path,
    config: &config::HubConfig,
    manifest_path: &Path,
    output_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let template_dir = source.join(&config.page.template_dir);
    let output_dir = output_dir.unwrap_or_else(|| source.join(&config.page.output_dir));
    let report = generate::generate(manifest_path, source, &template_dir, &output_dir, config)?;
    output::print_page_output(&report);
    println!("==> Site generated at {}", report.output_dir.display());
    Ok(())
}
