use clap::{Parser, Subcommand};
use gallery_gen::generate::{self, Capabilities};
use gallery_gen::imaging::{MetadataReader, NullBackend, RustBackend, Thumbnailer};
use gallery_gen::{config, output, scan};
use std::path::PathBuf;
use std::process::ExitCode;

/// Switches for the optional capabilities.
#[derive(clap::Args, Clone, Copy)]
struct CapabilityArgs {
    /// Skip thumbnail generation; every image uses its source as thumbnail
    #[arg(long, global = true)]
    no_thumbnails: bool,

    /// Skip EXIF/IPTC extraction; captions stay empty and dates null
    #[arg(long, global = true)]
    no_metadata: bool,
}

#[derive(Parser)]
#[command(name = "gallery-gen")]
#[command(about = "Builds the gallery manifest and thumbnail cache for a photo portfolio")]
#[command(long_about = "\
Builds the gallery manifest and thumbnail cache for a photo portfolio

Every subdirectory of the galleries root is a collection. Images are listed in
natural order (img2 before img10), thumbnailed into <collection>/thumbs/, and
described in <root>/galleries.json for the browser-side gallery.

Galleries layout:

  galleries/
  ├── config.toml                  # Generator config (optional)
  ├── galleries.json               # Written by this tool
  └── summer-weddings_2024/        # Collection (label: \"summer weddings 2024\")
      ├── metadata.json            # {\"label\": ...} override (optional)
      ├── cover.jpg                # Cover image (else the first image)
      ├── img1.jpg
      └── thumbs/                  # Thumbnail cache, managed by this tool

Captions come from embedded metadata (first non-empty wins):
  EXIF ImageDescription → IPTC Title → IPTC Caption → IPTC Keywords

Run 'gallery-gen gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Galleries root directory
    #[arg(long, env = "GALLERIES_DIR", default_value = "galleries", global = true)]
    root: PathBuf,

    #[command(flatten)]
    capabilities: CapabilityArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Scan, refresh thumbnails and write the manifest (default)
    Generate,
    /// List the collections that would be generated, without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command.unwrap_or(Command::Generate) {
        Command::Generate => {
            let config = config::load_config(&cli.root)?;

            let backend = RustBackend::new();
            let CapabilityArgs {
                no_thumbnails,
                no_metadata,
            } = cli.capabilities;
            let thumbnailer: &dyn Thumbnailer = if no_thumbnails {
                &NullBackend
            } else {
                &backend
            };
            let metadata: &dyn MetadataReader = if no_metadata {
                &NullBackend
            } else {
                &backend
            };

            output::print_capabilities(!no_thumbnails, !no_metadata);
            println!("==> Generating {}", cli.root.display());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_event(&event);
                }
            });
            let result = generate::generate(
                &cli.root,
                &config,
                Capabilities::new(thumbnailer, metadata),
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress output thread panicked")?;

            output::print_summary(&result?);
        }
        Command::Check => {
            config::load_config(&cli.root)?;
            println!("==> Checking {}", cli.root.display());
            let result = scan::scan(&cli.root)?;
            output::print_scan_output(&result);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
