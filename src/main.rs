use clap::{Parser, Subcommand};
use folio::{config, generate, output, routes, scan};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("FOLIO_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("FOLIO_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static site generator for personal sites")]
#[command(long_about = "\
Static site generator for personal sites

Your filesystem is the data source. Numbered files become pages in the
menu, TOML files describe structured pages, and directories of images
become photo galleries.

Content structure:

  content/
  ├── config.toml          # Site, SEO, nav, redirects, colours (optional)
  ├── assets/              # Copied verbatim to the output root
  ├── index.md             # Home page (/)
  ├── 010-about.md         # Markdown page (numbered = shown in nav)
  ├── 020-projects.toml    # kind = \"projects\": card grid
  ├── 030-photos/          # Gallery, images ordered by number
  ├── 040-uses.toml        # kind = \"uses\": sections of tools
  ├── 050-github.md        # URL-only .md → external nav link
  └── thank-you.md         # No number = generated, hidden from nav

Title resolution (first available wins):
  front matter title → first '# heading' → filename (010-about.md → \"about\")

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".folio-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan content directory into a manifest
    Scan,
    /// Produce the HTML site from the manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate content directory without building
    Check,
    /// Show how a request path resolves on the deployed site
    Route {
        /// Request path, e.g. /blog/hello
        path: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let summary = generate::generate(&manifest_path, &cli.source, &cli.output)?;
            output::print_generate_output(&summary);
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let summary = generate::generate_site(&manifest, &cli.source, &cli.output)?;
            output::print_generate_output(&summary);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            println!("==> Content is valid");
        }
        Command::Route { path } => {
            let manifest = scan::scan(&cli.source)?;
            let table = manifest.config.route_table()?;
            let page_paths: Vec<String> = manifest
                .pages
                .iter()
                .filter(|p| !p.is_link())
                .map(|p| p.url_path())
                .collect();
            let result = routes::lookup(&table, page_paths.iter().map(String::as_str), &path);
            output::print_lookup(&path, &result);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn write_manifest(manifest: &scan::Manifest, temp_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(temp_dir.join("manifest.json"), json)?;
    Ok(())
}
