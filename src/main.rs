use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sitemapper::config::{self, ConfigFile, SiteConfig};
use sitemapper::pipeline::Pipeline;
use sitemapper::types::{FileContents, InputFile};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "sitemapper")]
#[command(about = "Generate a sitemap.xml from a built static site")]
#[command(long_about = "\
Generate a sitemap.xml from a built static site

Walks a directory of generated pages and produces one standards-compliant
sitemap document. Per-page metadata comes from sitewide defaults overridden
by glob-matched mapping rules:

  site_url = \"https://www.example.com\"
  changefreq = \"daily\"
  priority = 0.5

  [[mappings]]
  pages = [\"blog/**\", \"!blog/drafts/**\"]
  changefreq = \"weekly\"

index.html files collapse to their directory URL (about/index.html becomes
https://www.example.com/about/), 404 pages are skipped, and with
noindex = true pages carrying a robots noindex meta tag are skipped too.

Run 'sitemapper gen-config' to generate a documented sitemapper.toml.")]
#[command(version)]
struct Cli {
    /// Built site directory to walk
    #[arg(long, default_value = "dist", global = true)]
    source: PathBuf,

    /// Config file (default: <source>/sitemapper.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured site URL
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// Page file extensions to include
    #[arg(long = "ext", default_values = ["html", "htm"], global = true)]
    extensions: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the source directory and write the sitemap into it
    Build,
    /// Run the pipeline without writing, flagging invalid changefreq values
    Check,
    /// Print a stock sitemapper.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let site = load_config(&cli)?;
            let pipeline = run_pipeline(&cli.source, &cli.extensions, site)?;
            let count = pipeline.entries().len();
            match pipeline.finish()? {
                Some(output) => {
                    let dest = cli.source.join(&output.name);
                    fs::write(&dest, &output.contents)?;
                    println!("==> Wrote {} ({count} urls)", dest.display());
                }
                None => println!("==> No pages found in {}", cli.source.display()),
            }
        }
        Command::Check => {
            let site = load_config(&cli)?;
            println!("==> Checking {}", cli.source.display());
            let pipeline = run_pipeline(&cli.source, &cli.extensions, site)?;
            let mut invalid = 0usize;
            for entry in pipeline.entries() {
                if let Some(changefreq) = &entry.changefreq
                    && !config::is_changefreq_valid(changefreq)
                {
                    println!("invalid changefreq {changefreq:?} on {}", entry.loc);
                    invalid += 1;
                }
            }
            let count = pipeline.entries().len();
            if invalid > 0 {
                return Err(format!("{invalid} of {count} urls carry an invalid changefreq").into());
            }
            println!("==> {count} urls, content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the TOML config, apply CLI overrides, and convert it.
///
/// A `--site-url` flag alone is enough to run without any config file.
fn load_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let default_path = cli.source.join("sitemapper.toml");
    let mut file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None if default_path.is_file() => ConfigFile::load(&default_path)?,
        None => ConfigFile::default(),
    };
    if let Some(site_url) = &cli.site_url {
        file.site_url = Some(site_url.clone());
    }
    file.into_site_config()
}

/// Walk the source tree in sorted order and feed every page file through
/// the pipeline. Contents are only read when the noindex check needs them.
fn run_pipeline(
    source: &Path,
    extensions: &[String],
    config: SiteConfig,
) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let read_contents = config.noindex;
    let output_name = config.file_name.clone();
    let mut pipeline = Pipeline::new(config)?;

    for dir_entry in WalkDir::new(source).sort_by_file_name() {
        let dir_entry = dir_entry?;
        if !dir_entry.file_type().is_file() || !has_extension(dir_entry.path(), extensions) {
            continue;
        }
        let relative = dir_entry
            .path()
            .strip_prefix(source)?
            .to_string_lossy()
            .to_string();
        // A previous build's own output must not end up in the sitemap.
        if relative == output_name {
            continue;
        }
        let contents = if read_contents {
            FileContents::Buffered(fs::read(dir_entry.path())?)
        } else {
            FileContents::Empty
        };
        let mtime = dir_entry
            .metadata()?
            .modified()
            .ok()
            .map(DateTime::<Utc>::from);
        pipeline.add(&InputFile {
            relative,
            source: dir_entry.path().to_path_buf(),
            contents,
            mtime,
            is_dir: false,
        })?;
    }
    Ok(pipeline)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
