use clap::Parser;
use photodex::catalog::Catalog;
use photodex::geocode::NullResolver;
use photodex::{derivatives, merge, scan};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Filename pattern for the default scan. Anchored and made
/// case-insensitive before compilation.
const DEFAULT_FILTER: &str = r".+\.(png|jpe?g|tiff?|webp|heic|heif)";

#[derive(Parser)]
#[command(name = "photodex")]
#[command(about = "Content-addressed photo catalog builder")]
#[command(long_about = "\
Content-addressed photo catalog builder

Scans a directory tree for image files and maintains <project>.json, a
catalog of one descriptor per unique photo. Photos are identified by a
hash of their bytes, so renaming or moving files never creates
duplicates and never loses your edits.

Each run re-scans, merges, and regenerates web derivatives into
<project>/: a full-size copy, a size-bounded preview, and an inline
thumbnail. The merge only fills fields that are absent in the catalog —
titles, captions, and tags you add by hand are never overwritten.

Workflow:

  photodex ~/Photos/iceland iceland     # scan + build derivatives
  $EDITOR iceland.json                  # add titles, captions, tags
  photodex ~/Photos/iceland iceland     # safe to re-run any time")]
#[command(version)]
struct Cli {
    /// Directory tree to scan for image files
    image_dir: PathBuf,

    /// Project name: catalog goes to <name>.json, derivatives to <name>/
    project_name: String,

    /// Filename regex for the scan (matched case-insensitively against
    /// the full filename)
    #[arg(short, long, default_value = DEFAULT_FILTER)]
    filter: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let filter = compile_filter(&cli.filter)?;

    let catalog_path = PathBuf::from(format!("{}.json", cli.project_name));
    let catalog = Catalog::load(&catalog_path)?;
    info!(
        path = %catalog_path.display(),
        photos = catalog.photos.len(),
        "loaded catalog"
    );

    let incoming = scan::scan(&cli.image_dir, &filter, &NullResolver)?;
    info!(found = incoming.len(), "described unique photos");

    let mut catalog = merge::merge(catalog, incoming);

    let output_dir = Path::new(&cli.project_name);
    derivatives::generate_derivatives(&mut catalog.photos, output_dir)?;

    catalog.save(&catalog_path)?;
    info!(
        path = %catalog_path.display(),
        photos = catalog.photos.len(),
        "catalog saved"
    );
    info!(
        "edit {} to add titles, captions and tags; re-running is safe",
        catalog_path.display()
    );

    Ok(())
}

/// Anchor the user's filename pattern and make it case-insensitive.
fn compile_filter(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("(?i)^(?:{pattern})$"))
}
