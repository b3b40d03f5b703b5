mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use coview_cache::MetadataCache;
use coview_config::Config;
use coview_library::Context;
use coview_library::catalog::{CatalogEvent, catalog, list_archives};
use coview_library::import::import_archive;
use coview_library::read::{copy_entry, list_entries};
use coview_storage::BackendHandle;
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coview", version, about = "Catalog and page through a directory of image archives")]
struct Cli {
    /// Config file (TOML, YAML or JSON).
    #[arg(short, long, env = "COVIEW_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a JSON summary of every archive, in natural name order.
    List,
    /// Catalog the directory, logging each archive as it completes.
    Scan,
    /// List the pages of an archive, in reading order.
    Pages {
        /// Archive file name within the watched directory.
        archive: String,
    },
    /// Write one archive entry to a file or to stdout.
    Extract {
        archive: String,
        /// Full path of the entry inside the archive.
        entry: String,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Copy an archive into the watched directory.
    Upload {
        file: PathBuf,
        /// Store under this name instead of the file's own.
        #[arg(long)]
        name: Option<String>,
    },
    /// Inspect or maintain the metadata cache.
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Print record count and size as JSON.
    Stats,
    /// Remove every cache record.
    Clear,
    /// Drop the record for one archive.
    Invalidate { archive: String },
}

struct Library {
    backend: BackendHandle,
    cache: MetadataCache,
    ctx: Context,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "coview=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Command::List => {
            let library = open_library(&config).await?;
            let summaries = list_archives(&library.backend, &library.cache, &library.ctx)
                .await
                .or_raise(|| ErrorKind::Library)?;
            print_json(&summaries)
        },
        Command::Scan => {
            let library = open_library(&config).await?;
            scan(&library).await
        },
        Command::Pages { archive } => {
            let library = open_library(&config).await?;
            let entries = list_entries(&library.backend, &library.ctx, &archive).await.or_raise(|| ErrorKind::Library)?;
            let mut stdout = std::io::stdout().lock();
            for entry in entries {
                writeln!(stdout, "{entry}").or_raise(|| ErrorKind::Output)?;
            }
            Ok(())
        },
        Command::Extract { archive, entry, output } => {
            let library = open_library(&config).await?;
            let written = match output {
                Some(path) => {
                    let file = tokio::fs::File::create(&path).await.or_raise(|| ErrorKind::Output)?.into_std().await;
                    let (_, written) =
                        copy_entry(&library.backend, &archive, &entry, file).await.or_raise(|| ErrorKind::Library)?;
                    written
                },
                None => {
                    let (mut stdout, written) = copy_entry(&library.backend, &archive, &entry, std::io::stdout())
                        .await
                        .or_raise(|| ErrorKind::Library)?;
                    stdout.flush().or_raise(|| ErrorKind::Output)?;
                    written
                },
            };
            tracing::debug!(%archive, %entry, written, "Extracted entry");
            Ok(())
        },
        Command::Upload { file, name } => {
            let library = open_library(&config).await?;
            let name = match name {
                Some(name) => name,
                None => file_name(&file)?,
            };
            let mut source = tokio::fs::File::open(&file).await.or_raise(|| ErrorKind::Input)?;
            let imported = import_archive(&library.backend, &library.cache, &library.ctx, &name, &mut source)
                .await
                .or_raise(|| ErrorKind::Library)?;
            if imported.stored {
                println!("{} ({} bytes)", imported.name, imported.bytes);
            } else {
                println!("{} not stored, directory is read-only", imported.name);
            }
            Ok(())
        },
        Command::Cache { command } => {
            let cache = open_cache(&config).await;
            match command {
                CacheCommand::Stats => print_json(&cache.stats().await.or_raise(|| ErrorKind::Cache)?),
                CacheCommand::Clear => {
                    let removed = cache.clear().await.or_raise(|| ErrorKind::Cache)?;
                    println!("Removed {removed} cache records");
                    Ok(())
                },
                CacheCommand::Invalidate { archive } => {
                    cache.invalidate(Path::new(&archive)).await.or_raise(|| ErrorKind::Cache)
                },
            }
        },
    }
}

async fn open_cache(config: &Config) -> MetadataCache {
    MetadataCache::open_with_fallback(&config.cache.dir, &config.cache.fallback_dir).await
}

async fn open_library(config: &Config) -> Result<Library> {
    let root = config.data_dir().or_raise(|| ErrorKind::Config)?;
    let backend = coview_library::open_directory(&root, config.data.read_only).or_raise(|| ErrorKind::Storage)?;
    let cache = open_cache(config).await;
    let ctx = Context { filter: config.media_filter(), upload_limit: config.upload_limit() };
    Ok(Library { backend, cache, ctx })
}

async fn scan(library: &Library) -> Result<()> {
    let mut events = pin!(catalog(&library.backend, &library.cache, &library.ctx));
    let mut failed = 0usize;
    let mut complete = false;
    while let Some(event) = events.next().await {
        match event {
            Ok(CatalogEvent::Started) => tracing::info!(backend = library.backend.name(), "Scanning"),
            Ok(CatalogEvent::DiscoveryComplete(total)) => tracing::info!(total, "Discovered archives"),
            Ok(CatalogEvent::Catalogued(catalogued)) => tracing::info!(
                archive = %catalogued.summary.name,
                entries = catalogued.summary.entry_count,
                effort = ?catalogued.effort,
                "Catalogued"
            ),
            Ok(CatalogEvent::Complete) => complete = true,
            Err(err) => {
                failed += 1;
                tracing::warn!(error = ?err, "Catalog error");
            },
        }
    }
    if !complete {
        exn::bail!(ErrorKind::Library);
    }
    tracing::info!(failed, "Scan complete");
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_raise(|| ErrorKind::Input)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).or_raise(|| ErrorKind::Output)?;
    writeln!(stdout).or_raise(|| ErrorKind::Output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_extract_arguments() {
        let cli = Cli::try_parse_from(["coview", "-v", "extract", "comic1.zip", "Chapter 1/p2.jpg", "-o", "page.jpg"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Extract { archive, entry, output } => {
                assert_eq!(archive, "comic1.zip");
                assert_eq!(entry, "Chapter 1/p2.jpg");
                assert_eq!(output, Some(PathBuf::from("page.jpg")));
            },
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_cache_invalidate_arguments() {
        let cli = Cli::try_parse_from(["coview", "cache", "invalidate", "comic1.zip"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Cache { command: CacheCommand::Invalidate { archive } } if archive == "comic1.zip"
        ));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/uploads/comic1.zip")).unwrap(), "comic1.zip");
        assert!(file_name(Path::new("/")).is_err());
    }
}
