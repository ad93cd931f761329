//! corpus-resolver - command-line front end
//!
//! Resolves works, lists composers, prints the reference index and manages
//! metadata bundles and compressed MusicXML containers.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use corpus_common::config::{
    default_config_path, load_toml_config_or_default, user_config_path, write_toml_config,
    CompiledDefaults, RootFolderResolver, TomlConfig,
};
use corpus_resolver::archive::{compress_xml, uncompress_mxl};
use corpus_resolver::{
    Corpus, Domain, ExtensionSet, MetadataField, Movement, NamedCollection, Resolution,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for corpus-resolver
#[derive(Parser, Debug)]
#[command(name = "corpus-resolver")]
#[command(about = "Resolve musical works in a score corpus")]
#[command(version)]
struct Args {
    /// Core corpus root folder
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Additional local corpus directory (repeatable)
    #[arg(short, long = "local")]
    local: Vec<PathBuf>,

    /// TOML config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a work to one or more paths
    Resolve {
        /// Work identifier, e.g. beethoven/opus18no1
        work: String,
        /// Movement: 4, 1-02 or 2,1
        #[arg(short, long)]
        movement: Option<Movement>,
        /// Extension or format filter (repeatable)
        #[arg(short, long = "ext")]
        extensions: Vec<String>,
    },
    /// List every path belonging to a composer
    Composer {
        name: String,
        #[arg(short, long = "ext")]
        extensions: Vec<String>,
    },
    /// List a named collection: bach-chorales, handel-messiah,
    /// monteverdi-madrigals or beethoven-string-quartets
    Collection {
        name: NamedCollection,
        #[arg(short, long = "ext")]
        extensions: Vec<String>,
    },
    /// Print the reference index as JSON
    References {
        /// Keep registry order instead of sorting
        #[arg(long)]
        unsorted: bool,
    },
    /// Search stored metadata
    Search {
        query: String,
        /// composer, title, corpus_path or format
        #[arg(short, long)]
        field: Option<MetadataField>,
        /// Domains to search (default: all)
        #[arg(short, long = "domain")]
        domains: Vec<Domain>,
        #[arg(short, long = "ext")]
        extensions: Vec<String>,
    },
    /// Rebuild metadata bundles (default: local)
    RebuildMetadata { domains: Vec<Domain> },
    /// Package an .xml document as .mxl
    Compress {
        file: PathBuf,
        #[arg(long)]
        delete_original: bool,
    },
    /// Package every .xml document of the core corpus
    CompressAll {
        #[arg(long)]
        delete_original: bool,
    },
    /// Extract the document of an .mxl container
    Uncompress {
        file: PathBuf,
        #[arg(long)]
        delete_original: bool,
    },
    /// Write a config file spelling out the compiled defaults
    InitConfig {
        /// Target file (default: per-user config dir)
        path: Option<PathBuf>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn extension_request(tokens: &[String]) -> Option<ExtensionSet> {
    if tokens.is_empty() {
        None
    } else {
        Some(ExtensionSet::expand(Some(tokens), true))
    }
}

fn print_paths<'a>(paths: impl IntoIterator<Item = &'a corpus_resolver::CorpusPath>) {
    for path in paths {
        println!("{}", path);
    }
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = match path.or_else(user_config_path) {
        Some(target) => target,
        None => bail!("No config directory on this platform; pass a path"),
    };
    if target.exists() && !force {
        bail!("{} already exists (use --force to replace it)", target.display());
    }

    let config = TomlConfig::from_defaults(&CompiledDefaults::for_current_platform());
    write_toml_config(&config, &target)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    info!("Wrote default configuration to {}", target.display());
    println!("{}", target.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => load_toml_config_or_default(&path),
        None => Default::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    match &config.logging.file {
        Some(log_path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)
                .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    info!(
        "Starting corpus-resolver v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let resolver = RootFolderResolver::with_config(config).with_cli_override(args.root);
    let corpus = Corpus::from_config(&resolver, args.local);

    match args.command {
        Command::Resolve {
            work,
            movement,
            extensions,
        } => {
            let request = extension_request(&extensions);
            match corpus
                .resolve(work.as_str(), movement, request.as_ref())
                .with_context(|| format!("Failed to resolve '{}'", work))?
            {
                Resolution::Single(path) => println!("{}", path),
                Resolution::Multiple(paths) => print_paths(&paths),
            }
        }
        Command::Composer { name, extensions } => {
            let request = extension_request(&extensions);
            let paths = corpus
                .match_composer(&name, request.as_ref())
                .with_context(|| format!("Failed to list composer '{}'", name))?;
            print_paths(&paths);
        }
        Command::Collection { name, extensions } => {
            let request = extension_request(&extensions);
            let paths = corpus
                .collection(name, request.as_ref())
                .with_context(|| format!("Failed to list collection '{}'", name))?;
            print_paths(&paths);
        }
        Command::References { unsorted } => {
            let references = corpus
                .build_references(!unsorted)
                .context("Failed to build reference index")?;
            println!("{}", serde_json::to_string_pretty(&references)?);
        }
        Command::Search {
            query,
            field,
            domains,
            extensions,
        } => {
            let domains = if domains.is_empty() {
                Domain::ALL.to_vec()
            } else {
                domains
            };
            let request = extension_request(&extensions);
            let paths = corpus
                .search(&query, field, &domains, request.as_ref())
                .with_context(|| format!("Search for '{}' failed", query))?;
            print_paths(&paths);
        }
        Command::RebuildMetadata { domains } => {
            let domains = if domains.is_empty() {
                vec![Domain::Local]
            } else {
                domains
            };
            let count = corpus
                .rebuild_metadata(&domains)
                .context("Failed to rebuild metadata")?;
            info!("Rebuilt metadata: {} entries", count);
        }
        Command::Compress {
            file,
            delete_original,
        } => {
            if let Some(archive) = compress_xml(&file, delete_original)
                .with_context(|| format!("Failed to compress {}", file.display()))?
            {
                println!("{}", archive.display());
            }
        }
        Command::CompressAll { delete_original } => {
            let written = corpus
                .compress_all_xml(delete_original)
                .context("Failed to compress core corpus")?;
            info!("Compressed {} MusicXML files", written.len());
        }
        Command::Uncompress {
            file,
            delete_original,
        } => {
            if let Some(document) = uncompress_mxl(&file, delete_original)
                .with_context(|| format!("Failed to uncompress {}", file.display()))?
            {
                println!("{}", document.display());
            }
        }
        Command::InitConfig { path, force } => init_config(path, force)?,
    }

    Ok(())
}
