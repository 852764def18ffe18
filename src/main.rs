use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagstamp::config::{self, Config};
use tagstamp::git::GitCli;
use tagstamp::settings::ProjectSettingsFile;
use tagstamp::store::AssetDatabase;
use tagstamp::{ResolveOptions, parse_version, resolver};

#[derive(Parser)]
#[command(
    name = "tagstamp",
    version = env!("TAGSTAMP_BUILD"),
    about = "Stamp a build with its git tag version, commit hash and timestamp"
)]
struct Cli {
    /// Project root (holds tagstamp.toml and the asset database)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the version from git and update the version record (default)
    Resolve,
    /// Create the version record if the project has none
    Init,
    /// Show the current version record
    Show {
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every version record in the project
    Records,
    /// Parse a tag without touching the project
    Parse {
        /// Tag to parse, e.g. v1.2.3-rc1
        tag: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagstamp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("build aborted: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Commands::Resolve) {
        Commands::Resolve => {
            let config = config::load(&cli.project)?;
            let mut db = open_database(&config, &cli.project)?;
            let vcs = GitCli::new(&config.git.program, &cli.project)
                .with_hash_length(config.git.hash_length);
            let mut sink = ProjectSettingsFile::new(
                config.settings_path(&cli.project),
                config.settings.fields.clone(),
            );
            let resolved = resolver::resolve(
                &mut db,
                &vcs,
                &mut sink,
                &ResolveOptions::from(&config),
            )
            .inspect_err(|e| tracing::error!(stage = e.stage(), "{e}"))?;
            println!("{}", resolved.version_string());
            Ok(())
        }
        Commands::Init => {
            let config = config::load(&cli.project)?;
            let db = open_database(&config, &cli.project)?;
            let handle = db.get_or_create_record(&config.record_path)?;
            println!("Version record at {}", handle.path());
            Ok(())
        }
        Commands::Show { json } => {
            let config = config::load(&cli.project)?;
            let db = open_database(&config, &cli.project)?;
            let locations = db.record_locations()?;
            let [path] = locations.as_slice() else {
                if locations.is_empty() {
                    println!("No version record. Use `tagstamp init` to create one.");
                    return Ok(());
                }
                anyhow::bail!(tagstamp::error::StoreError::DuplicateRecord { locations });
            };
            let record: tagstamp::store::VersionRecord =
                db.load_asset(path, tagstamp::store::VERSION_ASSET_TYPE)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("Version record ({path}):");
                println!("  Version:    {}", record.game_version);
                println!("  Commit:     {}", display_or_unset(&record.git_hash));
                println!("  Built at:   {}", display_or_unset(&record.build_timestamp));
            }
            Ok(())
        }
        Commands::Records => {
            let config = config::load(&cli.project)?;
            let db = open_database(&config, &cli.project)?;
            let records = db.list_assets(tagstamp::store::VERSION_ASSET_TYPE)?;
            if records.is_empty() {
                println!("No version records.");
            } else {
                for r in &records {
                    println!("  {} ({}, updated {})", r.path, r.guid, r.updated_at);
                }
                if records.len() > 1 {
                    println!("More than one version record: remove all but one.");
                }
            }
            Ok(())
        }
        Commands::Parse { tag } => {
            let version = parse_version(&tag)?;
            println!("{version}");
            Ok(())
        }
    }
}

fn open_database(config: &Config, project: &Path) -> Result<AssetDatabase> {
    let path = config.database_path(project);
    let db = AssetDatabase::open(&path)
        .with_context(|| format!("failed to open asset database at {}", path.display()))?;
    db.migrate()?;
    Ok(db)
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}
