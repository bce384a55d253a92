use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use package_monitor::config::MonitorConfig;
use package_monitor::store::filter::{RecordQuery, UpdateAvailability};
use package_monitor::store::{ListFilter, PackageRecord, RecordStore, SqliteStore};
use package_monitor::sync::{SyncEngine, SystemClock};
use package_monitor::version::DiffStatus;
use package_monitor::version::registries::PypiIndex;

#[derive(Parser)]
#[command(name = "package-monitor")]
#[command(version, about = "Track requirements.txt dependencies against PyPI releases")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/package-monitor/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile the manifest and the package index into stored records
    Sync {
        /// Delete all records first
        #[arg(long)]
        clean: bool,
        /// Only read the manifest
        #[arg(long)]
        local: bool,
        /// Only refresh records from the index
        #[arg(long)]
        remote: bool,
        /// Manifest to read instead of the configured one
        #[arg(long)]
        requirements: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored records ordered by name
    List {
        #[arg(long)]
        status: Option<DiffStatus>,
        /// Update available: yes, no or unknown
        #[arg(long)]
        update: Option<UpdateAvailability>,
        #[arg(long)]
        editable: Option<bool>,
        #[arg(long)]
        parseable: Option<bool>,
        #[arg(long)]
        py3: Option<bool>,
        #[arg(long)]
        json: bool,
    },
    /// Refresh the named records from the index
    Check {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show a record and the versions published after it
    Show { name: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = MonitorConfig::load(cli.config.as_deref())?;
    let _guard = package_monitor::logging::init(&config.log)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async move {
            match cli.command {
                Command::Sync {
                    clean,
                    local,
                    remote,
                    requirements,
                    json,
                } => {
                    if let Some(path) = requirements {
                        config.sync.requirements_file = path;
                    }
                    // Neither flag means both phases
                    let (local, remote) = if local || remote {
                        (local, remote)
                    } else {
                        (true, true)
                    };
                    run_sync(&config, clean, local, remote, json).await
                }
                Command::List {
                    status,
                    update,
                    editable,
                    parseable,
                    py3,
                    json,
                } => {
                    let query = RecordQuery {
                        diff_status: status,
                        update,
                        is_editable: editable,
                        is_parseable: parseable,
                        supports_py3: py3,
                    };
                    run_list(&config, &query, json)
                }
                Command::Check { names } => run_check(&config, &names).await,
                Command::Show { name } => run_show(&config, &name).await,
            }
        })
}

fn open_store(config: &MonitorConfig) -> anyhow::Result<Arc<SqliteStore>> {
    let path = config.database_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    info!("Using database {}", path.display());
    Ok(Arc::new(SqliteStore::new(&path)?))
}

fn build_engine(config: &MonitorConfig, store: Arc<SqliteStore>) -> anyhow::Result<SyncEngine> {
    let index = PypiIndex::new(
        config.index.url.clone(),
        Duration::from_millis(config.index.timeout_ms),
    )?;

    Ok(SyncEngine::new(
        store,
        Arc::new(index),
        Arc::new(SystemClock),
        config.sync.clone(),
    ))
}

async fn run_sync(
    config: &MonitorConfig,
    clean: bool,
    local: bool,
    remote: bool,
    json: bool,
) -> anyhow::Result<()> {
    let engine = build_engine(config, open_store(config)?)?;

    if clean {
        engine.clean()?;
    }

    let local_sync = if local {
        let outcome = engine.sync_local()?;
        for warning in &outcome.warnings {
            eprintln!("warning: {warning}");
        }
        Some(outcome)
    } else {
        None
    };

    if !remote {
        if let Some(outcome) = local_sync {
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "{} packages tracked, {} added",
                    outcome.records.len(),
                    outcome.created.len()
                );
            }
        }
        return Ok(());
    }

    let report = engine
        .sync_remote(local_sync.map(|outcome| outcome.records))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.summary(&config.report.subject));
    }
    Ok(())
}

fn run_list(config: &MonitorConfig, query: &RecordQuery, json: bool) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let records = query.apply(store.list(ListFilter::All)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!(
        "{:<32} {:<12} {:<12} {:<12} {:<10} {:<8} {:<9} {:<4}",
        "package", "current", "next", "latest", "status", "editable", "parseable", "py3"
    );
    for record in &records {
        println!(
            "{:<32} {:<12} {:<12} {:<12} {:<10} {:<8} {:<9} {:<4}",
            record.package_name,
            display_current(record),
            display_version(record.next_version.as_ref()),
            display_version(record.latest_version.as_ref()),
            record.diff_status,
            yes_no(record.is_editable),
            yes_no(record.is_parseable),
            yes_no(record.supports_py3),
        );
    }
    Ok(())
}

async fn run_check(config: &MonitorConfig, names: &[String]) -> anyhow::Result<()> {
    let store = open_store(config)?;

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        match store.get(name)? {
            Some(record) => selected.push(record),
            None => bail!("Package not tracked: {name}"),
        }
    }

    let engine = build_engine(config, store)?;
    let report = engine.sync_remote(Some(selected)).await?;
    println!("{}", report.summary(&config.report.subject));
    Ok(())
}

async fn run_show(config: &MonitorConfig, name: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let Some(record) = store.get(name)? else {
        bail!("Package not tracked: {name}");
    };

    println!("{}", record.package_name);
    println!("  current:   {}", display_current(&record));
    println!("  next:      {}", display_version(record.next_version.as_ref()));
    println!("  latest:    {}", display_version(record.latest_version.as_ref()));
    println!("  status:    {}", record.diff_status);
    println!("  editable:  {}", yes_no(record.is_editable));
    println!("  licence:   {}", record.licence.as_deref().unwrap_or("-"));
    println!("  url:       {}", record.url.as_deref().unwrap_or("-"));
    println!("  python:    {}", join_or_dash(&record.python_support));
    println!("  django:    {}", join_or_dash(&record.django_support));
    match record.checked_pypi_at {
        Some(at) => println!("  checked:   {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  checked:   never"),
    }

    if record.is_editable {
        return Ok(());
    }

    let engine = build_engine(config, store)?;
    let updates = engine.available_updates(&record).await?;
    if updates.is_empty() {
        println!("No updates available");
    } else {
        println!("Available updates:");
        for version in updates {
            println!("  {version}");
        }
    }
    Ok(())
}

fn display_current(record: &PackageRecord) -> String {
    match (&record.current_version, &record.declared_version) {
        (Some(version), _) => version.to_string(),
        (None, Some(declared)) => declared.clone(),
        (None, None) => "-".to_string(),
    }
}

fn display_version(version: Option<&package_monitor::version::Version>) -> String {
    version.map_or_else(|| "-".to_string(), ToString::to_string)
}

fn join_or_dash(values: &std::collections::BTreeSet<String>) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
