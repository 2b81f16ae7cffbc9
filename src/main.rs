use anyhow::Context;
use clap::Parser;
use std::collections::BTreeMap;
use tapp_import::cli::{Cli, Commands};
use tapp_import::config::Config;
use tapp_import::{loader, pipeline, report};
use tapp_import_common::{get_changed, EntityKind, NormalizationSchema, Snapshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Schemas { json } => {
            if json {
                let schemas: BTreeMap<&str, &NormalizationSchema> =
                    EntityKind::ALL.iter().map(|kind| (kind.as_str(), kind.schema())).collect();
                println!("{}", serde_json::to_string_pretty(&schemas)?);
            } else {
                for kind in EntityKind::ALL {
                    let schema = kind.schema();
                    println!("{}", kind);
                    println!("  fields:      {}", schema.keys.join(", "));
                    println!("  primary key: {}", schema.primary_key.fields().join(" + "));
                    println!("  required:    {}", schema.required_keys.join(", "));
                    if !schema.date_columns.is_empty() {
                        println!("  dates:       {}", schema.date_columns.join(", "));
                    }
                    println!("  JSON key:    {}", schema.base_name);
                }
            }
        }

        Commands::Normalize { kind, input, aliases, output } => {
            let aliases = aliases.as_deref().map(pipeline::load_aliases).transpose()?;
            let options = config.normalize_options();
            let records = pipeline::normalize_file(kind, &input, aliases.as_ref(), &options)
                .with_context(|| format!("normalize {}", input.display()))?;
            let json = serde_json::to_string_pretty(&records)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("write {}", path.display()))?;
                    eprintln!("Wrote {} {} record(s) to {}", records.len(), kind, path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Preview { kind, input, snapshot, aliases, changed_only, json } => {
            let snapshot = match snapshot.or_else(|| config.snapshot.clone()) {
                Some(path) => loader::load_snapshot(&path)
                    .with_context(|| format!("load snapshot {}", path.display()))?,
                None => {
                    tracing::warn!("No snapshot given; every record will be reported as new");
                    Snapshot::default()
                }
            };
            let aliases = aliases.as_deref().map(pipeline::load_aliases).transpose()?;
            let options = config.normalize_options();
            let diffs = pipeline::preview_file(kind, &input, &snapshot, aliases.as_ref(), &options)
                .with_context(|| format!("preview {}", input.display()))?;

            if changed_only {
                println!("{}", serde_json::to_string_pretty(&get_changed(&diffs))?);
            } else if json {
                println!("{}", serde_json::to_string_pretty(&diffs)?);
            } else {
                report::write_summary(&mut std::io::stdout().lock(), kind, &diffs)?;
            }
        }

        Commands::Config { show, set_snapshot, log_unrecognized, collect_all_missing } => {
            let mut config = config;
            let mut changed = false;

            if let Some(path) = set_snapshot {
                config.snapshot = Some(path);
                changed = true;
            }
            if let Some(flag) = log_unrecognized {
                config.log_unrecognized_headers = flag;
                changed = true;
            }
            if let Some(flag) = collect_all_missing {
                config.collect_all_missing = flag;
                changed = true;
            }

            if changed {
                config.save()?;
                println!("Saved {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("Configuration:");
                println!("  log unrecognized headers: {}", config.log_unrecognized_headers);
                println!("  collect all missing:      {}", config.collect_all_missing);
                println!(
                    "  snapshot:                 {}",
                    config
                        .snapshot
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(none)".into())
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "tapp_import=debug,tapp_import_common=debug"
    } else {
        "tapp_import=info,tapp_import_common=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
