use anyhow::{bail, Context, Result};
use ekatte_import::{
    cli::{Cli, Commands, ImportArgs},
    config::{ImportConfig, ImportOptions},
    model::RecordKind,
    query::search,
    run_import,
    schema::ALL_TABLES,
    source::{HttpSource, SnapshotDir, Source},
    writer::Store,
    ConsoleUi, UiApp,
};
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Sync { db, config, import } => {
            let mut config = ImportConfig::load_or_default(config.as_deref())?;
            import.apply(&mut config);

            let source = HttpSource::new(config.sources.clone())?;
            import_into(&db, &source, &config.options(), &import)?;
        }

        Commands::Download { output, config } => {
            let config = ImportConfig::load_or_default(config.as_deref())?;
            let source = HttpSource::new(config.sources)?;
            let snapshot = SnapshotDir::new(output)?;

            for kind in RecordKind::ALL {
                let records = source.fetch(kind)?;
                let path = snapshot.save(kind, &records)?;
                println!("{}: {} records -> {:?}", kind.table(), records.len(), path);
            }
            println!("Snapshot saved to {:?}", snapshot.dir());
        }

        Commands::Import {
            snapshot_dir,
            db,
            config,
            import,
        } => {
            let snapshot = SnapshotDir::open(&snapshot_dir);
            if !snapshot.is_complete() {
                bail!(
                    "{:?} is missing one of regions.json, municipalities.json, town_halls.json, territorial_units.json",
                    snapshot_dir
                );
            }

            let mut config = ImportConfig::load_or_default(config.as_deref())?;
            import.apply(&mut config);
            import_into(&db, &snapshot, &config.options(), &import)?;
        }

        Commands::Search {
            db,
            query,
            limit,
            offset,
            json,
        } => {
            let store = Store::open(&db).with_context(|| format!("Failed to open {:?}", db))?;
            let page = search(store.connection(), &query, limit, offset)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
            } else {
                for hit in &page.results {
                    println!(
                        "{}  {:<32} {:<24} {:<24} {}",
                        hit.ekatte,
                        hit.name,
                        hit.town_hall.as_deref().unwrap_or("-"),
                        hit.municipality.as_deref().unwrap_or("-"),
                        hit.region.as_deref().unwrap_or("-"),
                    );
                }
                let first = if page.results.is_empty() { 0 } else { offset + 1 };
                println!(
                    "\n{}-{} of {} territorial units ({} town halls, {} municipalities, {} regions match)",
                    first,
                    offset as usize + page.results.len(),
                    page.total,
                    page.stats.town_halls,
                    page.stats.municipalities,
                    page.stats.regions
                );
            }
        }

        Commands::ListTables => {
            println!("Tables:\n");
            for table in ALL_TABLES {
                println!("  {} (key: {})", table.name, table.key);
                for col in table.columns {
                    let required = if col.required { "" } else { " (optional)" };
                    println!("    - {}{}", col.name, required);
                }
            }
        }
    }

    Ok(())
}

fn import_into<S: Source>(
    db: &Path,
    source: &S,
    options: &ImportOptions,
    args: &ImportArgs,
) -> Result<()> {
    let start = Instant::now();
    let mut store = Store::open(db).with_context(|| format!("Failed to open {:?}", db))?;

    let outcome = if args.tui {
        let mut ui = UiApp::new()?;
        let outcome = run_import(&mut store, source, options, &mut ui);
        let line = match &outcome {
            Ok(summary) => format!("Imported {}", summary),
            Err(err) => format!("Import failed: {}", err),
        };
        ui.finish(&line)?;
        outcome
    } else {
        let mut ui = ConsoleUi::new(args.verbose);
        run_import(&mut store, source, options, &mut ui)
    };

    let summary = outcome.context("Import failed, all changes rolled back")?;
    println!(
        "\nImport completed: {} into {:?} in {:.1}s",
        summary,
        db,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
