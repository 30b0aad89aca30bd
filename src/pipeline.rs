//! The import run: fetch, normalize, validate, reconcile, dedupe, upsert.
//!
//! Everything happens inside one transaction on the caller's [`Store`].
//! The transaction is opened before the first fetch and either committed
//! after the last upsert or rolled back as a whole.

use rusqlite::Transaction;
use std::fmt;

use crate::config::ImportOptions;
use crate::dedupe::dedupe;
use crate::error::Result;
use crate::model::{Municipality, Record, RecordKind, Region, TerritorialUnit, TownHall};
use crate::parser::{parse_records, Parsed};
use crate::reconcile::reconcile_town_halls;
use crate::source::Source;
use crate::ui::{Phase, Ui};
use crate::writer::{upsert, Store};

/// Counters for one record kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Raw records in the source payload
    pub fetched: usize,
    /// Dropped by normalization or validation
    pub rejected: usize,
    /// Created by reconciliation
    pub synthesized: usize,
    /// Dropped as repeated keys
    pub duplicates: usize,
    pub written: usize,
    pub statements: usize,
}

impl fmt::Display for KindStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fetched, {} rejected, {} synthesized, {} duplicates, {} written in {} statements",
            self.fetched,
            self.rejected,
            self.synthesized,
            self.duplicates,
            self.written,
            self.statements
        )
    }
}

/// Result of a committed import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub regions: KindStats,
    pub municipalities: KindStats,
    pub town_halls: KindStats,
    pub territorial_units: KindStats,
}

impl ImportSummary {
    pub fn get(&self, kind: RecordKind) -> &KindStats {
        match kind {
            RecordKind::Region => &self.regions,
            RecordKind::Municipality => &self.municipalities,
            RecordKind::TownHall => &self.town_halls,
            RecordKind::TerritorialUnit => &self.territorial_units,
        }
    }

    fn get_mut(&mut self, kind: RecordKind) -> &mut KindStats {
        match kind {
            RecordKind::Region => &mut self.regions,
            RecordKind::Municipality => &mut self.municipalities,
            RecordKind::TownHall => &mut self.town_halls,
            RecordKind::TerritorialUnit => &mut self.territorial_units,
        }
    }

    pub fn total_written(&self) -> usize {
        RecordKind::ALL.iter().map(|k| self.get(*k).written).sum()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} regions, {} municipalities, {} town halls ({} synthesized), {} territorial units",
            self.regions.written,
            self.municipalities.written,
            self.town_halls.written,
            self.town_halls.synthesized,
            self.territorial_units.written
        )
    }
}

/// Run a complete import against `store`.
///
/// On any failure after the transaction has started, ROLLBACK is issued
/// before the error is returned, so the tables are left exactly as they
/// were. The store itself stays owned by the caller.
pub fn run_import<S: Source, U: Ui>(
    store: &mut Store,
    source: &S,
    options: &ImportOptions,
    ui: &mut U,
) -> Result<ImportSummary> {
    options.validate()?;

    ui.set_phase(Phase::Connecting);
    let tx = store.connection_mut().transaction()?;

    match import_all(&tx, source, options, ui) {
        Ok(summary) => {
            tx.commit()?;
            ui.set_phase(Phase::Complete);
            Ok(summary)
        }
        Err(err) => {
            ui.set_phase(Phase::Failed);
            if let Err(rollback_err) = tx.rollback() {
                ui.log(format!("Rollback failed: {}", rollback_err));
            }
            Err(err)
        }
    }
}

fn import_all<S: Source, U: Ui>(
    tx: &Transaction,
    source: &S,
    options: &ImportOptions,
    ui: &mut U,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    let regions: Vec<Region> = load(source, ui, &mut summary)?;
    write(tx, &regions, options, ui, &mut summary)?;

    let municipalities: Vec<Municipality> = load(source, ui, &mut summary)?;
    write(tx, &municipalities, options, ui, &mut summary)?;

    let town_halls: Vec<TownHall> = load(source, ui, &mut summary)?;
    let units: Vec<TerritorialUnit> = load(source, ui, &mut summary)?;

    // Synthesis must see every unit before duplicates are collapsed,
    // which ReconciledTownHalls enforces.
    ui.set_phase(Phase::Reconciling);
    let reconciled = reconcile_town_halls(
        town_halls,
        &units,
        &municipalities,
        options.missing_town_hall,
    )?;
    summary.town_halls.synthesized = reconciled.synthesized();
    if reconciled.synthesized() > 0 {
        ui.log(format!(
            "Synthesized {} town halls referenced by territorial units",
            reconciled.synthesized()
        ));
    }

    let (town_halls, dropped) = reconciled.into_deduped();
    summary.town_halls.duplicates = dropped;

    let before = units.len();
    let units = dedupe(units);
    summary.territorial_units.duplicates = before - units.len();

    write(tx, &town_halls, options, ui, &mut summary)?;
    write(tx, &units, options, ui, &mut summary)?;

    Ok(summary)
}

fn load<R: Record, S: Source, U: Ui>(
    source: &S,
    ui: &mut U,
    summary: &mut ImportSummary,
) -> Result<Vec<R>> {
    ui.set_phase(Phase::Fetching(R::KIND));
    let raw = source.fetch(R::KIND)?;
    ui.set_info(format!("{} {} received", raw.len(), R::KIND));

    ui.set_phase(Phase::Validating(R::KIND));
    let Parsed { records, rejected } = parse_records::<R>(&raw);

    let stats = summary.get_mut(R::KIND);
    stats.fetched = raw.len();
    stats.rejected = rejected;
    ui.report(R::KIND, stats);
    if rejected > 0 {
        ui.log(format!("Skipped {} invalid {}", rejected, R::KIND));
    }

    Ok(records)
}

fn write<R: Record, U: Ui>(
    tx: &Transaction,
    records: &[R],
    options: &ImportOptions,
    ui: &mut U,
    summary: &mut ImportSummary,
) -> Result<()> {
    ui.set_phase(Phase::Writing(R::KIND));
    let total = records.len() as u64;
    ui.set_progress(0, total, R::KIND.table());

    let written = upsert(tx, records, options.batch_size)?;

    ui.set_progress(written.rows as u64, total, R::KIND.table());
    ui.clear_progress();

    let stats = summary.get_mut(R::KIND);
    stats.written = written.rows;
    stats.statements = written.statements;
    ui.report(R::KIND, stats);
    ui.log(format!("{}: {} rows", R::KIND.table(), written.rows));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use crate::ui::SilentUi;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    struct MapSource(HashMap<RecordKind, Vec<Value>>);

    impl Source for MapSource {
        fn fetch(&self, kind: RecordKind) -> Result<Vec<Value>> {
            self.0
                .get(&kind)
                .cloned()
                .ok_or_else(|| ImportError::FetchStatus {
                    url: kind.table().to_string(),
                    status: 404,
                })
        }
    }

    fn source() -> MapSource {
        MapSource(HashMap::from([
            (RecordKind::Region, vec![json!({"oblast": "BLG", "name": "Благоевград"})]),
            (
                RecordKind::Municipality,
                vec![json!({"obshtina": "BLG01", "name": "Банско"})],
            ),
            (RecordKind::TownHall, vec![]),
            (
                RecordKind::TerritorialUnit,
                vec![
                    json!({"ekatte": "02676", "name": "гр. Банско", "kind": 1, "kmetstvo": "BLG01-00"}),
                    json!({"ekatte": "02676", "name": "гр. Банско (дубликат)", "kmetstvo": "BLG01-00"}),
                ],
            ),
        ]))
    }

    #[test]
    fn test_summary_counts() {
        let mut store = Store::open_in_memory().unwrap();
        let summary = run_import(&mut store, &source(), &ImportOptions::default(), &mut SilentUi).unwrap();

        assert_eq!(summary.regions.written, 1);
        assert_eq!(summary.town_halls.synthesized, 1);
        assert_eq!(summary.town_halls.written, 1);
        assert_eq!(summary.territorial_units.fetched, 2);
        assert_eq!(summary.territorial_units.duplicates, 1);
        assert_eq!(summary.territorial_units.written, 1);
        assert_eq!(summary.total_written(), 4);
    }

    #[test]
    fn test_missing_dataset_rolls_back() {
        let mut source = source();
        source.0.remove(&RecordKind::TerritorialUnit);

        let mut store = Store::open_in_memory().unwrap();
        let err = run_import(&mut store, &source, &ImportOptions::default(), &mut SilentUi).unwrap_err();
        assert!(err.is_fetch());
        assert_eq!(store.row_count(&crate::schema::REGIONS).unwrap(), 0);
    }

    #[test]
    fn test_invalid_options_fail_before_any_write() {
        let mut store = Store::open_in_memory().unwrap();
        let options = ImportOptions {
            batch_size: 0,
            ..ImportOptions::default()
        };
        assert!(matches!(
            run_import(&mut store, &source(), &options, &mut SilentUi),
            Err(ImportError::InvalidOptions(_))
        ));
    }
}
