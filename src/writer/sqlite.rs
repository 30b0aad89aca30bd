use rusqlite::functions::FunctionFlags;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::error::Result;
use crate::model::Record;
use crate::schema::{TableSchema, ALL_TABLES};

/// Handle to the EKATTE database. The connection is closed on drop.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database and make sure the tables exist
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Bundled SQLite turns enforcement on; fallback town halls may
        // reference municipalities that were never imported.
        conn.pragma_update(None, "foreign_keys", "OFF")?;
        register_functions(&conn)?;

        let store = Self { conn };
        store.create_tables(ALL_TABLES)?;
        Ok(store)
    }

    /// Create the given tables and their indexes if missing
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        for schema in schemas {
            self.conn.execute(&generate_create_table(schema), [])?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn row_count(&self, schema: &TableSchema) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT count(*) FROM {}", schema.name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Scalar functions used by the search queries.
///
/// `lower_u(text)` lowercases with Unicode rules; the built-in `lower`
/// and `LIKE` only fold ASCII, and EKATTE names are Cyrillic.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "lower_u",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Outcome of one [`upsert`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub rows: usize,
    pub statements: usize,
}

/// Insert or update `records` in chunks of at most `batch_size` rows.
///
/// Each chunk is one multi-row INSERT that overwrites every non-key
/// column on key conflict. Chunks run one after another on `conn`; an
/// empty slice issues nothing. `batch_size` must be non-zero.
pub fn upsert<R: Record>(conn: &Connection, records: &[R], batch_size: usize) -> Result<UpsertStats> {
    let schema = R::KIND.schema();
    let mut stats = UpsertStats::default();

    for chunk in records.chunks(batch_size) {
        let sql = upsert_sql(schema, chunk.len());
        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(params_from_iter(bind_values(schema, chunk)))?;

        stats.rows += chunk.len();
        stats.statements += 1;
    }

    Ok(stats)
}

/// Build the multi-row upsert statement for `rows` rows
pub fn upsert_sql(schema: &TableSchema, rows: usize) -> String {
    let columns = schema.column_names();
    let width = columns.len();

    let values: Vec<String> = (0..rows)
        .map(|row| {
            let params: Vec<String> = (1..=width)
                .map(|col| format!("?{}", row * width + col))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect();

    let updates = schema.non_key_columns();
    let on_conflict = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        let sets: Vec<String> = updates
            .iter()
            .map(|c| format!("{} = excluded.{}", c, c))
            .collect();
        format!("DO UPDATE SET {}", sets.join(", "))
    };

    format!(
        "INSERT INTO {} ({}) VALUES {} ON CONFLICT ({}) {}",
        schema.name,
        columns.join(", "),
        values.join(", "),
        schema.key,
        on_conflict
    )
}

/// Flatten a chunk into row-major parameters. Missing values become NULL
/// so every column keeps its position.
pub fn bind_values<'a, R: Record>(schema: &TableSchema, chunk: &'a [R]) -> Vec<Option<&'a str>> {
    chunk
        .iter()
        .flat_map(|record| schema.columns.iter().map(move |col| record.field(col.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Region, TerritorialUnit};
    use crate::schema::{REGIONS, TERRITORIAL_UNITS};

    fn region(code: &str, name: &str) -> Region {
        Region {
            code: code.into(),
            name: name.into(),
        }
    }

    fn regions(n: usize) -> Vec<Region> {
        (0..n)
            .map(|i| region(&format!("R{:04}", i), &format!("Name{}", i)))
            .collect()
    }

    #[test]
    fn test_upsert_sql_single_row() {
        let sql = upsert_sql(&REGIONS, 1);
        assert_eq!(
            sql,
            "INSERT INTO regions (code, name) VALUES (?1, ?2) ON CONFLICT (code) DO UPDATE SET name = excluded.name"
        );
    }

    #[test]
    fn test_upsert_sql_numbers_placeholders_row_major() {
        let sql = upsert_sql(&REGIONS, 2);
        assert!(sql.contains("VALUES (?1, ?2), (?3, ?4)"));
    }

    #[test]
    fn test_bind_values_keeps_missing_columns_as_null() {
        let units = vec![TerritorialUnit {
            ekatte: "00014".into(),
            name: "Абланица".into(),
            kind: None,
            town_hall_code: "BLG03-01".into(),
        }];
        let values = bind_values(&TERRITORIAL_UNITS, &units);
        assert_eq!(values, vec![Some("00014"), Some("Абланица"), None, Some("BLG03-01")]);
    }

    #[test]
    fn test_empty_input_issues_no_statement() {
        let store = Store::open_in_memory().unwrap();
        let stats = upsert::<Region>(store.connection(), &[], 500).unwrap();
        assert_eq!(stats, UpsertStats::default());
    }

    #[test]
    fn test_batches_are_bounded() {
        let store = Store::open_in_memory().unwrap();
        let stats = upsert(store.connection(), &regions(1500), 500).unwrap();
        assert_eq!(stats.statements, 3);
        assert_eq!(stats.rows, 1500);

        let stats = upsert(store.connection(), &regions(3), 2).unwrap();
        assert_eq!(stats.statements, 2);
        assert_eq!(store.row_count(&REGIONS).unwrap(), 1500);
    }

    #[test]
    fn test_conflict_overwrites_non_key_columns() {
        let store = Store::open_in_memory().unwrap();
        upsert(store.connection(), &[region("01", "София")], 500).unwrap();
        upsert(store.connection(), &[region("01", "София-град")], 500).unwrap();

        let name: String = store
            .connection()
            .query_row("SELECT name FROM regions WHERE code = '01'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "София-град");
        assert_eq!(store.row_count(&REGIONS).unwrap(), 1);
    }

    #[test]
    fn test_foreign_keys_are_not_enforced() {
        let store = Store::open_in_memory().unwrap();
        let enabled: i64 = store
            .connection()
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(enabled, 0);

        let orphan = TerritorialUnit {
            ekatte: "00014".into(),
            name: "с. Абланица".into(),
            kind: None,
            town_hall_code: "BLG03-01".into(),
        };
        upsert(store.connection(), &[orphan], 500).unwrap();
        assert_eq!(store.row_count(&TERRITORIAL_UNITS).unwrap(), 1);
    }

    #[test]
    fn test_file_store_does_not_enforce_foreign_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("ekatte.db")).unwrap();
        let enabled: i64 = store
            .connection()
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(enabled, 0);
    }

    #[test]
    fn test_lower_u_folds_cyrillic() {
        let store = Store::open_in_memory().unwrap();
        let lowered: String = store
            .connection()
            .query_row("SELECT lower_u('гр. СОФИЯ')", [], |r| r.get(0))
            .unwrap();
        assert_eq!(lowered, "гр. софия");

        let null: Option<String> = store
            .connection()
            .query_row("SELECT lower_u(NULL)", [], |r| r.get(0))
            .unwrap();
        assert_eq!(null, None);
    }

    #[test]
    fn test_failed_statement_is_reported() {
        let store = Store::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch("DROP TABLE regions")
            .unwrap();
        assert!(upsert(store.connection(), &[region("01", "София")], 500).is_err());
    }
}
