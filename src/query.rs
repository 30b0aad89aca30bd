//! Substring search over the imported tables

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::Result;
use crate::schema::ALL_TABLES;

pub const DEFAULT_LIMIT: u32 = 25;

/// A territorial unit with the names of its ancestors
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub ekatte: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub town_hall: Option<String>,
    pub municipality: Option<String>,
    pub region: Option<String>,
}

/// Number of rows per table whose name matches the query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub territorial_units: u64,
    pub town_halls: u64,
    pub municipalities: u64,
    pub regions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub results: Vec<SearchHit>,
    /// Matching territorial units across all pages
    pub total: u64,
    pub stats: TableCounts,
}

/// One page of territorial units whose name contains `q`, ordered by name.
///
/// `conn` must come from a [`Store`](crate::writer::Store), which registers
/// `lower_u`.
pub fn search(conn: &Connection, q: &str, limit: u32, offset: u32) -> Result<SearchPage> {
    let pattern = like_pattern(q);

    let mut stmt = conn.prepare_cached(
        "SELECT t.ekatte, t.name, t.type, th.name, m.name, r.name
         FROM territorial_units t
         LEFT JOIN town_halls th ON t.town_hall_code = th.code
         LEFT JOIN municipalities m ON th.municipality_code = m.code
         LEFT JOIN regions r ON m.region_code = r.code
         WHERE lower_u(t.name) LIKE ?1 ESCAPE '\\'
         ORDER BY t.name, t.ekatte
         LIMIT ?2 OFFSET ?3",
    )?;

    let results = stmt
        .query_map(params![pattern, limit, offset], |row| {
            Ok(SearchHit {
                ekatte: row.get(0)?,
                name: row.get(1)?,
                kind: row.get(2)?,
                town_hall: row.get(3)?,
                municipality: row.get(4)?,
                region: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let stats = counts(conn, q)?;

    Ok(SearchPage {
        results,
        total: stats.territorial_units,
        stats,
    })
}

/// Per-table counts of names containing `q`
pub fn counts(conn: &Connection, q: &str) -> Result<TableCounts> {
    let pattern = like_pattern(q);
    let mut counts = TableCounts::default();

    for table in ALL_TABLES {
        let n: i64 = conn.query_row(
            &format!(
                "SELECT count(*) FROM {} WHERE lower_u(name) LIKE ?1 ESCAPE '\\'",
                table.name
            ),
            params![pattern],
            |row| row.get(0),
        )?;

        let slot = match table.name {
            "regions" => &mut counts.regions,
            "municipalities" => &mut counts.municipalities,
            "town_halls" => &mut counts.town_halls,
            _ => &mut counts.territorial_units,
        };
        *slot = n as u64;
    }

    Ok(counts)
}

/// Lowercased `%q%` with LIKE wildcards in `q` escaped. Compared against
/// `lower_u(name)` so the match ignores case beyond ASCII.
fn like_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.trim().to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
