use std::collections::HashSet;

/// Length of the region prefix inside a municipality code (`BLG01` -> `BLG`)
pub const REGION_CODE_LEN: usize = 3;

/// Length of the municipality prefix inside a town hall code (`BLG01-00` -> `BLG01`)
pub const MUNICIPALITY_CODE_LEN: usize = 5;

/// Column definition. Every EKATTE column is stored as TEXT.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub required: bool,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            required: false,
        }
    }

    /// Create a required (non-nullable) column
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "code",
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    /// Natural key, also the upsert conflict target
    pub key: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

impl TableSchema {
    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// Columns overwritten on key conflict
    pub fn non_key_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .map(|c| c.name)
            .filter(|name| *name != self.key)
            .collect()
    }

    pub fn required_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.required)
    }

    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }
}

/// Take the first `len` characters of a code. Shorter codes are returned whole.
pub fn code_prefix(code: &str, len: usize) -> &str {
    match code.char_indices().nth(len) {
        Some((idx, _)) => &code[..idx],
        None => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_prefix() {
        assert_eq!(code_prefix("BLG01-00", MUNICIPALITY_CODE_LEN), "BLG01");
        assert_eq!(code_prefix("BLG01", REGION_CODE_LEN), "BLG");
        assert_eq!(code_prefix("SF", REGION_CODE_LEN), "SF");
        assert_eq!(code_prefix("", MUNICIPALITY_CODE_LEN), "");
    }
}
