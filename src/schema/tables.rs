//! Table schema definitions for the four EKATTE tables

use super::types::*;

pub static REGIONS: TableSchema = TableSchema {
    name: "regions",
    key: "code",
    columns: &[Column::required("code"), Column::required("name")],
    foreign_keys: &[],
};

pub static MUNICIPALITIES: TableSchema = TableSchema {
    name: "municipalities",
    key: "code",
    columns: &[
        Column::required("code"),
        Column::required("name"),
        Column::required("region_code"),
    ],
    foreign_keys: &[ForeignKey::new("region_code", "regions")],
};

pub static TOWN_HALLS: TableSchema = TableSchema {
    name: "town_halls",
    key: "code",
    columns: &[
        Column::required("code"),
        Column::required("name"),
        Column::required("municipality_code"),
    ],
    foreign_keys: &[ForeignKey::new("municipality_code", "municipalities")],
};

pub static TERRITORIAL_UNITS: TableSchema = TableSchema {
    name: "territorial_units",
    key: "ekatte",
    columns: &[
        Column::required("ekatte"),
        Column::required("name"),
        Column::new("type"),
        Column::required("town_hall_code"),
    ],
    foreign_keys: &[ForeignKey::new("town_hall_code", "town_halls")],
};

/// All tables, parents before children
pub static ALL_TABLES: &[&TableSchema] = &[&REGIONS, &MUNICIPALITIES, &TOWN_HALLS, &TERRITORIAL_UNITS];

pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().copied().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_in_dependency_order() {
        for (idx, table) in ALL_TABLES.iter().enumerate() {
            for dep in table.dependencies() {
                let dep_idx = ALL_TABLES
                    .iter()
                    .position(|t| t.name == dep)
                    .expect("dependency must be a known table");
                assert!(dep_idx < idx, "{} must come after {}", table.name, dep);
            }
        }
    }

    #[test]
    fn test_key_is_a_required_column() {
        for table in ALL_TABLES {
            assert!(table
                .required_columns()
                .any(|c| c.name == table.key));
        }
    }

    #[test]
    fn test_get_table() {
        assert_eq!(get_table("town_halls").map(|t| t.key), Some("code"));
        assert_eq!(get_table("territorial_units").map(|t| t.key), Some("ekatte"));
        assert!(get_table("settlements").is_none());
    }
}
