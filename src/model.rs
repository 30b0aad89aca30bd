//! Typed EKATTE records, one per table

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{TableSchema, MUNICIPALITIES, REGIONS, TERRITORIAL_UNITS, TOWN_HALLS};

/// The four record kinds, parents before children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Region,
    Municipality,
    TownHall,
    TerritorialUnit,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Region,
        RecordKind::Municipality,
        RecordKind::TownHall,
        RecordKind::TerritorialUnit,
    ];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            RecordKind::Region => &REGIONS,
            RecordKind::Municipality => &MUNICIPALITIES,
            RecordKind::TownHall => &TOWN_HALLS,
            RecordKind::TerritorialUnit => &TERRITORIAL_UNITS,
        }
    }

    pub fn table(self) -> &'static str {
        self.schema().name
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Region => write!(f, "regions"),
            RecordKind::Municipality => write!(f, "municipalities"),
            RecordKind::TownHall => write!(f, "town halls"),
            RecordKind::TerritorialUnit => write!(f, "territorial units"),
        }
    }
}

/// A record that maps onto one of the EKATTE tables
pub trait Record: DeserializeOwned {
    const KIND: RecordKind;

    /// Natural key value
    fn key(&self) -> &str;

    /// Value of a table column, `None` when absent
    fn field(&self, column: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub code: String,
    pub name: String,
    pub region_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownHall {
    pub code: String,
    pub name: String,
    pub municipality_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritorialUnit {
    pub ekatte: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub town_hall_code: String,
}

impl Record for Region {
    const KIND: RecordKind = RecordKind::Region;

    fn key(&self) -> &str {
        &self.code
    }

    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "code" => Some(&self.code),
            "name" => Some(&self.name),
            _ => None,
        }
    }
}

impl Record for Municipality {
    const KIND: RecordKind = RecordKind::Municipality;

    fn key(&self) -> &str {
        &self.code
    }

    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "code" => Some(&self.code),
            "name" => Some(&self.name),
            "region_code" => Some(&self.region_code),
            _ => None,
        }
    }
}

impl Record for TownHall {
    const KIND: RecordKind = RecordKind::TownHall;

    fn key(&self) -> &str {
        &self.code
    }

    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "code" => Some(&self.code),
            "name" => Some(&self.name),
            "municipality_code" => Some(&self.municipality_code),
            _ => None,
        }
    }
}

impl Record for TerritorialUnit {
    const KIND: RecordKind = RecordKind::TerritorialUnit;

    fn key(&self) -> &str {
        &self.ekatte
    }

    fn field(&self, column: &str) -> Option<&str> {
        match column {
            "ekatte" => Some(&self.ekatte),
            "name" => Some(&self.name),
            "type" => self.kind.as_deref(),
            "town_hall_code" => Some(&self.town_hall_code),
            _ => None,
        }
    }
}
