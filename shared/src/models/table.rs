//! Table Model (mesa)

use serde::{Deserialize, Serialize};

use crate::util::de_id;

/// Occupancy state of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableState {
    #[default]
    #[serde(rename = "libre")]
    Free,
    #[serde(rename = "ocupada")]
    Occupied,
}

impl TableState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableState::Free => "libre",
            TableState::Occupied => "ocupada",
        }
    }
}

impl std::fmt::Display for TableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restaurant table entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Display number shown to staff
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "estado", default)]
    pub state: TableState,
    /// Ad hoc table for walk-ins, removed once paid
    #[serde(rename = "es_temporal", default)]
    pub temporary: bool,
}

impl Table {
    pub fn is_occupied(&self) -> bool {
        self.state == TableState::Occupied
    }

    /// Whether the table belongs in the directory listing.
    ///
    /// Permanent tables always show; temporary ones only while occupied.
    pub fn is_listed(&self) -> bool {
        !self.temporary || self.is_occupied()
    }

    pub fn with_state(&self, state: TableState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}

/// Create table payload (`POST /mesas`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCreate {
    #[serde(rename = "numero")]
    pub number: u32,
    #[serde(rename = "estado")]
    pub state: TableState,
    #[serde(rename = "es_temporal")]
    pub temporary: bool,
}

impl TableCreate {
    /// Walk-in table, occupied from the start
    pub fn temporary(number: u32) -> Self {
        Self {
            number,
            state: TableState::Occupied,
            temporary: true,
        }
    }
}
