// src/domain/counter.rs
use crate::constants::COUNTER_PALETTE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which denormalized counter collection a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    Tag,
    Subject,
}

impl CounterKind {
    /// Collection name in the document backend.
    pub fn collection(&self) -> &'static str {
        match self {
            CounterKind::Tag => "tags",
            CounterKind::Subject => "subjects",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Advisory usage count of a tag or subject name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub name: String,
    pub color: String,
    pub count: i64,
}

impl Counter {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let color = display_color(&name).to_string();
        Self {
            name,
            color,
            count: 0,
        }
    }
}

/// Palette entry picked by the sum of the name's UTF-16 code units.
pub fn display_color(name: &str) -> &'static str {
    let sum: usize = name.encode_utf16().map(usize::from).sum();
    COUNTER_PALETTE[sum % COUNTER_PALETTE.len()]
}
