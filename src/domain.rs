use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::time::{self, TimeError};

/// One time-stamped block on a single day. Only the identity and the two
/// clock strings matter for layout; the rest is carried for renderers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub instance_id: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Entry {
    pub fn new(instance_id: &str, start_time: &str, end_time: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            title: String::new(),
            color: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn duration_minutes(&self) -> Result<u32, EntryError> {
        let span = Span::resolve(self, 0)?;
        Ok(span.end - span.start)
    }
}

/// An entry resolved to minutes, remembering its position in the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub index: usize,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn resolve(entry: &Entry, index: usize) -> Result<Self, EntryError> {
        let parse = |value: &str| {
            time::minutes_from_midnight(value).map_err(|source| EntryError::Time {
                instance_id: entry.instance_id.clone(),
                source,
            })
        };
        let start = parse(&entry.start_time)?;
        let end = parse(&entry.end_time)?;

        if end <= start {
            return Err(EntryError::NonPositiveDuration {
                instance_id: entry.instance_id.clone(),
                start_time: entry.start_time.clone(),
                end_time: entry.end_time.clone(),
            });
        }

        Ok(Self { index, start, end })
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        time::overlaps(self.start, self.end, other.start, other.end)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("entry '{instance_id}': {source}")]
    Time {
        instance_id: String,
        #[source]
        source: TimeError,
    },
    #[error("entry '{instance_id}' ends at {end_time}, not after its start {start_time}")]
    NonPositiveDuration {
        instance_id: String,
        start_time: String,
        end_time: String,
    },
    #[error("entry id '{0}' appears more than once")]
    DuplicateId(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub column: usize,
    pub columns: usize,
}

impl Placement {
    pub fn new(column: usize, columns: usize) -> Self {
        Placement { column, columns }
    }
}

pub type LayoutResult = BTreeMap<String, Placement>;
