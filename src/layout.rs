//! Side-by-side placement of a day's entries.
//!
//! Entries are clustered by transitive overlap, then each cluster is packed
//! into columns. Every member of a cluster reports the cluster's width.

use std::collections::HashSet;

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use crate::domain::{Entry, EntryError, LayoutResult, Placement, Span};

pub mod grouper;
pub mod packer;

pub use grouper::group_overlaps;
pub use packer::{PackedGroup, pack_columns};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("{}", describe_invalid(.0))]
    InvalidEntries(Vec<EntryError>),
}

fn describe_invalid(errors: &[EntryError]) -> String {
    let noun = if errors.len() == 1 { "entry" } else { "entries" };
    format!(
        "{} invalid {}: {}",
        errors.len(),
        noun,
        errors.iter().map(|e| e.to_string()).join("; ")
    )
}

/// Resolves every entry to minutes, collecting all failures at once.
pub fn resolve_spans(entries: &[Entry]) -> Result<Vec<Span>, LayoutError> {
    let mut spans = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        if !seen.insert(entry.instance_id.as_str()) {
            errors.push(EntryError::DuplicateId(entry.instance_id.clone()));
            continue;
        }
        match Span::resolve(entry, index) {
            Ok(span) => spans.push(span),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(spans)
    } else {
        Err(LayoutError::InvalidEntries(errors))
    }
}

/// Computes `{column, columns}` for every entry of one day.
pub fn layout(entries: &[Entry]) -> Result<LayoutResult, LayoutError> {
    let spans = resolve_spans(entries)?;
    let groups = group_overlaps(&spans);

    let mut result = LayoutResult::new();
    let mut widest = 0;

    for group in &groups {
        let packed = pack_columns(&spans, group);
        trace!(members = group.len(), columns = packed.columns, "packed group");
        widest = widest.max(packed.columns);

        for (position, column) in packed.assignments {
            let entry = &entries[spans[position].index];
            result.insert(
                entry.instance_id.clone(),
                Placement::new(column, packed.columns),
            );
        }
    }

    debug!(
        entries = entries.len(),
        groups = groups.len(),
        widest,
        "layout pass complete"
    );

    Ok(result)
}
