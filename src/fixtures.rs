//! Hand-verified layout fixtures.
//!
//! Each fixture pins the exact group partition and column assignment the
//! layout engine must produce. `daygrid verify` runs them from the command
//! line and the test suite runs them on every build.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::{
    domain::{Entry, LayoutResult, Placement},
    layout::{self, LayoutError},
};

pub struct Fixture {
    pub name: &'static str,
    /// `(instance_id, start, end)` in input order.
    pub entries: &'static [(&'static str, &'static str, &'static str)],
    pub groups: &'static [&'static [&'static str]],
    /// `(instance_id, column, columns)`
    pub placements: &'static [(&'static str, usize, usize)],
}

impl Fixture {
    pub fn entries(&self) -> Vec<Entry> {
        self.entries
            .iter()
            .map(|&(id, start, end)| Entry::new(id, start, end))
            .collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixtureMismatch {
    #[error("layout failed: {0}")]
    Layout(#[from] LayoutError),
    #[error("groups differ: expected {expected:?}, got {actual:?}")]
    Groups {
        expected: Vec<Vec<String>>,
        actual: Vec<Vec<String>>,
    },
    #[error("'{id}' expected {expected:?}, got {actual:?}")]
    Placement {
        id: String,
        expected: Placement,
        actual: Option<Placement>,
    },
    #[error("layout placed {actual} entries, fixture lists {expected}")]
    Count { expected: usize, actual: usize },
    #[error("invariant broken: {0}")]
    Invariant(String),
}

const ADJACENT_TOUCHING: Fixture = Fixture {
    name: "adjacent-touching",
    entries: &[("a", "09:00", "10:00"), ("b", "10:00", "11:00")],
    groups: &[&["a"], &["b"]],
    placements: &[("a", 0, 1), ("b", 0, 1)],
};

const NESTED_OVERLAPS: Fixture = Fixture {
    name: "nested-overlaps",
    entries: &[
        ("long", "09:00", "12:00"),
        ("short-a", "09:30", "10:00"),
        ("short-b", "10:00", "11:00"),
    ],
    groups: &[&["long", "short-a", "short-b"]],
    placements: &[("long", 0, 2), ("short-a", 1, 2), ("short-b", 1, 2)],
};

const SEVEN_STAGGERED: Fixture = Fixture {
    name: "seven-staggered",
    entries: &[
        ("s0", "09:00", "10:00"),
        ("s1", "09:01", "10:01"),
        ("s2", "09:02", "10:02"),
        ("s3", "09:03", "10:03"),
        ("s4", "09:04", "10:04"),
        ("s5", "09:05", "10:05"),
        ("s6", "09:06", "10:06"),
    ],
    groups: &[&["s0", "s1", "s2", "s3", "s4", "s5", "s6"]],
    placements: &[
        ("s0", 0, 7),
        ("s1", 1, 7),
        ("s2", 2, 7),
        ("s3", 3, 7),
        ("s4", 4, 7),
        ("s5", 5, 7),
        ("s6", 6, 7),
    ],
};

/// Clock times have minute resolution, so one minute is the shortest block
/// an entry can describe. Sub-minute durations are not representable.
const SHORT_ENTRIES: Fixture = Fixture {
    name: "short-entries",
    entries: &[
        ("x", "13:00", "13:05"),
        ("y", "13:02", "13:04"),
        ("z", "13:05", "13:06"),
    ],
    groups: &[&["x", "y"], &["z"]],
    placements: &[("x", 0, 2), ("y", 1, 2), ("z", 0, 1)],
};

const OUTSIDE_WINDOW: Fixture = Fixture {
    name: "outside-window",
    entries: &[
        ("early-a", "05:00", "06:00"),
        ("early-b", "05:30", "06:30"),
        ("late", "22:00", "23:30"),
        ("midnight", "23:30", "24:00"),
    ],
    groups: &[&["early-a", "early-b"], &["late"], &["midnight"]],
    placements: &[
        ("early-a", 0, 2),
        ("early-b", 1, 2),
        ("late", 0, 1),
        ("midnight", 0, 1),
    ],
};

const CHAIN_THROUGH_MIDDLE: Fixture = Fixture {
    name: "chain-through-middle",
    entries: &[
        ("a", "09:00", "10:00"),
        ("b", "09:45", "10:30"),
        ("c", "10:15", "11:00"),
    ],
    groups: &[&["a", "b", "c"]],
    placements: &[("a", 0, 2), ("b", 1, 2), ("c", 0, 2)],
};

const LONG_BLOCK_SIBLINGS: Fixture = Fixture {
    name: "long-block-siblings",
    entries: &[
        ("long", "09:00", "12:00"),
        ("p1", "09:00", "10:00"),
        ("p2", "10:00", "11:00"),
        ("p3", "11:00", "12:00"),
    ],
    groups: &[&["long", "p1", "p2", "p3"]],
    placements: &[("p1", 0, 2), ("long", 1, 2), ("p2", 0, 2), ("p3", 0, 2)],
};

const BRIDGE_MERGES_GROUPS: Fixture = Fixture {
    name: "bridge-merges-groups",
    entries: &[
        ("a", "09:00", "10:00"),
        ("b", "11:00", "12:00"),
        ("bridge", "09:30", "11:30"),
    ],
    groups: &[&["a", "b", "bridge"]],
    placements: &[("a", 0, 2), ("bridge", 1, 2), ("b", 0, 2)],
};

const SHUFFLED_STAIRCASE: Fixture = Fixture {
    name: "shuffled-staircase",
    entries: &[
        ("r7", "10:10", "10:35"),
        ("r3", "09:30", "09:55"),
        ("r0", "09:00", "09:25"),
        ("r5", "09:50", "10:15"),
        ("r1", "09:10", "09:35"),
        ("r6", "10:00", "10:25"),
        ("r2", "09:20", "09:45"),
        ("r4", "09:40", "10:05"),
    ],
    groups: &[&["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"]],
    placements: &[
        ("r0", 0, 3),
        ("r1", 1, 3),
        ("r2", 2, 3),
        ("r3", 0, 3),
        ("r4", 1, 3),
        ("r5", 2, 3),
        ("r6", 0, 3),
        ("r7", 1, 3),
    ],
};

static FIXTURES: [Fixture; 9] = [
    ADJACENT_TOUCHING,
    NESTED_OVERLAPS,
    SEVEN_STAGGERED,
    SHORT_ENTRIES,
    OUTSIDE_WINDOW,
    CHAIN_THROUGH_MIDDLE,
    LONG_BLOCK_SIBLINGS,
    BRIDGE_MERGES_GROUPS,
    SHUFFLED_STAIRCASE,
];

pub fn all() -> &'static [Fixture] {
    &FIXTURES
}

fn normalize<I, G, S>(groups: I) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = G>,
    G: IntoIterator<Item = S>,
    S: Into<String>,
{
    let set: BTreeSet<BTreeSet<String>> = groups
        .into_iter()
        .map(|group| group.into_iter().map(Into::into).collect())
        .collect();
    set.into_iter().map(|group| group.into_iter().collect()).collect()
}

/// Group partition as sorted identity lists.
pub fn actual_groups(entries: &[Entry]) -> Result<Vec<Vec<String>>, LayoutError> {
    let resolved = layout::resolve_spans(entries)?;
    let spans = resolved.as_slice();
    let groups = layout::group_overlaps(spans);
    Ok(normalize(groups.iter().map(move |group| {
        group
            .iter()
            .map(move |&position| entries[spans[position].index].instance_id.clone())
    })))
}

/// Checks the properties every layout must hold regardless of fixture.
pub fn check_invariants(
    entries: &[Entry],
    result: &LayoutResult,
) -> Result<(), FixtureMismatch> {
    let spans = layout::resolve_spans(entries)?;

    for (id, placement) in result {
        if placement.column >= placement.columns {
            return Err(FixtureMismatch::Invariant(format!(
                "'{id}' column {} not below width {}",
                placement.column, placement.columns
            )));
        }
    }

    for group in layout::group_overlaps(&spans) {
        let widths: BTreeSet<usize> = group
            .iter()
            .filter_map(|&p| result.get(&entries[spans[p].index].instance_id))
            .map(|placement| placement.columns)
            .collect();
        if widths.len() > 1 {
            return Err(FixtureMismatch::Invariant(format!(
                "group has mixed widths {widths:?}"
            )));
        }

        let mut by_column: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &p in &group {
            if let Some(placement) = result.get(&entries[spans[p].index].instance_id) {
                by_column.entry(placement.column).or_default().push(p);
            }
        }
        for members in by_column.values() {
            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    if spans[a].overlaps(&spans[b]) {
                        return Err(FixtureMismatch::Invariant(format!(
                            "'{}' and '{}' overlap in one column",
                            entries[spans[a].index].instance_id,
                            entries[spans[b].index].instance_id
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

pub fn verify(fixture: &Fixture) -> Result<(), FixtureMismatch> {
    let entries = fixture.entries();

    let expected_groups = normalize(fixture.groups.iter().map(|g| g.iter().copied()));
    let groups = actual_groups(&entries)?;
    if groups != expected_groups {
        return Err(FixtureMismatch::Groups {
            expected: expected_groups,
            actual: groups,
        });
    }

    let result = layout::layout(&entries)?;
    if result.len() != fixture.placements.len() {
        return Err(FixtureMismatch::Count {
            expected: fixture.placements.len(),
            actual: result.len(),
        });
    }
    for &(id, column, columns) in fixture.placements {
        let expected = Placement::new(column, columns);
        let actual = result.get(id).copied();
        if actual != Some(expected) {
            return Err(FixtureMismatch::Placement {
                id: id.to_string(),
                expected,
                actual,
            });
        }
    }

    check_invariants(&entries, &result)
}

/// Runs every fixture, returning `(name, outcome)` pairs in suite order.
pub fn verify_all() -> Vec<(&'static str, Result<(), FixtureMismatch>)> {
    all()
        .iter()
        .map(|fixture| (fixture.name, verify(fixture)))
        .collect()
}
