//! Column layout for a single day's timeline.
//!
//! Entries that overlap in time, directly or through a chain of overlaps,
//! share a cluster and are packed side by side; everything else gets the
//! full width. See [`layout::layout`].

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod fixtures;
pub mod layout;
pub mod storage;
pub mod time;

pub use domain::{Entry, LayoutResult, Placement};
pub use layout::{LayoutError, layout};
