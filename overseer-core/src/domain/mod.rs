//! Core domain types
//!
//! Snapshots of state owned by the automation backend. The client never
//! mutates these; it only replaces them wholesale on each fetch.

pub(crate) mod de;
pub mod job;
pub mod model;
pub mod training;
