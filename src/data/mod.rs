//! Data layer: timetable loading, column classification, and filtering.
//!
//! Architecture:
//! ```text
//!   <base>/<date>/<course>.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  fetch    │  worker thread, generation-tagged → stale responses dropped
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse CSV → Dataset / LoadState
//!   └──────────┘
//!        │
//!        ├──────────────────┐
//!        ▼                  ▼
//!   ┌──────────┐      ┌──────────┐
//!   │ classify  │      │  filter   │  FilterState → visible indices
//!   └──────────┘      └──────────┘
//!    option lists
//! ```
//!
//! `index` handles the two startup indexes (dates, course codes) that drive
//! the source selection.

pub mod classify;
pub mod fetch;
pub mod filter;
pub mod index;
pub mod loader;
pub mod model;
