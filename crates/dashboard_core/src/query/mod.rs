//! Query layer over store snapshots.
//!
//! # Responsibility
//! - Compose filter predicates without mutating snapshots.
//!
//! # See also
//! - `crate::metrics` for aggregate calculations over the same snapshots.

pub mod filter;
