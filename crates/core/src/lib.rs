//! Domain types shared across the LiftLog backend crates.
//!
//! This crate is deliberately free of I/O dependencies: everything here is
//! pure data and pure functions, so the db and api crates can both depend on
//! it without pulling in each other's stacks.

pub mod device;
pub mod error;
pub mod recovery;
pub mod types;
pub mod workout;
