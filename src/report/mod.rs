//! # Owner Reports
//!
//! Extras layered on top of the snapshot: assigning an owner to every task
//! from a study allocation list, and summarising due work per owner.
pub mod allocation;
pub mod summary;
