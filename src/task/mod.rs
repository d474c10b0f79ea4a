//! Task management with a field-level audit trail.
//!
//! Actors create, read, update and delete tasks and comments. Every task
//! update that changes a tracked field (title, description, status,
//! assignee) appends an immutable history record in the same transaction as
//! the update itself. The module follows hexagonal architecture:
//!
//! - Domain types, the diff engine and validation rules in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
