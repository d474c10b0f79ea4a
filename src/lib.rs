//! Tasktrail: task management backend core with an audit trail.
//!
//! This crate provides the task, comment and history pipeline behind a
//! task-management REST API. HTTP routing and credential handling live
//! outside the crate; they hand an authenticated [`task::domain::Actor`] and
//! plain request records to the services exposed here.
//!
//! # Architecture
//!
//! Tasktrail follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`task`]: Tasks, comments, history diffing and the update pipeline
//! - [`config`]: Environment-driven store and logging configuration
//! - [`telemetry`]: Structured logging setup

pub mod config;
pub mod task;
pub mod telemetry;
