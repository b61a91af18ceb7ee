//! Widget framework for the career dashboard.
//!
//! This crate owns the state and transition contracts behind the dashboard's
//! pluggable widgets: a reducer-driven store holding every widget's config
//! and runtime state, a lifecycle manager that creates widgets from
//! registered templates, a Kanban engine for the learning-roadmap widget with
//! WIP limits and milestone auto-progress, and per-widget error boundaries
//! that retry transient failures with exponential backoff. Rendering is left
//! to the host; the crate hands it a [`skeleton::WidgetView`] per widget.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`dashboard`] | Coordinator wiring every component together |
//! | [`store`] | Pure reducer and the single-writer [`store::WidgetStore`] |
//! | [`widget`] | Widget config, payload, and runtime-state types |
//! | [`registry`] | Widget type table: templates, validators, skeletons |
//! | [`lifecycle`] | Widget creation, id allocation, timer ownership |
//! | [`milestone`] | Milestone model and status state machine |
//! | [`kanban`] | Roadmap board moves, WIP limits, column stats |
//! | [`boundary`] | Per-widget fault containment and retry backoff |
//! | [`skeleton`] | Loading placeholders and view selection |
//! | [`provider`] | Async data provider port |
//! | [`persistence`] | Dashboard snapshots and snapshot storage |
//! | [`scheduler`] | Timer port with virtual and tokio implementations |
//! | [`clock`] | Wall-clock port |
//! | [`logging`] | Structured logging port over `tracing` |
//! | [`config`] | Environment-driven tuning |
//! | [`error`] | Error codes and the top-level error type |
//! | [`consts`] | Shared defaults and log component names |

pub mod boundary;
pub mod clock;
pub mod config;
pub mod consts;
pub mod dashboard;
pub mod error;
pub mod kanban;
pub mod lifecycle;
pub mod logging;
pub mod milestone;
pub mod persistence;
pub mod provider;
pub mod registry;
pub mod scheduler;
pub mod skeleton;
pub mod store;
pub mod widget;

#[cfg(test)]
pub mod test_helpers;
