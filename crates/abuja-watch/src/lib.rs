//! Scoring, aggregation, and collation tracking for the FCT election monitoring service.
//!
//! The [`monitoring`] module owns the election domain: collation reports, the risk
//! classifier, dashboard aggregates, incidents, and the REST router. [`auth`] issues and
//! resolves operator sessions for the data-entry surface.

pub mod auth;
pub mod config;
pub mod error;
pub mod monitoring;
pub mod telemetry;
