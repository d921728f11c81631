//! adrecon Library
//!
//! Reconciles Google Ads spend across a manager-account hierarchy with
//! conversion revenue from the Binom tracker.

pub mod application;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod persistence;
pub mod secrets;
