//! Infrastructure layer for external integrations.
//!
//! This layer implements the store contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - In-memory and PostgreSQL catalog stores

pub mod persistence;
