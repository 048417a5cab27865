//! Web dashboard layer for browser-based UI.
//!
//! Server-rendered pages built from the same view state and pure rendering
//! functions the catalog controller uses. Each page subscribes to
//! `/events` and swaps in re-rendered fragments whenever the catalog changes.
//! Uses Askama templates for server-side rendering.
//!
//! # Modules
//!
//! - [`handlers`] - Page, form, and live event handlers
//! - [`routes`] - Dashboard route configuration

pub mod handlers;
pub mod routes;
