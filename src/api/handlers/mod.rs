//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod entries;
pub mod health;
pub mod stream;

pub use entries::{
    create_entry_handler, delete_entry_handler, list_entries_handler, update_entry_handler,
};
pub use health::health_handler;
pub use stream::entries_stream_handler;
