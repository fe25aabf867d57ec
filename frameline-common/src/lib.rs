//! # Frameline Common Library
//!
//! Shared code for the Frameline review/payments service including:
//! - Database models, schema init, and queries
//! - Change-feed event types (ChangeEvent enum) and EventBus
//! - Timeline comment marker math
//! - Project status transition table
//! - Payment signature primitives
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod gateway;
pub mod review;
pub mod status;
pub mod timeline;

pub use error::{Error, Result};
pub use status::ProjectStatus;
