//! Intune settings catalog policies as plain documents
//!
//! `catalog` maps Graph's settings catalog JSON to and from an editable policy document; `graph`
//! talks to Microsoft Graph; `cmd` is the CLI built on top of both.

pub mod catalog;
pub mod cmd;
pub mod config;
pub mod error;
pub mod graph;

pub use error::{CatalogError, Result};
