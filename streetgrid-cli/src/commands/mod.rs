//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`bbox`] - Single bounding-box metadata query
//! - [`download`] - Image download from a result file
//! - [`init`] - Configuration initialization
//! - [`place`] - Place name to boundary polygon
//! - [`query`] - Tiled query over a region (main command)

pub mod bbox;
pub mod common;
pub mod download;
pub mod init;
pub mod place;
pub mod query;
