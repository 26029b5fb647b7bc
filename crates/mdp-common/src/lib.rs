//! MDP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the MDP project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all MDP workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: Centralized tracing setup
//! - **Types**: Domain record types and scalar coercion rules
//!
//! # Example
//!
//! ```
//! use mdp_common::types::{parse_box_office, parse_year};
//!
//! assert_eq!(parse_box_office("$829,895,144"), Some(829_895_144.0));
//! assert_eq!(parse_year("unknown"), None);
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{MdpError, Result};
