//! Wikiparse Core
//!
//! This crate provides the token model, enumerations, and error
//! definitions shared by the wikiparse crates.
//!
//! # Overview
//!
//! The core crate contains:
//! - [`Token`] - A transient record describing one recognized construct
//! - [`TokenType`], [`ErrorCode`], [`ParseMode`] - Closed enumerations
//! - [`ParserConfig`] - The feature toggles read during a parse call
//! - [`ParseStats`] - Per-parser diagnostic counters
//! - [`WikiError`] - Error types

pub mod enums;
pub mod error;
pub mod state;
pub mod types;

pub use enums::{ErrorCode, ParseMode, TokenType};
pub use error::{Result, WikiError};
pub use state::ParseStats;
pub use types::{ParserConfig, Token};
