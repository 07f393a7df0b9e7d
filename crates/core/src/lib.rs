//! Krishop Core - Shared domain types.
//!
//! This crate provides the validated types used across all Krishop components:
//! - `web` - The marketplace web application
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. Every constructor validates its input, so a value of one of
//! these types is always well-formed.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, usernames, emails, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
