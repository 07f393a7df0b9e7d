//! Business logic services for the marketplace.
//!
//! # Services
//!
//! - `auth` - Registration, password login and account updates
//! - `listings` - Listing lookup, creation and owner-checked deletion

pub mod auth;
pub mod listings;

pub use auth::{AuthError, AuthService};
pub use listings::{ListingError, ListingService};
