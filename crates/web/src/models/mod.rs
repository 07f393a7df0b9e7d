//! Domain models for the marketplace.

pub mod item;
pub mod session;
pub mod user;

pub use item::{DEFAULT_ITEM_IMAGE, Item};
pub use session::{CurrentUser, Flash, FlashLevel, keys as session_keys};
pub use user::User;
