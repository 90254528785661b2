//! Data models for the lookbook backend.
//!
//! JSON shapes use camelCase for the storefront and admin clients; the
//! matching table columns keep the snake_case names of the store.

mod filter_term;
mod hotspot;
mod lookbook;
mod product;
mod revision;

pub use filter_term::*;
pub use hotspot::*;
pub use lookbook::*;
pub use product::*;
pub use revision::*;
