//! Lookbook hotspot logic shared by the admin and storefront routes.
//!
//! Pure state handling only; persistence lives in [`crate::db`].

mod editor;
mod filter;
mod render;

pub use editor::*;
pub use filter::*;
pub use render::*;
