//! Domain ports (traits)
//!
//! The controller only talks to the outside world through these traits.
//! Adapters provide the HTTP implementations; tests use in-memory ones.

pub mod backend;
pub mod navigator;
pub mod screen;

pub use backend::FeedBackend;
pub use navigator::Navigator;
pub use screen::Screen;
