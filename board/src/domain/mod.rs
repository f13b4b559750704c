//! Domain layer
//!
//! - `entities`: feed payloads and board value types
//! - `ports`: traits for the backend, the navigator and the screen

pub mod entities;
pub mod ports;
