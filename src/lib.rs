//! AI Stylist orchestration layer for a furniture storefront.
//!
//! Turns text, uploaded or captured photos and remote product images into
//! provider requests for three operations: a multi-turn stylist chat, placing a
//! product into a room photo, and animating a product photo into a short
//! parallax video. Provider failures are normalized into one error taxonomy.

pub mod ai;
pub mod error;
pub mod media;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod session;
pub mod stylist;

pub use error::{Error, ErrorKind, Result};
