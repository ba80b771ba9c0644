//! Text renderer for resolved override chains
//!
//! This module takes a ResolvedChain and produces the final text, filling each
//! fragment of the root definition from the most-derived layer that defines it.

mod text;

pub use text::render;
