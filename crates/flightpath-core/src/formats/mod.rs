//! # Formats Module
//!
//! Serialized forms of values held in durable storage.

mod envelope;

pub use envelope::*;
