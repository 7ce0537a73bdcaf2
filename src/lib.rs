//! Queue-triggered image compressor
//!
//! For every queue notification, fetches the referenced image from object
//! storage, halves its dimensions, re-encodes it as JPEG and writes it back
//! over the original key.

pub mod error;
pub mod handler;
pub mod image;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
