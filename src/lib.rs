//! imgrelay - HTTP relay for text-to-image generation APIs.
//!
//! This library provides the core functionality for the imgrelay proxy,
//! including configuration, model dispatch, and upstream relaying.

pub mod config;
pub mod error;
pub mod proxy;
pub mod router;

pub use config::Config;
pub use error::{Error, Result};
