//! Avatar generator - AI avatars from randomized prompts or restyled photos
//!
//! Composes a randomized minimalist-face prompt (or a fixed style-transfer
//! instruction for an uploaded photo), sends it to a remote image model, and
//! hands back the generated image bytes.

pub mod ai;
pub mod app;
pub mod composer;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod vocabulary;

pub use error::{Error, ErrorKind, Result};
