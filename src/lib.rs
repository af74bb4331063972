//! Core library for document-ai-viewer
pub mod api;
pub mod config;
pub mod decode;
pub mod display;
pub mod error;
pub mod models;
pub mod render;
pub mod util;

pub use error::{Result, ViewerError};
