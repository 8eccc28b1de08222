//! Shared pieces of folio: the content model, configuration, errors, and the
//! client for the content store.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod groq;
pub mod model;
pub mod perf;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::client::ContentClient;
pub use crate::config::SanityConfig;
pub use crate::error::{FolioError, ParseError, SerDeError};
pub use crate::model::{HeadingLevel, Node, Post, plain_text};
