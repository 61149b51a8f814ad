//! Configuration and embedding file IO for fmd.
//!
//! Embeddings arrive as JSON files produced by an external feature
//! extractor; this crate turns them into [`fmd_core::EmbeddingMatrix`]
//! values and loads the layered configuration used by the command line.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod embeddings;
pub mod error;

pub use config::{Config, LoggingConfig};
pub use embeddings::{embeddings_from_str, load_embeddings, save_embeddings};
pub use error::{LoadError, LoadResult};
