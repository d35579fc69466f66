//! Rank resumes against job descriptions using an external vector index.
//!
//! [`index`] is the protocol client for the vector index service. [`vector`]
//! turns text into embeddings, [`extract`] pulls text out of PDFs and
//! [`matcher`] ties them into upload and match operations.

pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod matcher;
pub mod vector;

pub use config::Settings;
pub use error::{MatcherError, Result};
pub use index::{IndexClient, IndexError, SearchResult};
pub use matcher::{MatchReport, ResumeMatcher, UploadReceipt};
