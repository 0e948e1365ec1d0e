//! File I/O operations for JSON documents.
//!
//! This module loads document text from disk or stdin, with gzip support.

pub mod loader;
