//! Accept PDF uploads over HTTP, run them through an external OCR
//! pipeline, and serve back a plain-text extraction and a searchable PDF.
//!
//! The heavy lifting happens in the external tool. This crate is the
//! request/response and directory-naming shim around it: one upload form,
//! one blocking pipeline invocation per upload, and a download tree.

pub mod config;
pub mod job;
pub mod pipeline;
pub mod prelude;
pub mod server;
