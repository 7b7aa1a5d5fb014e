//! Core domain concepts shared across all subdomains.
//!
//! - [`image::ImageInput`]: an in-memory photograph handed to backends
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod image;
