//! Sorting manifest: domain types, loading, validation, errors.
//!
//! - [`types`]: manifest structs
//! - [`manifest`]: parse / load / validate
//! - [`error`]: [`ManifestError`]

pub mod error;
pub mod manifest;
pub mod types;

pub use error::ManifestError;
pub use manifest::{LoadedManifest, ManifestFormat, ManifestWarning};
pub use types::{Conversion, ConversionName, Manifest, Options, Strategy};
