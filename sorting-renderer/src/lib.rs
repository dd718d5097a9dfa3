//! # sorting-renderer
//!
//! Tera-based substitution of named variables into manifest templates.
//!
//! ## Usage
//!
//! ```rust
//! use sorting_renderer::{BaseModel, ConversionModel, TemplateRenderer};
//!
//! let base = BaseModel::new("/work", "/home/me");
//! let model = ConversionModel::new(base, "/work/a.png", "/home/me/a.webp");
//! let renderer = TemplateRenderer::new();
//! let argv: Vec<String> = ["cwebp", "{{SOURCE}}", "-o", "{{TARGET}}"]
//!     .iter()
//!     .map(|t| renderer.render(t, &model))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(argv, ["cwebp", "/work/a.png", "-o", "/home/me/a.webp"]);
//! ```

pub mod engine;
pub mod error;
pub mod model;

pub use engine::{referenced_names, TemplateRenderer};
pub use error::RenderError;
pub use model::{BaseModel, ConversionModel, TargetModel, VariableModel};
