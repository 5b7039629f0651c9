//! `vswitch_core` switches a source tree between mutually exclusive product
//! variants. Variant specific code lives in blocks delimited by directive
//! comments:
//!
//! ```text
//! // #ifdef pro
//! enablePremiumFeatures();
//! // #endif
//! ```
//!
//! Switching to a variant uncomments the lines of its blocks, comments out the
//! lines of every other variant's blocks and replaces variant specific tokens
//! (package names, identifiers, resource references) with the target's.
//!
//! ## Processing Pipeline
//!
//! ```text
//! vswitch.toml
//!   → Config (variants, aligned token lists, package dirs, targets)
//!   → Project (anchor check, package dir restore, file discovery)
//!   → Engine, per file in parallel:
//!       token substitution → directive lexer → comment toggler
//!   → rewrite only the files whose content changed
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Loading and validating `vswitch.toml`.
//! - [`project`]: Anchor check, target file discovery and package directory
//!   restoration.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use vswitch_core::ErrorPolicy;
//! use vswitch_core::apply_plan;
//! use vswitch_core::plan_switch;
//! use vswitch_core::project::load_project;
//!
//! let ctx = load_project(Path::new(".")).unwrap();
//! let variant = ctx.resolve_variant("pro").unwrap();
//! let files = ctx.collect_files().unwrap();
//! let plan = plan_switch(&variant, &ctx.variants.tokens, &files);
//! let result = apply_plan(&plan, ErrorPolicy::Continue);
//! assert!(!result.has_failures());
//! ```

pub use engine::*;
pub use error::*;
pub use syntax::*;
pub use toggler::*;
pub use variant::*;

pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
pub mod project;
mod syntax;
mod toggler;
mod variant;

#[cfg(test)]
mod __fixtures;
