//! lfscript-lib: turns a parsed Linux From Scratch book into build scripts
//!
//! The crate provides:
//! - `Document`: the ordered sections and snippets of one book version
//! - `Adjustments`: directives and placeholder values adapting that version
//! - `Book`: drives generation section by section into a `Layout`
//! - `SbuLedger`: the build time accounting the generated scripts persist

pub mod adjust;
pub mod book;
pub mod config;
pub mod consts;
pub mod directive;
pub mod document;
pub mod generate;
pub mod layout;
pub mod params;
pub mod placeholder;
pub mod sbu;
pub mod section;
pub mod snippet;

pub use adjust::{AdjustError, Adjustments};
pub use book::{Book, SectionOutline};
pub use config::{Config, ConfigError};
pub use document::{Document, DocumentError};
pub use generate::{GenerateError, GenerationReport};
pub use layout::Layout;
pub use sbu::{SbuError, SbuLedger};
