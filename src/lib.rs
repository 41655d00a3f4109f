//! Hanlift - lift hard-coded Korean text out of TSX sources.
//!
//! Hanlift walks a front-end source tree, finds Hangul text in markup,
//! string literals, and attribute values, replaces each occurrence with a
//! `{t("<key>")}` call, and writes a nested JSON resource mapping every key
//! back to its original text.
//!
//! # Quick Start
//!
//! ```no_run
//! use hanlift::builder::Lift;
//!
//! let report = Lift::new("./src")
//!     .output("./public/locales/ko.json")
//!     .sorted(true)
//!     .run()
//!     .unwrap();
//!
//! println!("Rewrote {} files", report.files.len());
//! ```
//!
//! # Keys
//!
//! A string on line 5 of `components/Banner.tsx` (relative to the root) is
//! stored under `components.Banner.line_5_1`. The trailing number counts
//! occurrences within the line, in syntax-tree order.
//!
//! # Modules
//!
//! - [`script`] - Target-script detection
//! - [`walker`] - Source file discovery
//! - [`extract`] - Tree-sitter based span extraction
//! - [`keys`] - Key path derivation
//! - [`resource`] - Resource tree accumulation
//! - [`rewrite`] - Token splicing
//! - [`output`] - Resource file writing
//! - [`builder`] - Fluent API driving a whole run

pub mod script;
pub mod errors;
pub mod walker;
pub mod extract;
pub mod keys;
pub mod resource;
pub mod rewrite;
pub mod output;
pub mod builder;

// Re-export key types at crate root for convenience
pub use builder::{lift_source, FileReport, Lift, LiftReport, LiftedSource};
pub use errors::LiftError;
pub use extract::{extract_spans, ExtractError, Grammar, LineGroups, TextSpan};
pub use keys::{build_key_path, FileKey};
pub use output::{write_resource, OutputError};
pub use resource::{accumulate, Replacement, ResourceTree};
pub use rewrite::{replacement_token, rewrite, RewriteError};
pub use script::contains_target_script;
pub use walker::{WalkError, WalkOptions};
