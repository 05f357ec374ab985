//! # Pinpoint Editor
//!
//! Writes visual edits back into the source that produced the element.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ EditRequest: file, line, column, new value  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ locator: exact (line, column) → node        │
//! │  - raw or annotated source                  │
//! │  - no nearest match                         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ patcher: one literal span replaced          │
//! │  - style / content / attribute              │
//! │  - re-parsed before the atomic write        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ batch: ordered, failures isolated           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pinpoint_editor::{apply_batch, EditRequest};
//!
//! let batch = apply_batch("/path/to/app", &[
//!     EditRequest::style("src/App.tsx", 12, 4, "p-4 text-lg"),
//!     EditRequest::content("src/App.tsx", 13, 6, "Welcome back"),
//! ]);
//! assert_eq!(batch.summary.failed, 0);
//! ```

mod batch;
mod errors;
mod literal;
mod locator;
mod patcher;
mod types;

pub use batch::apply_batch;
pub use errors::{LocateError, PatchError, PatchResult};
pub use literal::{attribute_literal, escape_text, script_string, template_string};
pub use locator::{locate, LocatedNode, Locator};
pub use patcher::{apply_edit, PatchOutcome, Patcher, TextEdit};
pub use types::{BatchResult, BatchSummary, EditKind, EditRequest, EditResult};
