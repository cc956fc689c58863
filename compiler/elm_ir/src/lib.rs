//! Shared vocabulary of the Elm analysis core: spans, positions, file
//! identifiers and the syntax tree.
//!
//! Every other crate in the workspace depends on this one; it depends on
//! nothing but `serde` (and `stacker` for the stack guard).

pub mod ast;
mod line_index;
mod namespace;
mod span;
mod stack;
mod uri;

pub use line_index::{LineIndex, Position};
pub use namespace::Namespace;
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use uri::FileUri;
