//! Type representation and unification for Elm inference.
//!
//! # Architecture
//!
//! - [`Idx`]: 32-bit handle into a [`Pool`]
//! - [`Pool`]: hash-consed type terms plus a mutable variable table
//! - [`UnifyEngine`]: link-based unification with record rows, variable
//!   constraints and rank-based let-generalization
//! - [`Ty`]: pool-independent tree used for anything that outlives one
//!   inference run
//!
//! A pool is created per declaration group and dropped afterwards; cached
//! results are stored as [`Ty`] and imported into the next pool on demand.

mod constraint;
mod flags;
mod idx;
pub mod names;
mod pool;
mod scheme;
mod ty;
mod unify;

pub use constraint::VarKind;
pub use flags::TypeFlags;
pub use idx::Idx;
pub use pool::{ImportMode, Name, Pool, TypeData, VarNamer, VarState};
pub use scheme::Scheme;
pub use ty::{short_name, Ty};
pub use unify::{Rank, UnifyEngine, UnifyError};
