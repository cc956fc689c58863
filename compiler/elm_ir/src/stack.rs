//! Stack growth guard for the recursive passes.
//!
//! Parsing, name resolution and inference all recurse over the syntax tree;
//! deeply nested pipelines or generated code can exceed the default thread
//! stack. Wrap recursive entry points in [`ensure_sufficient_stack`].

/// Grow the stack when less than this much remains.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
#[cfg(not(target_arch = "wasm32"))]
const NEW_SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, allocating a fresh stack segment first if the current one is
/// nearly exhausted.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, NEW_SEGMENT, f)
}

/// WASM manages its own stack; no growth possible.
#[cfg(target_arch = "wasm32")]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
