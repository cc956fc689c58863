//! Polymorphic type schemes.

use smallvec::SmallVec;

use crate::Idx;

/// `forall vars. body`, with `vars` given as pool variable ids.
///
/// Schemes only make sense inside the pool that generalized them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheme {
    pub vars: SmallVec<[u32; 4]>,
    pub body: Idx,
}

impl Scheme {
    /// A scheme with no quantified variables.
    pub fn mono(body: Idx) -> Self {
        Scheme {
            vars: SmallVec::new(),
            body,
        }
    }

    #[inline]
    pub fn is_mono(&self) -> bool {
        self.vars.is_empty()
    }
}
