//! Type construction helpers.

use smallvec::SmallVec;

use super::{Name, Pool, TypeData};
use crate::{names, Idx};

impl Pool {
    /// `name arg1 arg2 ...` with a canonical type name.
    pub fn app(&mut self, name: &str, args: &[Idx]) -> Idx {
        self.intern(TypeData::App {
            name: Name::from(name),
            args: SmallVec::from_slice(args),
        })
    }

    pub fn list(&mut self, elem: Idx) -> Idx {
        self.app(names::LIST, &[elem])
    }

    pub fn maybe(&mut self, inner: Idx) -> Idx {
        self.app(names::MAYBE, &[inner])
    }

    /// `param -> ret`
    pub fn function(&mut self, param: Idx, ret: Idx) -> Idx {
        self.intern(TypeData::Function { param, ret })
    }

    /// `p1 -> p2 -> ... -> ret`
    pub fn function_n(&mut self, params: &[Idx], ret: Idx) -> Idx {
        params
            .iter()
            .rev()
            .fold(ret, |acc, &param| self.function(param, acc))
    }

    /// Tuple type. No elements is `()`; one element is that element.
    pub fn tuple(&mut self, elems: &[Idx]) -> Idx {
        match elems {
            [] => Idx::UNIT,
            [single] => *single,
            _ => self.intern(TypeData::Tuple(SmallVec::from_slice(elems))),
        }
    }

    /// Record row. Fields are sorted here; an empty row with a tail is the
    /// tail itself.
    pub fn record(&mut self, mut fields: Vec<(Name, Idx)>, ext: Option<Idx>) -> Idx {
        if fields.is_empty() {
            if let Some(ext) = ext {
                return ext;
            }
        }
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields.dedup_by(|a, b| a.0 == b.0);
        self.intern(TypeData::Record { fields, ext })
    }
}
