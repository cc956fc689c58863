use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

use super::*;
use crate::Ty;

#[test]
fn builtins_sit_at_fixed_indices() {
    let pool = Pool::new();
    assert_eq!(pool.as_app(Idx::INT), Some((names::INT, &[][..])));
    assert_eq!(pool.as_app(Idx::STRING), Some((names::STRING, &[][..])));
    assert_eq!(pool.get(Idx::UNIT), &TypeData::Unit);
    assert_eq!(pool.len(), Idx::BUILTIN_COUNT as usize);
}

#[test]
fn structural_terms_are_interned() {
    let mut pool = Pool::new();
    let a = pool.list(Idx::INT);
    let b = pool.app(names::LIST, &[Idx::INT]);
    assert_eq!(a, b);
    let f = pool.function(a, Idx::BOOL);
    assert_eq!(f, pool.function(b, Idx::BOOL));
    assert!(pool.flags(f).contains(TypeFlags::IS_FUNCTION));
}

#[test]
fn variables_are_never_shared() {
    let mut pool = Pool::new();
    let a = pool.fresh_var(Rank::FIRST, VarKind::Flex, None);
    let b = pool.fresh_var(Rank::FIRST, VarKind::Flex, None);
    assert_ne!(a, b);
    assert_eq!(pool.var_count(), 2);
    let list = pool.list(a);
    assert!(pool.flags(list).has_vars());
}

#[test]
fn record_fields_are_sorted() {
    let mut pool = Pool::new();
    let r1 = pool.record(
        vec![(Name::from("b"), Idx::INT), (Name::from("a"), Idx::BOOL)],
        None,
    );
    let r2 = pool.record(
        vec![(Name::from("a"), Idx::BOOL), (Name::from("b"), Idx::INT)],
        None,
    );
    assert_eq!(r1, r2);
    assert_eq!(pool.format_type(r1), "{ a : Bool, b : Int }");
}

#[test]
fn tuple_of_one_is_the_element() {
    let mut pool = Pool::new();
    assert_eq!(pool.tuple(&[]), Idx::UNIT);
    assert_eq!(pool.tuple(&[Idx::CHAR]), Idx::CHAR);
}

#[test]
fn export_names_anonymous_variables_in_order() {
    let mut pool = Pool::new();
    let a = pool.fresh_var(Rank::FIRST, VarKind::Flex, None);
    let b = pool.fresh_var(Rank::FIRST, VarKind::Flex, None);
    let n = pool.fresh_var(Rank::FIRST, VarKind::Number, None);
    let f = pool.function_n(&[a, b, n], a);
    assert_eq!(pool.format_type(f), "a -> b -> number -> a");
}

#[test]
fn export_honors_rigid_names() {
    let mut pool = Pool::new();
    let flex = pool.fresh_var(Rank::FIRST, VarKind::Flex, None);
    let rigid = pool.rigid_var(Name::from("a"));
    let f = pool.function(flex, rigid);
    assert_eq!(pool.format_type(f), "b -> a");
}

#[test]
fn import_reuses_names_across_occurrences() {
    let mut pool = Pool::new();
    let ty = Ty::function(
        [Ty::var("a"), Ty::app(names::LIST, vec![Ty::var("a")])],
        Ty::var("comparable"),
    );
    let mut vars = FxHashMap::default();
    let idx = pool.import(&ty, ImportMode::Flexible(Rank::FIRST), &mut vars);
    assert_eq!(vars.len(), 2);
    assert_eq!(pool.export(idx), ty);

    let comparable = vars["comparable"];
    let id = pool.var_id(comparable).unwrap();
    assert!(matches!(
        pool.var_state(id),
        VarState::Unbound {
            kind: VarKind::Comparable,
            ..
        }
    ));
}

#[test]
fn rigid_import_makes_rigid_variables() {
    let mut pool = Pool::new();
    let ty = Ty::function([Ty::var("msg")], Ty::var("msg"));
    let mut vars = FxHashMap::default();
    let idx = pool.import(&ty, ImportMode::Rigid, &mut vars);
    assert!(pool.flags(idx).contains(TypeFlags::HAS_RIGID));
    assert_eq!(pool.format_type(idx), "msg -> msg");
}

#[test]
fn extensible_record_round_trips() {
    let mut pool = Pool::new();
    let ty = Ty::Record {
        fields: vec![("name".to_string(), Ty::app(names::STRING, vec![]))],
        ext: Some("r".to_string()),
    };
    let mut vars = FxHashMap::default();
    let idx = pool.import(&ty, ImportMode::Rigid, &mut vars);
    assert_eq!(pool.export(idx), ty);
    assert_eq!(pool.format_type(idx), "{ r | name : String }");
}
