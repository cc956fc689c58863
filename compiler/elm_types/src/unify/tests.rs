use pretty_assertions::assert_eq;

use super::*;
use crate::Ty;

fn record(pool: &mut Pool, fields: &[(&str, Idx)], ext: Option<Idx>) -> Idx {
    let fields = fields.iter().map(|(n, t)| (Name::from(*n), *t)).collect();
    pool.record(fields, ext)
}

#[test]
fn identical_builtins_unify() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    assert_eq!(engine.unify(Idx::INT, Idx::INT), Ok(()));
    assert!(engine.unify(Idx::INT, Idx::STRING).is_err());
}

#[test]
fn variable_links_to_structure() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let a = engine.fresh_var();
    let list_a = engine.pool_mut().list(a);
    let list_int = engine.pool_mut().list(Idx::INT);
    assert_eq!(engine.unify(list_a, list_int), Ok(()));
    assert_eq!(engine.resolve(a), Idx::INT);
}

#[test]
fn error_type_absorbs_everything() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let f = engine.pool_mut().function(Idx::INT, Idx::BOOL);
    assert_eq!(engine.unify(Idx::ERROR, f), Ok(()));
    assert_eq!(engine.unify(Idx::STRING, Idx::ERROR), Ok(()));
}

#[test]
fn occurs_check_rejects_infinite_types() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let a = engine.fresh_var();
    let list_a = engine.pool_mut().list(a);
    let err = engine.unify(a, list_a).unwrap_err();
    assert!(err.is_infinite());
}

#[test]
fn number_accepts_int_and_rejects_string() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let n = engine.fresh_constrained(VarKind::Number);
    assert_eq!(engine.unify(n, Idx::FLOAT), Ok(()));

    let m = engine.fresh_constrained(VarKind::Number);
    assert_eq!(
        engine.unify(m, Idx::STRING),
        Err(UnifyError::ConstraintViolation {
            kind: VarKind::Number,
            found: Idx::STRING,
        })
    );
}

#[test]
fn comparable_list_constrains_its_element() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let c = engine.fresh_constrained(VarKind::Comparable);
    let elem = engine.fresh_var();
    let list = engine.pool_mut().list(elem);
    assert_eq!(engine.unify(c, list), Ok(()));

    let f = engine.pool_mut().function(Idx::INT, Idx::INT);
    assert!(engine.unify(elem, f).is_err());
}

#[test]
fn merging_number_and_comparable_gives_number() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let n = engine.fresh_constrained(VarKind::Number);
    let c = engine.fresh_constrained(VarKind::Comparable);
    assert_eq!(engine.unify(n, c), Ok(()));
    assert!(engine.unify(c, Idx::CHAR).is_err());
}

#[test]
fn rigid_variables_only_unify_with_themselves() {
    let mut pool = Pool::new();
    let a = pool.rigid_var(Name::from("a"));
    let b = pool.rigid_var(Name::from("b"));
    let mut engine = UnifyEngine::new(&mut pool);
    assert_eq!(engine.unify(a, a), Ok(()));
    assert!(engine.unify(a, b).is_err());
    assert!(matches!(
        engine.unify(a, Idx::INT),
        Err(UnifyError::RigidMismatch { .. })
    ));

    let flex = engine.fresh_var();
    assert_eq!(engine.unify(flex, a), Ok(()));
    assert_eq!(engine.resolve(flex), a);
}

#[test]
fn rigid_number_satisfies_flexible_comparable() {
    let mut pool = Pool::new();
    let n = pool.rigid_var(Name::from("number"));
    let mut engine = UnifyEngine::new(&mut pool);
    let c = engine.fresh_constrained(VarKind::Comparable);
    assert_eq!(engine.unify(c, n), Ok(()));

    let s = engine.fresh_constrained(VarKind::Appendable);
    assert!(engine.unify(s, n).is_err());
}

#[test]
fn closed_records_need_the_same_fields() {
    let mut pool = Pool::new();
    let a = record(&mut pool, &[("x", Idx::INT), ("y", Idx::INT)], None);
    let b = record(&mut pool, &[("x", Idx::INT)], None);
    let mut engine = UnifyEngine::new(&mut pool);
    assert!(matches!(
        engine.unify(a, b),
        Err(UnifyError::MissingField { ref field, .. }) if &**field == "y"
    ));
}

#[test]
fn open_record_absorbs_extra_fields() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let rho = engine.fresh_var();
    let open = record(engine.pool_mut(), &[("name", Idx::STRING)], Some(rho));
    let closed = record(
        engine.pool_mut(),
        &[("age", Idx::INT), ("name", Idx::STRING)],
        None,
    );
    assert_eq!(engine.unify(open, closed), Ok(()));
    assert_eq!(
        engine.pool().export(rho),
        Ty::Record {
            fields: vec![(
                "age".to_string(),
                Ty::app(crate::names::INT, vec![])
            )],
            ext: None,
        }
    );
}

#[test]
fn open_record_cannot_gain_fields_from_closed() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let rho = engine.fresh_var();
    let open = record(engine.pool_mut(), &[("missing", Idx::INT)], Some(rho));
    let closed = record(engine.pool_mut(), &[("name", Idx::STRING)], None);
    assert!(matches!(
        engine.unify(open, closed),
        Err(UnifyError::MissingField { ref field, .. }) if &**field == "missing"
    ));
}

#[test]
fn two_open_rows_share_a_fresh_tail() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let r1 = engine.fresh_var();
    let r2 = engine.fresh_var();
    let a = record(engine.pool_mut(), &[("x", Idx::INT)], Some(r1));
    let b = record(engine.pool_mut(), &[("y", Idx::BOOL)], Some(r2));
    assert_eq!(engine.unify(a, b), Ok(()));
    assert_eq!(engine.pool().format_type(a), engine.pool().format_type(b));
    assert_eq!(engine.pool().format_type(a), "{ a | x : Int, y : Bool }");
}

#[test]
fn same_tail_with_different_fields_is_a_mismatch() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let r = engine.fresh_var();
    let a = record(engine.pool_mut(), &[("x", Idx::INT)], Some(r));
    let b = record(engine.pool_mut(), &[("y", Idx::INT)], Some(r));
    assert!(engine.unify(a, b).is_err());
}

#[test]
fn generalize_only_inner_variables() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let outer = engine.fresh_var();
    engine.enter_scope();
    let inner = engine.fresh_var();
    let f = engine.pool_mut().function(inner, outer);
    let scheme = engine.generalize(f);
    engine.exit_scope();
    assert_eq!(scheme.vars.len(), 1);

    let first = engine.instantiate(&scheme);
    let second = engine.instantiate(&scheme);
    assert_ne!(first, second);
    assert_eq!(
        engine.unify(inner, Idx::INT),
        Err(UnifyError::UninstantiatedGeneralized { var: inner })
    );
}

#[test]
fn instantiated_copies_are_independent() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    engine.enter_scope();
    let a = engine.fresh_var();
    let identity = engine.pool_mut().function(a, a);
    let scheme = engine.generalize(identity);
    engine.exit_scope();

    let on_int = engine.instantiate(&scheme);
    let on_string = engine.instantiate(&scheme);
    let int_to_int = engine.pool_mut().function(Idx::INT, Idx::INT);
    let string_to_string = engine.pool_mut().function(Idx::STRING, Idx::STRING);
    assert_eq!(engine.unify(on_int, int_to_int), Ok(()));
    assert_eq!(engine.unify(on_string, string_to_string), Ok(()));
}

#[test]
fn binding_an_outer_variable_lowers_inner_ranks() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    let outer = engine.fresh_var();
    engine.enter_scope();
    let inner = engine.fresh_var();
    let list = engine.pool_mut().list(inner);
    assert_eq!(engine.unify(outer, list), Ok(()));
    let scheme = engine.generalize(list);
    assert!(scheme.is_mono());
}

#[test]
fn instantiation_keeps_constraints() {
    let mut pool = Pool::new();
    let mut engine = UnifyEngine::new(&mut pool);
    engine.enter_scope();
    let n = engine.fresh_constrained(VarKind::Number);
    let add = engine.pool_mut().function_n(&[n, n], n);
    let scheme = engine.generalize(add);
    engine.exit_scope();

    let fresh = engine.instantiate(&scheme);
    assert_eq!(engine.pool().format_type(fresh), "number -> number -> number");
    let Some((param, _)) = engine.pool().as_function(fresh) else {
        panic!("expected a function");
    };
    assert!(engine.unify(param, Idx::STRING).is_err());
}
