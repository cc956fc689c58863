use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E2004.as_str(), "E2004");
    assert_eq!(ErrorCode::L0001.as_str(), "L0001");
}

#[test]
fn test_from_str_round_trip() {
    for code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
    }
    assert_eq!("w1004".parse::<ErrorCode>(), Ok(ErrorCode::W1004));
    assert!("E9999".parse::<ErrorCode>().is_err());
}

#[test]
fn test_predicate_exclusivity() {
    for code in ErrorCode::ALL {
        let hits = [
            code.is_syntax_error(),
            code.is_resolution_error(),
            code.is_type_error(),
            code.is_warning(),
            code.is_external(),
        ]
        .into_iter()
        .filter(|b| *b)
        .count();
        assert_eq!(hits, 1, "{code} matched {hits} ranges");
    }
}

#[test]
fn test_tiers() {
    assert_eq!(ErrorCode::E1003.tier(), DiagnosticTier::Syntactic);
    assert_eq!(ErrorCode::E2004.tier(), DiagnosticTier::Semantic);
    assert_eq!(ErrorCode::E3001.tier(), DiagnosticTier::Semantic);
    assert_eq!(ErrorCode::W1001.tier(), DiagnosticTier::Suggestion);
    assert_eq!(ErrorCode::L0001.tier(), DiagnosticTier::Suggestion);
}

#[test]
fn test_fix_ids_point_back_at_their_codes() {
    for code in ErrorCode::ALL {
        for fix in code.fix_ids() {
            assert!(
                fix.trigger_codes().contains(code),
                "{fix:?} does not list {code}"
            );
        }
    }
}

#[test]
fn test_serializes_as_string() {
    let json = serde_json::to_string(&ErrorCode::E3003).unwrap_or_default();
    assert_eq!(json, "\"E3003\"");
    let back: Result<ErrorCode, _> = serde_json::from_str("\"E3003\"");
    assert_eq!(back.ok(), Some(ErrorCode::E3003));
    let bad: Result<ErrorCode, _> = serde_json::from_str("\"nope\"");
    assert!(bad.is_err());
}
