use inspr_core::errors::{ExError, ExErrorKind, InsprError};
use inspr_core::model::EntityKind;

#[test]
fn test_not_found_verifiable_by_kind() {
    let err = InsprError::EntityNotFound {
        entity: EntityKind::Channel,
        scope: "app1".to_string(),
        name: "ch1".to_string(),
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.scope(), Some("app1"));
    assert_eq!(ex_err.entity(), Some("ch1"));
}

#[test]
fn test_referenced_entity_is_bad_request_not_not_found() {
    let err = InsprError::EntityInUse {
        entity: EntityKind::Type,
        scope: String::new(),
        name: "t1".to_string(),
        users: vec!["ch1".to_string()],
    };

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::BadRequest);
    assert_ne!(ex_err.kind(), ExErrorKind::NotFound);
    assert!(ex_err.message().contains("ch1"));
}

#[test]
fn test_timeout_has_its_own_kind() {
    let ex_err: ExError = InsprError::TransactionTimeout { waited_ms: 5000 }.into();
    assert_eq!(ex_err.kind(), ExErrorKind::Timeout);
    assert!(!ex_err.kind().is_programming_error());
}

#[test]
fn test_diff_misalignment_signals_programming_error() {
    let err = InsprError::DiffMisaligned {
        context: "*.Spec.Apps.x".to_string(),
        field: "Meta.Name".to_string(),
        from: "x".to_string(),
        to: "y".to_string(),
    };

    let ex_err: ExError = err.into();

    assert!(ex_err.kind().is_programming_error());
    assert_eq!(ex_err.scope(), Some("*.Spec.Apps.x"));
}

#[test]
fn test_request_layer_wraps_manager_error() {
    let inner: ExError = InsprError::CannotDeleteRoot.into();
    let outer = ExError::new(ExErrorKind::BadRequest)
        .with_op("apply_engine_command")
        .with_message("command failed")
        .with_source(inner.clone());

    assert_eq!(outer.root_cause(), &inner);
    assert!(outer.to_string().contains("apply_engine_command"));
}
