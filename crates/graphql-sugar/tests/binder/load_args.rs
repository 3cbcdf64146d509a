//! Binding argument maps onto tagged structs

use graphql_sugar::{ArgLoader, Args, BindError, Describe, TypeKey, ValidationError};
use serde_json::json;

fn args(value: serde_json::Value) -> Args {
    let serde_json::Value::Object(map) = value else {
        panic!("Expected object");
    };
    map
}

#[derive(Describe, Default, Debug, PartialEq)]
struct Lookup {
    #[sugar(arg = "id,required")]
    id: String,
    #[sugar(arg = "count")]
    count: i64,
}

#[test]
fn test_optional_argument_absent() {
    let loader = ArgLoader::new().unwrap();
    let mut target = Lookup::default();
    loader
        .load_args(&args(json!({"id": "x"})), &mut target)
        .unwrap();
    assert_eq!(
        target,
        Lookup {
            id: "x".to_string(),
            count: 0,
        }
    );
}

#[test]
fn test_required_argument_absent() {
    let loader = ArgLoader::new().unwrap();
    let mut target = Lookup::default();
    let err = loader.load_args(&Args::new(), &mut target).unwrap_err();
    let errors = err.validation().unwrap();
    assert_eq!(
        errors.0,
        vec![ValidationError::MissingRequired("id".to_string())]
    );
    assert_eq!(err.to_string(), "1 error occurred:\n\t* id is required");
}

#[test]
fn test_missing_required_is_reported_once_among_other_errors() {
    let loader = ArgLoader::new().unwrap();
    let mut target = Lookup::default();
    let err = loader
        .load_args(&args(json!({"count": "many"})), &mut target)
        .unwrap_err();
    assert_eq!(
        err.validation().unwrap().0,
        vec![
            ValidationError::MissingRequired("id".to_string()),
            ValidationError::Invalid("count".to_string()),
        ]
    );
}

#[derive(Describe, Default, Debug)]
struct Filter {
    #[sugar(arg = "a")]
    a: i64,
    #[sugar(arg = "b")]
    b: bool,
    #[sugar(arg = "c")]
    c: String,
    #[sugar(arg = "d")]
    d: f64,
}

#[test]
fn test_every_field_is_attempted() {
    crate::init_tracing();
    let loader = ArgLoader::new().unwrap();
    let mut target = Filter::default();
    let err = loader
        .load_args(
            &args(json!({"a": "one", "b": true, "c": 3, "d": 2.5})),
            &mut target,
        )
        .unwrap_err();

    let BindError::Validation(errors) = err else {
        panic!("Expected Validation");
    };
    assert_eq!(
        errors.0,
        vec![
            ValidationError::Invalid("a".to_string()),
            ValidationError::Invalid("c".to_string()),
        ]
    );
    // Valid fields are assigned even though the call failed.
    assert!(target.b);
    assert_eq!(target.d, 2.5);
    assert_eq!(target.a, 0);
    assert_eq!(target.c, "");
}

#[derive(Describe, Default, Debug)]
struct Paging {
    #[sugar(arg = "limit,coalesceZero")]
    limit: i64,
    #[sugar(arg = "after")]
    after: String,
}

#[test]
fn test_coalesce_zero() {
    let loader = ArgLoader::new().unwrap();
    let mut target = Paging {
        limit: 50,
        after: String::new(),
    };
    loader
        .load_args(&args(json!({"limit": "lots", "after": "c1"})), &mut target)
        .unwrap();
    assert_eq!(target.limit, 0);
    assert_eq!(target.after, "c1");
}

#[derive(Describe, Default)]
struct Unsupported {
    #[sugar(arg = "id")]
    id: String,
    #[sugar(arg = "tags")]
    tags: Vec<String>,
}

#[test]
fn test_missing_parser_fails_immediately() {
    let loader = ArgLoader::new().unwrap();
    let mut target = Unsupported::default();
    let err = loader
        .load_args(&args(json!({"id": 5, "tags": ["a"]})), &mut target)
        .unwrap_err();
    let BindError::NoParser(key) = err else {
        panic!("Expected NoParser, got {err:?}");
    };
    assert_eq!(key, TypeKey::of::<Vec<String>>());
}

#[test]
fn test_missing_parser_only_matters_when_present() {
    let loader = ArgLoader::new().unwrap();
    let mut target = Unsupported::default();
    loader
        .load_args(&args(json!({"id": "x"})), &mut target)
        .unwrap();
    assert_eq!(target.id, "x");
}

#[derive(Describe, Default)]
struct Tagged {
    #[sugar(arg = "-")]
    hidden: i64,
    #[sugar(arg = "broken,,required")]
    broken: i64,
    #[sugar(arg = ",required")]
    native: i64,
    untagged: i64,
}

#[test]
fn test_hidden_malformed_and_native_names() {
    crate::init_tracing();
    let loader = ArgLoader::new().unwrap();
    let mut target = Tagged::default();
    let err = loader
        .load_args(
            &args(json!({"hidden": 1, "broken": 2, "untagged": 3})),
            &mut target,
        )
        .unwrap_err();
    assert_eq!(
        err.validation().unwrap().0,
        vec![ValidationError::MissingRequired("native".to_string())]
    );
    assert_eq!(target.hidden, 0);
    assert_eq!(target.broken, 0);
    assert_eq!(target.untagged, 0);

    loader
        .load_args(&args(json!({"native": 4})), &mut target)
        .unwrap();
    assert_eq!(target.native, 4);
}

#[derive(Describe, Default)]
struct Optional {
    #[sugar(arg = "flag")]
    flag: Option<bool>,
    #[sugar(arg = "limit")]
    limit: u32,
}

#[test]
fn test_builtin_converters() {
    let loader = ArgLoader::new().unwrap();
    let mut target = Optional {
        flag: Some(true),
        limit: 0,
    };
    loader
        .load_args(&args(json!({"flag": null, "limit": "25"})), &mut target)
        .unwrap();
    assert_eq!(target.flag, None);
    assert_eq!(target.limit, 25);
}
