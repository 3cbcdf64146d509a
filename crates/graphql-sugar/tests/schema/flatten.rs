//! Flattening embedded structs into their parent

use graphql_sugar::{BuildError, Describe, TypeBuilder, TypeKey};

#[derive(Describe)]
struct Timestamps {
    #[sugar(name = "id", desc = "embedded id")]
    id: i64,
    #[sugar(name = "createdAt")]
    created_at: String,
}

#[derive(Describe)]
struct Article {
    #[sugar(flatten)]
    timestamps: Timestamps,
    #[sugar(name = "id", desc = "article id")]
    id: String,
    #[sugar(name = "title")]
    title: String,
}

#[test]
fn test_parent_field_wins() {
    let mut builder = TypeBuilder::new();
    let ty = builder.output_type::<Article>("Article", "").unwrap();
    let article = ty.as_object().unwrap();

    assert_eq!(article.field_names(), vec!["id", "createdAt", "title"]);
    let id = article.field("id").unwrap();
    assert_eq!(id.description.as_deref(), Some("article id"));
    assert!(id.resolver.is_none());
}

#[derive(Describe)]
struct Comment {
    #[sugar(name = "id", desc = "comment id")]
    id: String,
    #[sugar(flatten)]
    timestamps: Timestamps,
}

#[test]
fn test_parent_field_declared_first_wins() {
    let mut builder = TypeBuilder::new();
    let ty = builder.output_type::<Comment>("Comment", "").unwrap();
    let comment = ty.as_object().unwrap();

    assert_eq!(comment.field_names(), vec!["id", "createdAt"]);
    let id = comment.field("id").unwrap();
    assert_eq!(id.description.as_deref(), Some("comment id"));
    assert_eq!(id.ty.name(), "String");
    assert!(id.resolver.is_none());
    assert!(comment.field("createdAt").unwrap().resolver.is_some());
}

#[test]
fn test_flattened_field_resolves_through_parent() {
    let mut builder = TypeBuilder::new();
    let ty = builder.output_type::<Article>("Article", "").unwrap();
    let created_at = ty.as_object().unwrap().field("createdAt").unwrap();
    let resolver = created_at.resolver.as_ref().unwrap();

    let article = Article {
        timestamps: Timestamps {
            id: 1,
            created_at: "today".to_string(),
        },
        id: "a".to_string(),
        title: "t".to_string(),
    };
    let value = resolver.resolve(&article).unwrap();
    assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("today"));
}

#[derive(Describe)]
struct Audit {
    #[sugar(name = "editor")]
    editor: String,
}

#[derive(Describe)]
struct Revision {
    #[sugar(flatten)]
    audit: Option<Box<Audit>>,
    #[sugar(name = "number")]
    number: i64,
}

#[derive(Describe)]
struct Page {
    #[sugar(flatten)]
    revision: Revision,
    #[sugar(name = "path")]
    path: String,
}

#[test]
fn test_nested_flatten_through_pointers() {
    let mut builder = TypeBuilder::new();
    let ty = builder.output_type::<Page>("Page", "").unwrap();
    let page_type = ty.as_object().unwrap();
    assert_eq!(page_type.field_names(), vec!["editor", "number", "path"]);

    let editor = page_type.field("editor").unwrap().resolver.as_ref().unwrap();
    let number = page_type.field("number").unwrap().resolver.as_ref().unwrap();
    assert!(page_type.field("path").unwrap().resolver.is_none());

    let mut page = Page {
        revision: Revision {
            audit: Some(Box::new(Audit {
                editor: "ed".to_string(),
            })),
            number: 4,
        },
        path: "/".to_string(),
    };
    assert_eq!(
        editor.resolve(&page).unwrap().downcast_ref::<String>().map(String::as_str),
        Some("ed")
    );
    assert_eq!(number.resolve(&page).unwrap().downcast_ref::<i64>(), Some(&4));

    page.revision.audit = None;
    assert!(editor.resolve(&page).is_none());
}

#[derive(Describe)]
struct BadFlatten {
    #[sugar(flatten)]
    tags: Vec<String>,
}

#[test]
fn test_flatten_requires_a_struct() {
    let mut builder = TypeBuilder::new();
    let err = builder.output_type::<BadFlatten>("BadFlatten", "").unwrap_err();
    assert_eq!(
        err,
        BuildError::FlattenNonStruct {
            field: "tags",
            type_name: TypeKey::of::<Vec<String>>(),
        }
    );
}

#[derive(Describe)]
struct Named {
    #[sugar(flatten, name = "audit")]
    audit: Audit,
}

#[test]
fn test_flattened_and_named() {
    let mut builder = TypeBuilder::new();
    let ty = builder.output_type::<Named>("Named", "").unwrap();
    let named = ty.as_object().unwrap();
    assert_eq!(named.field_names(), vec!["editor", "audit"]);
    assert_eq!(named.field("audit").unwrap().ty.name(), "Audit");
}
