//! Test Describe derive for flattened fields

use graphql_sugar::{Describe, ShapeKind, TypeKey};

#[derive(Describe, Default)]
struct Base {
    #[sugar(name = "id")]
    id: String,
}

#[derive(Describe, Default)]
struct Post {
    #[sugar(flatten)]
    base: Base,
    #[sugar(flatten, name = "author")]
    author: Option<Box<Base>>,
}

#[test]
fn test_flatten_fields() {
    let ShapeKind::Struct(shape) = Post::shape().kind else {
        panic!("Expected Struct");
    };
    assert_eq!(shape.fields.len(), 2);

    let base = &shape.fields[0];
    assert!(base.flatten);
    assert_eq!(base.output, None);
    assert_eq!((base.shape)().key, TypeKey::of::<Base>());

    let author = &shape.fields[1];
    assert!(author.flatten);
    assert_eq!(author.output, Some("author"));
    assert!(matches!((author.shape)().kind, ShapeKind::Pointer { .. }));
}
