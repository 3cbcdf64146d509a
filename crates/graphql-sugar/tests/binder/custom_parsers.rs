//! Binding with user-registered parsers

use graphql_sugar::{
    ArgLoader, Args, BindError, Describe, OutputType, TagOptions, ValidationError,
};
use serde_json::{Value, json};

#[derive(Debug, Default, PartialEq)]
struct Slug(String);

impl Describe for Slug {
    fn shape() -> graphql_sugar::Shape {
        graphql_sugar::Shape::opaque::<Self>("slug")
    }
}

fn load_slug(value: &Value, options: &TagOptions) -> Result<Slug, String> {
    let text = value.as_str().ok_or("slug must be a string")?;
    if options.contains("lower") && text.chars().any(char::is_uppercase) {
        return Err(format!("{text} is not lowercase"));
    }
    Ok(Slug(text.to_string()))
}

#[derive(Describe, Default)]
struct ArticleArgs {
    #[sugar(arg = "slug,required,lower", desc = "Article slug")]
    slug: Slug,
    #[sugar(arg = "draft")]
    draft: Slug,
}

fn loader() -> ArgLoader {
    let mut loader = ArgLoader::empty();
    loader
        .register_parser_with_options(load_slug, OutputType::string())
        .unwrap();
    loader
}

#[test]
fn test_options_reach_the_parser() {
    let loader = loader();
    let mut target = ArticleArgs::default();
    let mut args = Args::new();
    args.insert("slug".to_string(), json!("Hello"));
    args.insert("draft".to_string(), json!("Hello"));

    let err = loader.load_args(&args, &mut target).unwrap_err();
    assert_eq!(
        err.validation().unwrap().0,
        vec![ValidationError::Invalid("slug".to_string())]
    );
    assert_eq!(target.draft, Slug("Hello".to_string()));
}

#[test]
fn test_args_config() {
    let config = loader().args_config::<ArticleArgs>().unwrap();
    assert_eq!(config.keys().collect::<Vec<_>>(), vec!["slug", "draft"]);
    assert!(config["slug"].ty.same(&OutputType::string()));
    assert_eq!(config["slug"].description.as_deref(), Some("Article slug"));
    assert_eq!(config["draft"].description, None);

    // Pointers to structs are accepted too.
    let boxed = loader().args_config::<Box<ArticleArgs>>().unwrap();
    assert_eq!(boxed.len(), 2);
}

#[test]
fn test_args_config_without_arg_type() {
    let err = ArgLoader::empty()
        .args_config::<ArticleArgs>()
        .unwrap_err();
    let BindError::MissingArgType {
        struct_name,
        field,
        type_name,
    } = err
    else {
        panic!("Expected MissingArgType");
    };
    assert_eq!(struct_name, "ArticleArgs");
    assert_eq!(field, "slug");
    assert_eq!(type_name, graphql_sugar::TypeKey::of::<Slug>());
}

#[derive(Describe, Default)]
struct Fragile {
    #[sugar(arg = "items")]
    items: Vec<i64>,
    #[sugar(arg = "name")]
    name: String,
}

#[test]
fn test_panicking_parser_is_an_invalid_field() {
    let mut loader = ArgLoader::base().unwrap();
    loader
        .register_parser(
            |value: &Value| -> Result<Vec<i64>, String> {
                let first = value[0].as_i64().unwrap();
                Ok(vec![first])
            },
            OutputType::list(OutputType::int()),
        )
        .unwrap();

    let mut target = Fragile::default();
    let mut args = Args::new();
    args.insert("items".to_string(), json!(["x"]));
    args.insert("name".to_string(), json!("n"));
    let err = loader.load_args(&args, &mut target).unwrap_err();
    assert_eq!(
        err.validation().unwrap().0,
        vec![ValidationError::Invalid("items".to_string())]
    );
    assert_eq!(target.name, "n");

    args.insert("items".to_string(), json!([7]));
    loader.load_args(&args, &mut target).unwrap();
    assert_eq!(target.items, vec![7]);
}
