//! Derive GraphQL types from Rust structs and bind request arguments onto
//! them.
//!
//! Structs describe themselves with `#[derive(Describe)]`. A [`TypeBuilder`]
//! turns those descriptions into output types, and an [`ArgLoader`] reads a
//! map of raw argument values back into a struct, reporting every invalid
//! field at once.
//!
//! ```ignore
//! use graphql_sugar::{ArgLoader, Args, Describe};
//!
//! #[derive(Describe, Default)]
//! struct UserArgs {
//!     #[sugar(arg = "id,required", desc = "The user to fetch.")]
//!     id: String,
//!     #[sugar(arg = "limit,coalesceZero")]
//!     limit: i64,
//! }
//!
//! let loader = ArgLoader::new()?;
//! let config = loader.args_config::<UserArgs>()?;
//! let mut args = UserArgs::default();
//! loader.load_args(&request_args, &mut args)?;
//! ```

pub mod args;
pub mod builder;
pub mod convert;
pub mod loader;
pub mod schema;
pub mod shape;
pub mod tag;

pub use args::{ArgsConfig, ArgumentConfig, BindError, ValidationError, ValidationErrors};
pub use builder::{BuildError, TypeBuilder};
pub use convert::RawJson;
pub use graphql_sugar_macros::Describe;
pub use loader::{ArgLoader, LoadError, RegistryError};
pub use schema::{
    FieldResolver, ObjectField, ObjectType, OutputType, ScalarCodec, ScalarType, TypeResolver,
    UnionResolveError, UnionType,
};
pub use shape::{Describe, Shape, ShapeKind, TypeKey, shape_of};
pub use tag::{FieldTag, TagOptions};

/// Raw arguments of one field invocation, keyed by argument name.
pub type Args = serde_json::Map<String, serde_json::Value>;

/// Items used by generated code.
#[doc(hidden)]
pub mod __private {
    pub use crate::shape::{Describe, FieldShape, Shape, StructShape};
    pub use std::any::Any;
    pub use std::boxed::Box;
    pub use std::option::Option;
    pub use std::result::Result;
    pub use std::vec;
}
