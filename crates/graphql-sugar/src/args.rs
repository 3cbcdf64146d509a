//! Argument configs and argument binding for tagged structs.

use std::fmt;

use indexmap::IndexMap;
use thisisplural::Plural;
use tracing::{debug, trace};

use crate::Args;
use crate::loader::{ArgLoader, LoadError};
use crate::schema::OutputType;
use crate::shape::{Describe, FieldShape, Shape, ShapeKind, StructShape, TypeKey};
use crate::tag::{FieldTag, field_tag};

/// Schema of one argument.
#[derive(Debug, Clone)]
pub struct ArgumentConfig {
    pub ty: OutputType,
    pub description: Option<String>,
}

/// Arguments of a field, keyed by external name in declaration order.
pub type ArgsConfig = IndexMap<String, ArgumentConfig>;

/// A field-level failure. Carries the external argument name only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequired(String),
    #[error("{0} is not valid")]
    Invalid(String),
}

impl ValidationError {
    pub fn argument(&self) -> &str {
        match self {
            ValidationError::MissingRequired(name) | ValidationError::Invalid(name) => name,
        }
    }
}

/// Every field-level failure of one binding pass, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Plural)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            1 => write!(f, "1 error occurred:")?,
            n => write!(f, "{n} errors occurred:")?,
        }
        for error in &self.0 {
            write!(f, "\n\t* {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("cannot load arguments into {0}: not a struct")]
    NotAStruct(TypeKey),
    #[error("no argument loader registered for {type_name} type (field {field} of {struct_name})")]
    MissingArgType {
        struct_name: &'static str,
        field: &'static str,
        type_name: TypeKey,
    },
    #[error("no loader function found for type {0}")]
    NoParser(TypeKey),
    #[error("loaded value for field {field} is not a {type_name}")]
    Assign {
        field: &'static str,
        type_name: TypeKey,
    },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl BindError {
    /// The field-level failures, if that is what this error is.
    pub fn validation(&self) -> Option<&ValidationErrors> {
        match self {
            BindError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Finds the struct behind `shape`, looking through pointers.
fn struct_shape(shape: Shape) -> Result<StructShape, BindError> {
    let key = shape.key;
    let mut current = shape;
    loop {
        match current.kind {
            ShapeKind::Struct(shape) => return Ok(shape),
            ShapeKind::Pointer { pointee, .. } => current = pointee(),
            _ => return Err(BindError::NotAStruct(key)),
        }
    }
}

/// Fields that take part in binding, with their parsed tags.
fn tagged_fields(shape: &StructShape) -> impl Iterator<Item = (&FieldShape, FieldTag)> {
    shape.fields.iter().filter_map(|field| {
        let tag = field.arg?;
        field_tag(shape.name, field.name, tag).map(|tag| (field, tag))
    })
}

impl ArgLoader {
    /// Builds the argument config of `T`, which must be a struct or a pointer
    /// to one.
    pub fn args_config<T: Describe>(&self) -> Result<ArgsConfig, BindError> {
        self.args_config_of(T::shape())
    }

    pub fn args_config_of(&self, shape: Shape) -> Result<ArgsConfig, BindError> {
        let shape = struct_shape(shape)?;
        let mut config = ArgsConfig::new();
        for (field, tag) in tagged_fields(&shape) {
            let key = (field.shape)().key;
            let ty = self
                .arg_type(key)
                .ok_or(BindError::MissingArgType {
                    struct_name: shape.name,
                    field: field.name,
                    type_name: key,
                })?
                .clone();
            config.insert(
                tag.name,
                ArgumentConfig {
                    ty,
                    description: field.description.map(str::to_string),
                },
            );
        }
        debug!(struct_name = shape.name, args = config.len(), "built args config");
        Ok(config)
    }

    /// Binds `args` onto `target`.
    ///
    /// Every tagged field is attempted. Missing required arguments and
    /// rejected values are collected and returned together as
    /// [`BindError::Validation`]; fields that loaded are assigned regardless.
    /// A field type without a parser aborts the whole call.
    pub fn load_args<T: Describe>(&self, args: &Args, target: &mut T) -> Result<(), BindError> {
        let shape = T::shape();
        let key = shape.key;
        let ShapeKind::Struct(shape) = shape.kind else {
            return Err(BindError::NotAStruct(key));
        };

        let mut errors = ValidationErrors::default();
        for (field, tag) in tagged_fields(&shape) {
            let Some(raw) = args.get(&tag.name) else {
                if tag.is_required() {
                    errors.0.push(ValidationError::MissingRequired(tag.name));
                }
                continue;
            };

            let field_key = (field.shape)().key;
            match self.load_value(field_key, raw, &tag.options) {
                Ok(value) => {
                    (field.set)(target, value).map_err(|_| BindError::Assign {
                        field: field.name,
                        type_name: field_key,
                    })?;
                    trace!(field = field.name, arg = %tag.name, "loaded argument");
                }
                Err(LoadError::NoParser(key)) => return Err(BindError::NoParser(key)),
                Err(error) if tag.coalesces_zero() => {
                    if !(field.reset)(target) {
                        return Err(BindError::Assign {
                            field: field.name,
                            type_name: field_key,
                        });
                    }
                    trace!(field = field.name, arg = %tag.name, %error, "coalesced to zero value");
                }
                Err(error) => {
                    trace!(field = field.name, arg = %tag.name, %error, "invalid argument");
                    errors.0.push(ValidationError::Invalid(tag.name));
                }
            }
        }

        if errors.0.is_empty() {
            Ok(())
        } else {
            Err(BindError::Validation(errors))
        }
    }
}
