//! The parser registry.
//!
//! An [`ArgLoader`] maps a Rust type to the function that converts an
//! incoming argument value into that type, and to the GraphQL type used when
//! the type appears as an argument. Binding structs onto it lives in
//! [`crate::args`].
//!
//! # Concurrency
//!
//! Registration needs `&mut self` and belongs to start-up. Once populated the
//! loader is only read, and it is `Send + Sync`, so it can be shared between
//! request handlers.

use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::debug;

use crate::convert;
use crate::schema::OutputType;
use crate::shape::TypeKey;
use crate::tag::TagOptions;

type BoxError = Box<dyn Error + Send + Sync>;

type ConvertFn =
    Box<dyn Fn(&Value, &TagOptions) -> Result<Box<dyn Any + Send>, LoadError> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(
        "a loader func has already been registered for the {type_name} type. cannot also register {loader}"
    )]
    DuplicateParser {
        type_name: TypeKey,
        loader: &'static str,
    },
}

/// Failure of a single conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No converter is registered for the type. This is a wiring mistake,
    /// not bad input.
    #[error("no loader function found for type {0}")]
    NoParser(TypeKey),
    /// The converter rejected the input.
    #[error(transparent)]
    Rejected(BoxError),
    /// The converter panicked.
    #[error("{loader} panicked: {message}")]
    Panicked {
        loader: &'static str,
        message: String,
    },
    /// The converter produced a value of another type.
    #[error("loader for {0} returned a value of a different type")]
    Mismatch(TypeKey),
}

impl LoadError {
    /// Returns true for errors caused by the input rather than by how the
    /// loader was set up.
    pub fn is_input_error(&self) -> bool {
        matches!(self, LoadError::Rejected(_) | LoadError::Panicked { .. })
    }
}

/// A registered converter and its argument type.
pub struct ParserEntry {
    key: TypeKey,
    loader: &'static str,
    convert: ConvertFn,
    ty: OutputType,
}

impl ParserEntry {
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Name of the registered function.
    pub fn loader(&self) -> &'static str {
        self.loader
    }

    pub fn output_type(&self) -> &OutputType {
        &self.ty
    }

    pub fn convert(
        &self,
        raw: &Value,
        options: &TagOptions,
    ) -> Result<Box<dyn Any + Send>, LoadError> {
        (self.convert)(raw, options)
    }
}

impl fmt::Debug for ParserEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserEntry")
            .field("key", &self.key)
            .field("loader", &self.loader)
            .field("ty", &self.ty.name())
            .finish()
    }
}

/// Reads GraphQL arguments into Rust values and structs.
#[derive(Debug, Default)]
pub struct ArgLoader {
    parsers: HashMap<TypeKey, ParserEntry>,
}

impl ArgLoader {
    /// A loader with the base converters plus `RawJson` and `u32`.
    pub fn new() -> Result<Self, RegistryError> {
        let mut loader = Self::base()?;
        loader.register_parser(convert::load_raw_json, OutputType::json())?;
        loader.register_parser(convert::load_uint, OutputType::int())?;
        Ok(loader)
    }

    /// A loader with converters for the four GraphQL scalars (as `bool`,
    /// `Option<bool>`, `String`, `i64`, `i32`, `f64`) and for timestamps.
    pub fn base() -> Result<Self, RegistryError> {
        let mut loader = Self::empty();
        loader.register_parser(convert::load_bool, OutputType::boolean())?;
        loader.register_parser(convert::load_optional_bool, OutputType::boolean())?;
        loader.register_parser(convert::load_string, OutputType::string())?;
        loader.register_parser(convert::load_int, OutputType::int())?;
        loader.register_parser(convert::load_int32, OutputType::int())?;
        loader.register_parser(convert::load_float, OutputType::float())?;
        #[cfg(feature = "chrono")]
        loader.register_parser(convert::load_time, OutputType::timestamp())?;
        Ok(loader)
    }

    /// A loader without any converter.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers `convert` as the parser for `T`, with `ty` as the argument
    /// type.
    ///
    /// Fails if a parser for `T` already exists; the first one is kept.
    pub fn register_parser<T, E, F>(
        &mut self,
        convert: F,
        ty: OutputType,
    ) -> Result<(), RegistryError>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
    {
        let loader = std::any::type_name::<F>();
        self.insert::<T, _>(loader, move |raw, _| convert(raw).map_err(Into::into), ty)
    }

    /// Like [`register_parser`](Self::register_parser), for converters that
    /// read the field's tag options.
    pub fn register_parser_with_options<T, E, F>(
        &mut self,
        convert: F,
        ty: OutputType,
    ) -> Result<(), RegistryError>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: Fn(&Value, &TagOptions) -> Result<T, E> + Send + Sync + 'static,
    {
        let loader = std::any::type_name::<F>();
        self.insert::<T, _>(
            loader,
            move |raw, options| convert(raw, options).map_err(Into::into),
            ty,
        )
    }

    fn insert<T, F>(
        &mut self,
        loader: &'static str,
        convert: F,
        ty: OutputType,
    ) -> Result<(), RegistryError>
    where
        T: Send + 'static,
        F: Fn(&Value, &TagOptions) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        if self.parsers.contains_key(&key) {
            return Err(RegistryError::DuplicateParser {
                type_name: key,
                loader,
            });
        }

        let wrapped = move |raw: &Value, options: &TagOptions| {
            match panic::catch_unwind(AssertUnwindSafe(|| convert(raw, options))) {
                Ok(Ok(value)) => Ok(Box::new(value) as Box<dyn Any + Send>),
                Ok(Err(error)) => Err(LoadError::Rejected(error)),
                Err(payload) => Err(LoadError::Panicked {
                    loader,
                    message: panic_message(payload.as_ref()),
                }),
            }
        };

        debug!(type_name = key.name(), loader, ty = %ty, "registered arg parser");
        self.parsers.insert(
            key,
            ParserEntry {
                key,
                loader,
                convert: Box::new(wrapped),
                ty,
            },
        );
        Ok(())
    }

    pub fn parser(&self, key: TypeKey) -> Option<&ParserEntry> {
        self.parsers.get(&key)
    }

    pub fn has_parser(&self, key: TypeKey) -> bool {
        self.parsers.contains_key(&key)
    }

    /// The GraphQL type registered for arguments of type `key`.
    pub fn arg_type(&self, key: TypeKey) -> Option<&OutputType> {
        self.parsers.get(&key).map(ParserEntry::output_type)
    }

    /// Runs the parser registered for `key`.
    pub fn load_value(
        &self,
        key: TypeKey,
        raw: &Value,
        options: &TagOptions,
    ) -> Result<Box<dyn Any + Send>, LoadError> {
        let entry = self.parsers.get(&key).ok_or(LoadError::NoParser(key))?;
        entry.convert(raw, options)
    }

    /// Typed form of [`load_value`](Self::load_value).
    pub fn load<T: Send + 'static>(
        &self,
        raw: &Value,
        options: &TagOptions,
    ) -> Result<T, LoadError> {
        let key = TypeKey::of::<T>();
        self.load_value(key, raw, options)?
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| LoadError::Mismatch(key))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
