//! Handles for the types of the external GraphQL schema.
//!
//! The query engine owns execution; this crate only creates these handles,
//! caches them, and hands them out. Object and union handles are shared
//! (`Arc`), so the same Rust type always maps to the same handle.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use indexmap::IndexMap;
use serde_json::Value;

use crate::shape::{Accessor, Describe, Shape, ShapeKind, TypeKey};

// ============================================================================
// Scalars
// ============================================================================

/// Conversion functions of a custom scalar, supplied by the schema owner.
///
/// `parse_literal` receives the literal already lowered to a JSON value.
pub trait ScalarCodec: Send + Sync {
    fn serialize(&self, value: &dyn Any) -> Option<Value>;
    fn parse_value(&self, value: &Value) -> Option<Box<dyn Any + Send>>;
    fn parse_literal(&self, literal: &Value) -> Option<Box<dyn Any + Send>>;
}

/// A leaf type.
pub struct ScalarType {
    name: String,
    description: String,
    codec: Option<Arc<dyn ScalarCodec>>,
}

impl ScalarType {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            codec: None,
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn ScalarCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn codec(&self) -> Option<&Arc<dyn ScalarCodec>> {
        self.codec.as_ref()
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .field("codec", &self.codec.is_some())
            .finish()
    }
}

static BOOLEAN: LazyLock<Arc<ScalarType>> = LazyLock::new(|| {
    Arc::new(ScalarType::new(
        "Boolean",
        "The `Boolean` scalar type represents `true` or `false`.",
    ))
});

static INT: LazyLock<Arc<ScalarType>> = LazyLock::new(|| {
    Arc::new(ScalarType::new(
        "Int",
        "The `Int` scalar type represents non-fractional signed whole numeric values.",
    ))
});

static FLOAT: LazyLock<Arc<ScalarType>> = LazyLock::new(|| {
    Arc::new(ScalarType::new(
        "Float",
        "The `Float` scalar type represents signed double-precision fractional values.",
    ))
});

static STRING: LazyLock<Arc<ScalarType>> = LazyLock::new(|| {
    Arc::new(ScalarType::new(
        "String",
        "The `String` scalar type represents textual data.",
    ))
});

static TIMESTAMP: LazyLock<Arc<ScalarType>> = LazyLock::new(|| {
    Arc::new(ScalarType::new(
        "Timestamp",
        "Timestamp is an ISO8601-formatted date/time string. Values that omit a time zone are assumed to be UTC.",
    ))
});

static JSON: LazyLock<Arc<ScalarType>> = LazyLock::new(|| {
    Arc::new(ScalarType::new(
        "JSON",
        "JSON is a custom scalar for attaching json blobs as leaves on a graphql API request or response.",
    ))
});

// ============================================================================
// Objects
// ============================================================================

/// Reads a flattened field's value off the value of the object that owns it.
///
/// The path walks from the outer struct through each flattened field.
#[derive(Clone)]
pub struct FieldResolver {
    path: Arc<[Accessor]>,
}

impl FieldResolver {
    pub fn new(path: impl Into<Arc<[Accessor]>>) -> Self {
        Self { path: path.into() }
    }

    pub fn resolve<'a>(&self, source: &'a dyn Any) -> Option<&'a dyn Any> {
        self.path
            .iter()
            .try_fold(source, |value, accessor| accessor(value))
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldResolver")
            .field("depth", &self.path.len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ObjectField {
    pub ty: OutputType,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    /// Present for fields contributed by a flattened struct.
    pub resolver: Option<FieldResolver>,
}

/// A composite output type.
///
/// Fields are filled once after the handle is created, so a struct can refer
/// to itself.
pub struct ObjectType {
    name: String,
    description: String,
    fields: OnceLock<IndexMap<String, ObjectField>>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: OnceLock::new(),
        }
    }

    pub fn with_fields(
        name: impl Into<String>,
        description: impl Into<String>,
        fields: IndexMap<String, ObjectField>,
    ) -> Self {
        let object = Self::new(name, description);
        object.set_fields(fields);
        object
    }

    /// Sets the field map. Only the first call has an effect.
    pub(crate) fn set_fields(&self, fields: IndexMap<String, ObjectField>) {
        let _ = self.fields.set(fields);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        self.fields.get().and_then(|fields| fields.get(name))
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ObjectField)> {
        self.fields
            .get()
            .into_iter()
            .flat_map(|fields| fields.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields().map(|(name, _)| name).collect()
    }
}

impl fmt::Debug for ObjectType {
    // Field types are printed by name only; objects may be self-referential.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("fields", &self.field_names())
            .finish()
    }
}

// ============================================================================
// Unions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnionResolveError {
    #[error("could not determine GraphQL type: {type_name} points to nothing")]
    NullPointer { type_name: &'static str },
    #[error("could not determine GraphQL type for value of type {0:?}")]
    UnknownType(TypeId),
}

/// Maps a runtime value to the member type of a union.
#[derive(Clone)]
pub struct TypeResolver {
    members: HashMap<TypeId, Arc<ObjectType>>,
    derefs: HashMap<TypeId, (TypeKey, Accessor)>,
}

impl TypeResolver {
    pub(crate) fn new(
        members: HashMap<TypeId, Arc<ObjectType>>,
        derefs: HashMap<TypeId, (TypeKey, Accessor)>,
    ) -> Self {
        Self { members, derefs }
    }

    /// Follows pointers until a member type is found.
    ///
    /// Only pointer types recorded by the builder are followed; see
    /// [`TypeResolver::resolve_shape`] for values whose shape is known.
    pub fn resolve(&self, value: &dyn Any) -> Result<Arc<ObjectType>, UnionResolveError> {
        let mut current = value;
        loop {
            let id = Any::type_id(current);
            if let Some(object) = self.members.get(&id) {
                return Ok(object.clone());
            }
            let Some((key, deref)) = self.derefs.get(&id) else {
                return Err(UnionResolveError::UnknownType(id));
            };
            current = deref(current).ok_or(UnionResolveError::NullPointer {
                type_name: key.name(),
            })?;
        }
    }

    /// Like [`TypeResolver::resolve`], but peels pointer layers off `shape`,
    /// the shape of `value`, so any pointer is followed.
    pub fn resolve_shape(
        &self,
        value: &dyn Any,
        shape: Shape,
    ) -> Result<Arc<ObjectType>, UnionResolveError> {
        let mut current = value;
        let mut shape = shape;
        loop {
            if let Some(object) = self.members.get(&shape.key.id()) {
                return Ok(object.clone());
            }
            let ShapeKind::Pointer { pointee, deref } = shape.kind else {
                return self.resolve(current);
            };
            current = deref(current).ok_or(UnionResolveError::NullPointer {
                type_name: shape.key.name(),
            })?;
            shape = pointee();
        }
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeResolver")
            .field("members", &self.members.len())
            .field("derefs", &self.derefs.len())
            .finish()
    }
}

#[derive(Debug)]
pub struct UnionType {
    name: String,
    description: String,
    members: Vec<Arc<ObjectType>>,
    resolver: TypeResolver,
}

impl UnionType {
    pub(crate) fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        members: Vec<Arc<ObjectType>>,
        resolver: TypeResolver,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            members,
            resolver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn members(&self) -> &[Arc<ObjectType>] {
        &self.members
    }

    /// Returns the member type of a concrete value.
    pub fn resolve_type(&self, value: &dyn Any) -> Result<Arc<ObjectType>, UnionResolveError> {
        self.resolver.resolve(value)
    }

    /// Returns the member type of `value`, dereferencing any pointer around it.
    pub fn resolve_type_of<T: Describe>(
        &self,
        value: &T,
    ) -> Result<Arc<ObjectType>, UnionResolveError> {
        self.resolver.resolve_shape(value, T::shape())
    }
}

// ============================================================================
// OutputType
// ============================================================================

/// Any type that can appear as the type of a field or argument.
#[derive(Debug, Clone)]
pub enum OutputType {
    Scalar(Arc<ScalarType>),
    List(Box<OutputType>),
    Object(Arc<ObjectType>),
    Union(Arc<UnionType>),
}

impl OutputType {
    pub fn boolean() -> Self {
        OutputType::Scalar(BOOLEAN.clone())
    }

    pub fn int() -> Self {
        OutputType::Scalar(INT.clone())
    }

    pub fn float() -> Self {
        OutputType::Scalar(FLOAT.clone())
    }

    pub fn string() -> Self {
        OutputType::Scalar(STRING.clone())
    }

    pub fn timestamp() -> Self {
        OutputType::Scalar(TIMESTAMP.clone())
    }

    pub fn json() -> Self {
        OutputType::Scalar(JSON.clone())
    }

    pub fn list(of: OutputType) -> Self {
        OutputType::List(Box::new(of))
    }

    /// Display name; lists are written `[Item]`.
    pub fn name(&self) -> String {
        match self {
            OutputType::List(of) => format!("[{}]", of.name()),
            named => named.named_type_name().to_string(),
        }
    }

    /// Name of the innermost named type, looking through lists.
    pub fn named_type_name(&self) -> &str {
        match self {
            OutputType::Scalar(scalar) => scalar.name(),
            OutputType::List(of) => of.named_type_name(),
            OutputType::Object(object) => object.name(),
            OutputType::Union(union) => union.name(),
        }
    }

    pub fn as_object(&self) -> Option<&Arc<ObjectType>> {
        match self {
            OutputType::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns true if both refer to the same handle.
    pub fn same(&self, other: &OutputType) -> bool {
        match (self, other) {
            (OutputType::Scalar(a), OutputType::Scalar(b)) => Arc::ptr_eq(a, b),
            (OutputType::List(a), OutputType::List(b)) => a.same(b),
            (OutputType::Object(a), OutputType::Object(b)) => Arc::ptr_eq(a, b),
            (OutputType::Union(a), OutputType::Union(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// External type names must start with an uppercase letter.
pub fn is_valid_type_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
