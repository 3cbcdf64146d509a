//! Derivation of output types from shapes.
//!
//! [`TypeBuilder`] keeps a cache from Rust type to output type. Known types
//! are registered up front; everything else is derived on first use and
//! cached, so asking twice for the same type returns the same handle.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::schema::{
    FieldResolver, ObjectField, ObjectType, OutputType, TypeResolver, UnionType,
    is_valid_type_name,
};
use crate::shape::{Accessor, Describe, PrimitiveKind, Shape, ShapeKind, StructShape, TypeKey};
use crate::tag::HIDDEN;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("refusing to build GraphQL type with lowercase name {name:?} for {type_name}")]
    LowercaseTypeName { name: String, type_name: TypeKey },
    #[error("cannot convert {kind} kind ({type_name})")]
    UnsupportedKind {
        kind: &'static str,
        type_name: TypeKey,
    },
    #[error("must register a type for {0} before using it in a union type")]
    UnregisteredUnionMember(TypeKey),
    #[error("{0} is registered as a non-object type and cannot be a union member")]
    NotAnObject(TypeKey),
    #[error("cannot flatten field {field} of type {type_name}: not a struct")]
    FlattenNonStruct {
        field: &'static str,
        type_name: TypeKey,
    },
}

/// An entry added while an object type is being derived.
#[derive(Debug, Clone, Copy)]
enum Pending {
    Known(TypeKey),
    Deref(TypeId),
}

/// Cache of output types, keyed by Rust type.
#[derive(Debug)]
pub struct TypeBuilder {
    known: HashMap<TypeKey, OutputType>,
    /// Every pointer type seen so far, for resolving union values.
    derefs: HashMap<TypeId, (TypeKey, Accessor)>,
    /// Entries to drop if the object being derived fails.
    pending: Vec<Pending>,
    /// Number of object types currently being derived.
    depth: usize,
}

impl Default for TypeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeBuilder {
    /// A builder that maps `RawJson` to `JSON` and, with the `chrono`
    /// feature, `DateTime<Utc>` to `Timestamp`.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        builder.insert(TypeKey::of::<crate::RawJson>(), OutputType::json());
        #[cfg(feature = "chrono")]
        builder.insert(
            TypeKey::of::<chrono::DateTime<chrono::Utc>>(),
            OutputType::timestamp(),
        );
        builder
    }

    /// A builder without any known type.
    pub fn empty() -> Self {
        Self {
            known: HashMap::new(),
            derefs: HashMap::new(),
            pending: Vec::new(),
            depth: 0,
        }
    }

    fn insert(&mut self, key: TypeKey, ty: OutputType) {
        if self.known.insert(key, ty).is_none() && self.depth > 0 {
            self.pending.push(Pending::Known(key));
        }
    }

    fn insert_deref(&mut self, key: TypeKey, deref: Accessor) {
        if self.derefs.insert(key.id(), (key, deref)).is_none() && self.depth > 0 {
            self.pending.push(Pending::Deref(key.id()));
        }
    }

    /// Drops everything cached since `checkpoint`.
    fn rollback(&mut self, checkpoint: usize) {
        for pending in self.pending.drain(checkpoint..) {
            match pending {
                Pending::Known(key) => {
                    self.known.remove(&key);
                }
                Pending::Deref(id) => {
                    self.derefs.remove(&id);
                }
            }
        }
    }

    /// Maps `T` to `ty`, overriding whatever would be derived for it.
    pub fn register_known_type<T: 'static>(&mut self, ty: OutputType) -> Result<(), BuildError> {
        self.register_known_key(TypeKey::of::<T>(), ty)
    }

    pub fn register_known_key(&mut self, key: TypeKey, ty: OutputType) -> Result<(), BuildError> {
        let name = ty.named_type_name();
        if !is_valid_type_name(name) {
            return Err(BuildError::LowercaseTypeName {
                name: name.to_string(),
                type_name: key,
            });
        }
        debug!(type_name = key.name(), ty = %ty, "registered known type");
        self.insert(key, ty);
        Ok(())
    }

    pub fn known_type(&self, key: TypeKey) -> Option<&OutputType> {
        self.known.get(&key)
    }

    /// Returns the output type of `T`, deriving it if needed.
    ///
    /// `name` and `description` are used when `T` is a struct seen for the
    /// first time.
    pub fn output_type<T: Describe>(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<OutputType, BuildError> {
        self.output_type_of(name, description, T::shape())
    }

    pub fn output_type_of(
        &mut self,
        name: &str,
        description: &str,
        shape: Shape,
    ) -> Result<OutputType, BuildError> {
        if let Some(ty) = self.known.get(&shape.key) {
            return Ok(ty.clone());
        }

        let key = shape.key;
        let ty = match shape.kind {
            ShapeKind::Primitive(kind) => primitive_type(kind),
            ShapeKind::Pointer { pointee, deref } => {
                self.insert_deref(key, deref);
                self.output_type_of(name, description, pointee())?
            }
            ShapeKind::Sequence { item } => {
                OutputType::list(self.output_type_of(name, description, item())?)
            }
            ShapeKind::Struct(shape) => self.object(key, name, description, &shape)?,
            ShapeKind::Opaque(kind) => {
                return Err(BuildError::UnsupportedKind {
                    kind,
                    type_name: key,
                });
            }
        };

        self.insert(key, ty.clone());
        Ok(ty)
    }

    fn object(
        &mut self,
        key: TypeKey,
        name: &str,
        description: &str,
        shape: &StructShape,
    ) -> Result<OutputType, BuildError> {
        if !is_valid_type_name(name) {
            return Err(BuildError::LowercaseTypeName {
                name: name.to_string(),
                type_name: key,
            });
        }

        // Reserved before the fields are built so that recursive references
        // find it.
        let object = Arc::new(ObjectType::new(name, description));
        let checkpoint = self.pending.len();
        self.depth += 1;
        self.insert(key, OutputType::Object(object.clone()));

        let mut fields = IndexMap::new();
        let collected = self.collect_fields(shape, &[], &mut fields);
        self.depth -= 1;
        if let Err(error) = collected {
            // Types derived on the way may refer to the abandoned object.
            self.rollback(checkpoint);
            return Err(error);
        }
        if self.depth == 0 {
            self.pending.clear();
        }
        debug!(name, type_name = key.name(), fields = fields.len(), "derived object type");
        object.set_fields(fields);
        Ok(OutputType::Object(object))
    }

    /// Adds the fields of `shape` to `fields`.
    ///
    /// Direct fields overwrite, flattened ones only fill gaps, so the outer
    /// struct always wins. `path` leads from the outermost struct to `shape`.
    fn collect_fields(
        &mut self,
        shape: &StructShape,
        path: &[Accessor],
        fields: &mut IndexMap<String, ObjectField>,
    ) -> Result<(), BuildError> {
        for field in &shape.fields {
            if field.flatten {
                let mut inner_path = path.to_vec();
                inner_path.push(field.get);
                let inner = self.flattened(field.name, (field.shape)(), &mut inner_path)?;
                let mut embedded = IndexMap::new();
                self.collect_fields(&inner, &inner_path, &mut embedded)?;
                for (name, embedded_field) in embedded {
                    fields.entry(name).or_insert(embedded_field);
                }
            }

            let Some(output) = field.output else {
                continue;
            };
            if output == HIDDEN {
                continue;
            }

            let field_shape = (field.shape)();
            let nested_name = field_shape.declared_name().unwrap_or(output);
            let ty = self.output_type_of(
                nested_name,
                field.description.unwrap_or_default(),
                field_shape,
            )?;
            let resolver = (!path.is_empty()).then(|| {
                let mut full = path.to_vec();
                full.push(field.get);
                FieldResolver::new(full)
            });
            fields.insert(
                output.to_string(),
                ObjectField {
                    ty,
                    description: field.description.map(str::to_string),
                    deprecation_reason: field.deprecation.map(str::to_string),
                    resolver,
                },
            );
        }
        Ok(())
    }

    /// Peels pointers off a flattened field, extending `path` with each
    /// dereference.
    fn flattened(
        &mut self,
        field: &'static str,
        shape: Shape,
        path: &mut Vec<Accessor>,
    ) -> Result<StructShape, BuildError> {
        let mut current = shape;
        loop {
            match current.kind {
                ShapeKind::Struct(inner) => return Ok(inner),
                ShapeKind::Pointer { pointee, deref } => {
                    self.insert_deref(current.key, deref);
                    path.push(deref);
                    current = pointee();
                }
                _ => {
                    return Err(BuildError::FlattenNonStruct {
                        field,
                        type_name: current.key,
                    });
                }
            }
        }
    }

    /// Builds a union of already known object types.
    ///
    /// Members may be given as pointers; they are looked up by their pointee.
    /// [`UnionType::resolve_type`] follows the pointer types this builder has
    /// seen so far; [`UnionType::resolve_type_of`] follows any pointer.
    pub fn union(
        &mut self,
        name: &str,
        description: &str,
        members: &[Shape],
    ) -> Result<Arc<UnionType>, BuildError> {
        let mut objects = Vec::with_capacity(members.len());
        let mut by_type = HashMap::new();
        for member in members {
            let mut current = member.clone();
            while let ShapeKind::Pointer { pointee, deref } = current.kind {
                self.insert_deref(current.key, deref);
                current = pointee();
            }
            let key = current.key;
            let object = match self.known.get(&key) {
                Some(OutputType::Object(object)) => object.clone(),
                Some(_) => return Err(BuildError::NotAnObject(key)),
                None => return Err(BuildError::UnregisteredUnionMember(key)),
            };
            by_type.insert(key.id(), object.clone());
            objects.push(object);
        }

        if !is_valid_type_name(name) {
            return Err(BuildError::LowercaseTypeName {
                name: name.to_string(),
                type_name: members.first().map_or(TypeKey::of::<()>(), |m| m.key),
            });
        }

        debug!(name, members = objects.len(), "built union type");
        let resolver = TypeResolver::new(by_type, self.derefs.clone());
        Ok(Arc::new(UnionType::new(name, description, objects, resolver)))
    }
}

fn primitive_type(kind: PrimitiveKind) -> OutputType {
    match kind {
        PrimitiveKind::Bool => OutputType::boolean(),
        PrimitiveKind::Int => OutputType::int(),
        PrimitiveKind::Float => OutputType::float(),
        PrimitiveKind::String => OutputType::string(),
    }
}
