//! Static shape descriptors for Rust types.
//!
//! A [`Shape`] tells the schema builder and the argument binder what a type
//! looks like: a primitive, a pointer to another shape, a sequence, a struct
//! with fields, or something opaque. Structs get their shape from
//! `#[derive(Describe)]`; the standard library types are covered here.
//!
//! Struct fields carry plain function pointers for reading, writing and
//! resetting the field through `dyn Any`, so no runtime reflection is needed.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

/// Identity of a concrete Rust type, used as the key of every registry.
///
/// Equality and hashing only look at the [`TypeId`]; the name is kept for
/// error messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Reads a sub-value (a field, or the target of a pointer) off a value.
pub type Accessor = fn(&dyn Any) -> Option<&dyn Any>;

/// Moves a converted value into a field. Hands the value back on type mismatch.
pub type Assigner = fn(&mut dyn Any, Box<dyn Any + Send>) -> Result<(), Box<dyn Any + Send>>;

/// Resets a field to its zero value. Returns false if the field has none.
pub type Resetter = fn(&mut dyn Any) -> bool;

/// Built-in scalar families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Int,
    Float,
    String,
}

/// The structural kind of a type.
#[derive(Clone)]
pub enum ShapeKind {
    Primitive(PrimitiveKind),
    /// `Box<T>`, `Arc<T>`, `Rc<T>`, `Option<T>`.
    ///
    /// `deref` yields the pointee, or `None` for an empty `Option`.
    Pointer {
        pointee: fn() -> Shape,
        deref: Accessor,
    },
    /// `Vec<T>`, `VecDeque<T>`, `[T; N]`.
    Sequence { item: fn() -> Shape },
    Struct(StructShape),
    /// Anything without a structural mapping. The string names the kind.
    Opaque(&'static str),
}

impl ShapeKind {
    /// Short name of the kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ShapeKind::Primitive(_) => "primitive",
            ShapeKind::Pointer { .. } => "pointer",
            ShapeKind::Sequence { .. } => "sequence",
            ShapeKind::Struct(_) => "struct",
            ShapeKind::Opaque(kind) => *kind,
        }
    }
}

impl fmt::Debug for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
            ShapeKind::Pointer { pointee, .. } => {
                f.debug_tuple("Pointer").field(&pointee().key).finish()
            }
            ShapeKind::Sequence { item } => f.debug_tuple("Sequence").field(&item().key).finish(),
            ShapeKind::Struct(shape) => f.debug_tuple("Struct").field(shape).finish(),
            ShapeKind::Opaque(kind) => f.debug_tuple("Opaque").field(kind).finish(),
        }
    }
}

/// Shape of a type together with its identity.
#[derive(Debug, Clone)]
pub struct Shape {
    pub key: TypeKey,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn new<T: ?Sized + 'static>(kind: ShapeKind) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            kind,
        }
    }

    pub fn primitive<T: 'static>(kind: PrimitiveKind) -> Self {
        Self::new::<T>(ShapeKind::Primitive(kind))
    }

    pub fn structure<T: 'static>(shape: StructShape) -> Self {
        Self::new::<T>(ShapeKind::Struct(shape))
    }

    pub fn opaque<T: ?Sized + 'static>(kind: &'static str) -> Self {
        Self::new::<T>(ShapeKind::Opaque(kind))
    }

    pub fn as_struct(&self) -> Option<&StructShape> {
        match &self.kind {
            ShapeKind::Struct(shape) => Some(shape),
            _ => None,
        }
    }

    /// Declared name of the struct this shape wraps, looking through pointers
    /// and sequences.
    pub fn declared_name(&self) -> Option<&'static str> {
        match &self.kind {
            ShapeKind::Struct(shape) => Some(shape.name),
            ShapeKind::Pointer { pointee, .. } => pointee().declared_name(),
            ShapeKind::Sequence { item } => item().declared_name(),
            ShapeKind::Primitive(_) | ShapeKind::Opaque(_) => None,
        }
    }
}

/// Fields of a struct in declaration order.
#[derive(Debug, Clone)]
pub struct StructShape {
    /// Name used for the derived object type.
    pub name: &'static str,
    pub fields: Vec<FieldShape>,
}

/// One struct field and its annotations.
#[derive(Clone)]
pub struct FieldShape {
    /// The Rust identifier of the field.
    pub name: &'static str,
    /// Raw `arg` tag; see [`crate::tag`].
    pub arg: Option<&'static str>,
    /// External field name in output types. `-` hides the field.
    pub output: Option<&'static str>,
    pub description: Option<&'static str>,
    pub deprecation: Option<&'static str>,
    /// Merge the fields of this struct-typed field into the parent.
    pub flatten: bool,
    pub shape: fn() -> Shape,
    pub get: Accessor,
    pub set: Assigner,
    pub reset: Resetter,
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("arg", &self.arg)
            .field("output", &self.output)
            .field("description", &self.description)
            .field("deprecation", &self.deprecation)
            .field("flatten", &self.flatten)
            .finish_non_exhaustive()
    }
}

/// Types with a static [`Shape`].
///
/// Derive it for structs with `#[derive(Describe)]`:
///
/// ```ignore
/// #[derive(Describe, Default)]
/// struct User {
///     #[sugar(name = "id", arg = "id,required", desc = "A short identifier.")]
///     id: String,
///     #[sugar(name = "age", arg = "age")]
///     age: i64,
/// }
/// ```
pub trait Describe: 'static {
    fn shape() -> Shape;
}

/// Shorthand for `T::shape()`, handy when listing union members.
pub fn shape_of<T: Describe>() -> Shape {
    T::shape()
}

// ============================================================================
// Primitive Type Implementations
// ============================================================================

macro_rules! impl_primitive {
    ($kind:ident: $($t:ty),*) => {
        $(
            impl Describe for $t {
                fn shape() -> Shape {
                    Shape::primitive::<$t>(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

impl_primitive!(Bool: bool);
impl_primitive!(Int: i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_primitive!(Float: f32, f64);
impl_primitive!(String: String, &'static str, char);

// ============================================================================
// Pointer Implementations
// ============================================================================

impl<T: Describe> Describe for Box<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Pointer {
            pointee: T::shape,
            deref: |value| {
                value
                    .downcast_ref::<Box<T>>()
                    .map(|inner| &**inner as &dyn Any)
            },
        })
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Pointer {
            pointee: T::shape,
            deref: |value| {
                value
                    .downcast_ref::<Arc<T>>()
                    .map(|inner| &**inner as &dyn Any)
            },
        })
    }
}

impl<T: Describe> Describe for Rc<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Pointer {
            pointee: T::shape,
            deref: |value| {
                value
                    .downcast_ref::<Rc<T>>()
                    .map(|inner| &**inner as &dyn Any)
            },
        })
    }
}

/// `Option<T>` is a nullable reference to `T`.
impl<T: Describe> Describe for Option<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Pointer {
            pointee: T::shape,
            deref: |value| {
                value
                    .downcast_ref::<Option<T>>()
                    .and_then(|inner| inner.as_ref())
                    .map(|inner| inner as &dyn Any)
            },
        })
    }
}

// ============================================================================
// Sequence Implementations
// ============================================================================

impl<T: Describe> Describe for Vec<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Sequence { item: T::shape })
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Sequence { item: T::shape })
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Sequence { item: T::shape })
    }
}

// ============================================================================
// Shapes Without A Mapping
// ============================================================================

impl<K: 'static, V: 'static> Describe for HashMap<K, V> {
    fn shape() -> Shape {
        Shape::opaque::<Self>("map")
    }
}

impl<K: 'static, V: 'static> Describe for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::opaque::<Self>("map")
    }
}

impl Describe for () {
    fn shape() -> Shape {
        Shape::opaque::<Self>("unit")
    }
}

impl<A: 'static, B: 'static> Describe for (A, B) {
    fn shape() -> Shape {
        Shape::opaque::<Self>("tuple")
    }
}

impl<A: 'static, B: 'static, C: 'static> Describe for (A, B, C) {
    fn shape() -> Shape {
        Shape::opaque::<Self>("tuple")
    }
}

impl Describe for serde_json::Value {
    fn shape() -> Shape {
        Shape::opaque::<Self>("dynamic")
    }
}
