mod container;
mod field;

pub use container::ContainerAttrs;
pub use field::FieldAttrs;
