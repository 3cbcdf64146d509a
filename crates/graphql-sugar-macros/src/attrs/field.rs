use darling::FromField;

#[derive(Debug, Default, FromField)]
#[darling(default, attributes(sugar))]
pub struct FieldAttrs {
    /// Argument tag, e.g. `"id,required"`.
    pub arg: Option<String>,
    /// Field name in the derived object type.
    pub name: Option<String>,
    pub desc: Option<String>,
    pub deprecation: Option<String>,
    /// Merge the fields of this struct into the parent object.
    pub flatten: bool,
}

impl FieldAttrs {
    /// Fields without any annotation are left out of the shape.
    pub fn is_described(&self) -> bool {
        self.arg.is_some() || self.name.is_some() || self.flatten
    }
}
