use darling::FromDeriveInput;
use syn::Path;

#[derive(Debug, Default, FromDeriveInput)]
#[darling(attributes(sugar), default)]
pub struct ContainerAttrs {
    #[darling(rename = "crate")]
    pub crate_path: Option<Path>,
    /// Name of the derived object type. Defaults to the struct name.
    pub name: Option<String>,
}
