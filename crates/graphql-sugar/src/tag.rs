//! Parsing of `arg` tags.
//!
//! An `arg` tag is a comma separated list of tokens. The first token is the
//! external argument name, every following token is an option, either a bare
//! key (`required`) or a `key:value` pair.
//!
//! ```text
//! "id,required"          -> name "id", options {required: ""}
//! ",coalesceZero"        -> native field name, options {coalesceZero: ""}
//! "limit,max:100"        -> name "limit", options {max: "100"}
//! "-"                    -> field does not participate
//! ```

use indexmap::IndexMap;

/// Separates the tokens of a tag.
pub const SEPARATOR: char = ',';

/// A name equal to this sentinel hides the field from schemas and binding.
pub const HIDDEN: &str = "-";

/// Separates an option key from its value.
pub const ASSIGNOR: char = ':';

/// Option marking an argument that must be present in the request.
pub const REQUIRED: &str = "required";

/// Option turning a conversion failure into the field's zero value.
pub const COALESCE_ZERO: &str = "coalesceZero";

/// Options attached to a tagged field, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions(IndexMap<String, String>);

impl TagOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns true if the option is present, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the value of an option. Bare options yield `Some("")`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_required(&self) -> bool {
        self.contains(REQUIRED)
    }

    pub fn coalesces_zero(&self) -> bool {
        self.contains(COALESCE_ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The parsed form of an `arg` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTag {
    /// External argument name.
    pub name: String,
    pub options: TagOptions,
}

impl FieldTag {
    pub fn is_required(&self) -> bool {
        self.options.is_required()
    }

    pub fn coalesces_zero(&self) -> bool {
        self.options.coalesces_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    /// An option token has no key, as in `id,,required` or `id,:5`.
    #[error("empty option at position {position} in tag `{tag}`")]
    EmptyOption { tag: String, position: usize },
}

/// Parse a single tag.
///
/// Returns `Ok(None)` when the tag hides the field. An empty name falls back
/// to `native_name`.
pub fn parse_tag(native_name: &str, tag: &str) -> Result<Option<FieldTag>, TagError> {
    let mut tokens = tag.split(SEPARATOR);
    // `split` always yields at least one token.
    let name = tokens.next().unwrap_or_default();
    if name == HIDDEN {
        return Ok(None);
    }
    let name = if name.is_empty() { native_name } else { name };

    let mut options = TagOptions::new();
    for (index, token) in tokens.enumerate() {
        let (key, value) = token.split_once(ASSIGNOR).unwrap_or((token, ""));
        if key.is_empty() {
            return Err(TagError::EmptyOption {
                tag: tag.to_string(),
                position: index + 1,
            });
        }
        options.insert(key, value);
    }

    Ok(Some(FieldTag {
        name: name.to_string(),
        options,
    }))
}

/// Lenient form of [`parse_tag`] used while walking struct fields.
///
/// A malformed tag makes the field non-participating instead of failing the
/// whole struct; the problem is reported as a warning.
pub(crate) fn field_tag(owner: &str, native_name: &str, tag: &str) -> Option<FieldTag> {
    match parse_tag(native_name, tag) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::warn!(
                owner,
                field = native_name,
                %error,
                "ignoring field with malformed arg tag"
            );
            None
        }
    }
}
