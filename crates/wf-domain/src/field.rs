use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field widget kind. `Derived` fields have no user-facing input and exist
/// only to be computed by a populator from other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Date,
    File,
    Derived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: String,
    pub text: String,
}

/// Declarative description of one form field. `FieldSpec` is pure data;
/// the populator callback lives on `FormSpec` (wf-forms) since `Fn` trait
/// objects don't round-trip through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub default: Option<Value>,
    pub options: Vec<FieldOption>,
    pub depends_on: Vec<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self { name: name.into(), kind, label: label.into(), required: false, placeholder: None, default: None, options: Vec::new(), depends_on: Vec::new() }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn depends_on(mut self, parents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// True if a form value should be treated as "unset" for the purposes of
/// the no-cascade check in `update_field` (missing, `null`, and `""` are
/// all equivalent).
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None => true,
        Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Two form values are equivalent for change-detection purposes if they are
/// identical, or if both are blank per [`is_blank`].
pub fn values_equivalent(a: Option<&Value>, b: Option<&Value>) -> bool {
    if is_blank(a) && is_blank(b) {
        return true;
    }
    a == b
}
