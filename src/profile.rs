use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Labels used when a known profile field is rendered into a prompt, in
/// the order they appear there.
const CONTEXT_FIELDS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("age", "Age"),
    ("gender", "Gender"),
    ("goals", "Nutritional Goals"),
    ("allergens", "Allergies"),
    ("dietary", "Dietary preference"),
];

/// Free-form health profile submitted by the user.
///
/// Nothing is validated. A missing or blank field simply means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile {
    fields: BTreeMap<String, String>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build from a submitted form. Numbers and booleans become text, lists
    /// are joined with ", " and nulls are dropped.
    pub fn from_form(form: Map<String, Value>) -> Self {
        Self::from_fields(
            form.into_iter()
                .filter_map(|(key, value)| form_text(value).map(|text| (key, text))),
        )
    }

    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_form(serde_json::from_str(json_str)?))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Trimmed value of a field, `None` when absent or blank.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// True when no field carries a value.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// "Personal Information" block for prompts, empty when the profile is blank.
    pub fn generate_context(&self) -> String {
        if self.is_blank() {
            return String::new();
        }

        let mut context = String::from("Personal Information:\n");
        for (key, label) in CONTEXT_FIELDS {
            if let Some(value) = self.get_str(key) {
                context.push_str(&format!("- {}: {}\n", label, value));
            }
        }
        context.push('\n');
        context
    }
}

fn form_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(form_text).collect();
            Some(parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}
