//! Invoice data models produced by the extraction pipeline.
//!
//! The model's answer is kept as a raw [`serde_json::Value`]: nothing is
//! coerced or validated unless the caller asks for it. [`InvoiceRecord`] is a
//! typed view over that value for display and export.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder the prompt asks the model to use for absent fields.
pub const NOT_FOUND: &str = "Not Found";

/// Top-level invoice fields, in prompt order.
pub const INVOICE_FIELDS: [&str; 6] = [
    "vendor_name",
    "invoice_number",
    "invoice_date",
    "due_date",
    "total_amount",
    "currency",
];

/// Line item fields, in prompt order.
pub const LINE_ITEM_FIELDS: [&str; 4] = ["description", "quantity", "unit_price", "total"];

/// Output of one upload-and-extract cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Full text of the PDF, pages concatenated in order.
    pub extracted_text: String,
    /// Parsed model answer or the parse failure.
    pub structured_data: StructuredData,
}

/// The model's answer: either the parsed JSON or a parse failure record.
///
/// Serialized untagged, so consumers see either the invoice mapping or
/// `{"error": ..., "raw_response": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredData {
    /// The model output could not be parsed.
    Error(ExtractionError),
    /// Parsed JSON, returned exactly as the model produced it, key order
    /// included.
    ///
    /// Integers outside the `i64`/`u64` range are held as `f64` and lose
    /// precision.
    Record(Value),
}

/// Parse failure kept as data rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionError {
    /// Human-readable failure message.
    pub error: String,
    /// The unparsed model output, verbatim.
    pub raw_response: String,
}

impl StructuredData {
    /// Whether this is a parse failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The parsed JSON, if parsing succeeded.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Record(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Render a top-level field as text, or `default` when it is absent.
    ///
    /// Non-string JSON values are rendered in their JSON form.
    pub fn field_or(&self, key: &str, default: &str) -> String {
        self.as_value()
            .and_then(|v| v.get(key))
            .and_then(render_scalar)
            .unwrap_or_else(|| default.to_string())
    }

    /// Typed view of the record. `None` for failures or non-invoice shapes.
    pub fn record(&self) -> Option<InvoiceRecord> {
        self.as_value()
            .and_then(|v| InvoiceRecord::from_value(v).ok())
    }

    /// JSON for export, indented with two spaces.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Typed invoice view. Absent fields read as [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub vendor_name: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub invoice_number: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub invoice_date: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub due_date: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub total_amount: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient_items")]
    pub line_items: Vec<LineItem>,
}

/// One invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub quantity: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub unit_price: String,
    #[serde(default = "not_found", deserialize_with = "lenient_text")]
    pub total: String,
}

impl InvoiceRecord {
    /// Build the typed view from parsed model output.
    ///
    /// Only JSON objects are accepted; serde would otherwise fill the fields
    /// of a JSON array by position.
    pub fn from_value(value: &Value) -> serde_json::Result<Self> {
        if !value.is_object() {
            return Err(serde_json::Error::custom(format!(
                "expected a JSON object, got {}",
                json_kind(value)
            )));
        }
        Self::deserialize(value)
    }

    /// Check that a parsed value has the invoice shape.
    ///
    /// Returns a description of the first mismatch. Missing keys are allowed;
    /// present ones must hold scalars, and `line_items` must be a list of
    /// objects with scalar values.
    pub fn check_shape(value: &Value) -> Result<(), String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {}", json_kind(value)))?;

        for field in INVOICE_FIELDS {
            if let Some(v) = obj.get(field) {
                if !is_scalar(v) {
                    return Err(format!("field '{}' is {}", field, json_kind(v)));
                }
            }
        }

        match obj.get("line_items") {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    let item_obj = item.as_object().ok_or_else(|| {
                        format!("line_items[{}] is {}", i, json_kind(item))
                    })?;
                    for field in LINE_ITEM_FIELDS {
                        if let Some(v) = item_obj.get(field) {
                            if !is_scalar(v) {
                                return Err(format!(
                                    "line_items[{}].{} is {}",
                                    i,
                                    field,
                                    json_kind(v)
                                ));
                            }
                        }
                    }
                }
                Ok(())
            }
            Some(other) => Err(format!("field 'line_items' is {}", json_kind(other))),
        }
    }
}

fn not_found() -> String {
    NOT_FOUND.to_string()
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(render_scalar(&value).unwrap_or_else(not_found))
}

fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(D::Error::custom(format!(
                    "line_items[{}] is {}",
                    i,
                    json_kind(item)
                )));
            }
            LineItem::deserialize(item).map_err(D::Error::custom)
        })
        .collect()
}
