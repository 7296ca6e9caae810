use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Normalized clothing description produced by the upstream classifier.
///
/// Immutable once validated. Attribute values are always strings; numbers and
/// booleans in the incoming JSON are stringified and nulls are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeQuery {
    #[serde(default)]
    pub clothing_type: String,
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: BTreeMap<String, String>,
}

impl AttributeQuery {
    #[must_use]
    pub fn new(clothing_type: impl Into<String>) -> Self {
        Self {
            clothing_type: clothing_type.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the trimmed attribute value, or `None` when absent or blank.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.attribute("color")
    }

    /// `true` when neither the clothing type nor any attribute carries a value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.clothing_type.trim().is_empty()
            && self.attributes.values().all(|v| v.trim().is_empty())
    }
}

/// Request body accepted by `POST /api/scrape`.
///
/// This is also the classifier's response shape, so `status` and `error` are
/// accepted and honored when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub clothing_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_attributes")]
    pub attributes: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No clothing attributes provided")]
    MissingBody,

    #[error("Missing required fields: either clothing_type or search_string is required")]
    MissingFields,

    /// The classifier reported `status: false`; no retailer is contacted.
    #[error("Failed to analyze image: {0}")]
    UpstreamFailure(String),

    #[error("Invalid request body: {0}")]
    InvalidJson(String),
}

impl ScrapeRequest {
    /// Parse and validate a raw JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the body is empty, not JSON, or fails
    /// [`ScrapeRequest::validate`].
    pub fn from_json_slice(body: &[u8]) -> Result<AttributeQuery, ValidationError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ValidationError::MissingBody);
        }
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        match &value {
            serde_json::Value::Null => return Err(ValidationError::MissingBody),
            serde_json::Value::Object(map) if map.is_empty() => {
                return Err(ValidationError::MissingBody)
            }
            serde_json::Value::Object(_) => {}
            _ => {
                return Err(ValidationError::InvalidJson(
                    "expected a JSON object".to_string(),
                ))
            }
        }
        let request: ScrapeRequest = serde_json::from_value(value)
            .map_err(|e| ValidationError::InvalidJson(e.to_string()))?;
        request.validate()
    }

    /// Turn the request into an [`AttributeQuery`].
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UpstreamFailure`] when `status` is `false`.
    /// - [`ValidationError::MissingFields`] when neither `clothing_type` nor
    ///   `attributes.search_string` is present.
    pub fn validate(self) -> Result<AttributeQuery, ValidationError> {
        if self.status == Some(false) {
            let reason = self
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "classifier reported failure".to_string());
            return Err(ValidationError::UpstreamFailure(reason));
        }

        let attributes = self.attributes.unwrap_or_default();
        let has_search_string = attributes.contains_key("search_string");
        let Some(clothing_type) = self.clothing_type.or(has_search_string.then(String::new))
        else {
            return Err(ValidationError::MissingFields);
        };

        Ok(AttributeQuery {
            clothing_type,
            attributes,
        })
    }
}

fn lenient_attributes<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw.map(stringify_values).unwrap_or_default())
}

fn lenient_optional_attributes<'de, D>(
    deserializer: D,
) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw.map(stringify_values))
}

fn stringify_values(raw: BTreeMap<String, serde_json::Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null
                | serde_json::Value::Array(_)
                | serde_json::Value::Object(_) => return None,
            };
            Some((key, text))
        })
        .collect()
}
