//! Structured error bodies returned by the API

use serde::{Deserialize, Serialize};

/// A single error entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `INVALID_ATTRIBUTE_TYPE`
    #[serde(default)]
    pub message_code: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Offending request field, when the server names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    /// The message with ` (field: ...)` appended when a field is named.
    pub fn describe(&self) -> String {
        match self.field.as_deref() {
            Some(field) if !field.is_empty() => format!("{} (field: {})", self.message, field),
            _ => self.message.clone(),
        }
    }
}

/// The `{errors: [...]}` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error entries
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

impl ErrorEnvelope {
    /// Extract error entries from a raw error response body.
    ///
    /// Accepts both the bare `{errors: [...]}` block and the full
    /// `{data, pagination, error: {errors: [...]}}` envelope. Returns an empty
    /// list when the body is not JSON or carries no entries.
    pub fn parse_entries(body: &[u8]) -> Vec<ErrorDetail> {
        #[derive(Deserialize)]
        struct Body {
            #[serde(default)]
            errors: Vec<ErrorDetail>,
            #[serde(default)]
            error: Option<ErrorEnvelope>,
        }

        match serde_json::from_slice::<Body>(body) {
            Ok(Body { errors, .. }) if !errors.is_empty() => errors,
            Ok(Body {
                error: Some(nested),
                ..
            }) => nested.errors,
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_errors_block() {
        let entries = ErrorEnvelope::parse_entries(
            br#"{"errors":[{"messageCode":"INVALID_INPUT","message":"bad budget","field":"budgetAmount"}]}"#,
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message_code, "INVALID_INPUT");
        assert_eq!(entries[0].describe(), "bad budget (field: budgetAmount)");
    }

    #[test]
    fn test_parse_nested_error_envelope() {
        let entries = ErrorEnvelope::parse_entries(
            br#"{"data":null,"pagination":null,"error":{"errors":[{"messageCode":"NOT_FOUND","message":"no such campaign"}]}}"#,
        );

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].describe(), "no such campaign");
    }

    #[test]
    fn test_parse_non_json_is_empty() {
        assert!(ErrorEnvelope::parse_entries(b"<html>502 Bad Gateway</html>").is_empty());
        assert!(ErrorEnvelope::parse_entries(b"").is_empty());
    }
}
