use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Graph API error: {0}")]
    GraphApiError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Token not found. Please run 'ctl365-catalog login' first")]
    TokenNotFound,

    #[error("Tenant '{0}' not found")]
    TenantNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Settings catalog mapping

    #[error("setting instance is nil at {path}")]
    NilInstance { path: String },

    #[error("setting instance is nil or unrecognized at {path}: unsupported setting instance type '{odata_type}'")]
    UnsupportedInstanceType { path: String, odata_type: String },

    #[error("unsupported simple setting value type '{odata_type}' at {path}")]
    UnsupportedSimpleValueType { path: String, odata_type: String },

    #[error("required field '{field}' is missing at {path}")]
    MissingField { path: String, field: &'static str },

    #[error("value '{value}' at {path} is not a valid integer")]
    InvalidInteger { path: String, value: String },

    #[error("integer value {value} at {path} is outside the 32-bit signed range")]
    IntegerOutOfRange { path: String, value: i64 },

    #[error("unsupported secret value state '{state}' at {path}")]
    UnsupportedSecretState { path: String, state: String },

    #[error("template id '{id}' at {path} is not a GUID")]
    InvalidTemplateId { path: String, id: String },
}

impl CatalogError {
    /// True for errors raised while walking a settings tree, as opposed to I/O, auth or HTTP failures.
    pub fn is_mapping_error(&self) -> bool {
        matches!(
            self,
            CatalogError::NilInstance { .. }
                | CatalogError::UnsupportedInstanceType { .. }
                | CatalogError::UnsupportedSimpleValueType { .. }
                | CatalogError::MissingField { .. }
                | CatalogError::InvalidInteger { .. }
                | CatalogError::IntegerOutOfRange { .. }
                | CatalogError::UnsupportedSecretState { .. }
                | CatalogError::InvalidTemplateId { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Parse Graph API error response and provide helpful context
pub fn enhance_graph_error(error_response: &str) -> String {
    if let Ok(error_json) = serde_json::from_str::<serde_json::Value>(error_response) {
        if let Some(error_obj) = error_json.get("error") {
            let code = error_obj
                .get("code")
                .and_then(|c| c.as_str())
                .unwrap_or("Unknown");
            let message = error_obj
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("No message");

            let hint = match code {
                "Unauthorized" | "InvalidAuthenticationToken" => {
                    "\nHint: Your authentication token may have expired. Try running 'ctl365-catalog login' again."
                }
                "Forbidden" | "InsufficientPrivileges" => {
                    "\nHint: The app registration needs DeviceManagementConfiguration.ReadWrite.All with admin consent."
                }
                "BadRequest" => {
                    if message.contains("settingDefinitionId") || message.contains("Setting") {
                        "\nHint: A setting definition id or value was rejected. Check the ids against the settings catalog."
                    } else if message.contains("already exists") {
                        "\nHint: A policy with this name already exists. Use a different name or delete the existing policy."
                    } else {
                        "\nHint: The request format may be incorrect. Check the policy structure."
                    }
                }
                "NotFound" => {
                    "\nHint: The requested policy doesn't exist. Check the policy id."
                }
                "TooManyRequests" => {
                    "\nHint: API rate limit exceeded. Wait a moment and try again."
                }
                _ => "",
            };

            return format!("{}: {}{}", code, message, hint);
        }
    }

    error_response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_graph_error_with_hint() {
        let body = r#"{"error":{"code":"NotFound","message":"Policy not found"}}"#;
        let enhanced = enhance_graph_error(body);
        assert!(enhanced.starts_with("NotFound: Policy not found"));
        assert!(enhanced.contains("Hint"));
    }

    #[test]
    fn test_enhance_graph_error_passthrough() {
        assert_eq!(enhance_graph_error("plain text"), "plain text");
    }

    #[test]
    fn test_mapping_error_classification() {
        let err = CatalogError::NilInstance {
            path: "settings[0]".into(),
        };
        assert!(err.is_mapping_error());
        assert!(!CatalogError::TokenNotFound.is_mapping_error());
    }
}
