use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("Invalid XPath expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },

    #[error("XPath evaluation failed for '{expression}': {message}")]
    Evaluation { expression: String, message: String },

    #[error("Cannot convert '{value}' to {target}: {message}")]
    Conversion {
        value: String,
        target: &'static str,
        message: String,
    },

    #[error("XML serialization error: {0}")]
    Serialize(String),
}
