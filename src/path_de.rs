use serde::de::DeserializeOwned;
use thiserror::Error;

/// A document that could not be turned into the requested type.
#[derive(Debug, Error)]
#[error("at JSON path {path} → {message}")]
pub struct LoadError {
    pub path: String,
    pub message: String,
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Same as `from_str_with_path`, for a document already parsed into a
/// `serde_json::Value` (after a JSON pointer or jq filter was applied).
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, LoadError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| LoadError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
