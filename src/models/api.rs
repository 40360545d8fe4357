use serde::{ Serialize, Deserialize };

pub const GENERIC_ERROR_MESSAGE: &str = "Failed to process request";

/// JSON body returned for every failed chat request. Never carries error detail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl Default for ErrorBody {
    fn default() -> Self {
        Self { error: GENERIC_ERROR_MESSAGE.to_string() }
    }
}
