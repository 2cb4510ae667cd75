use crate::keymap::MAX_CHARACTER_LEN;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store Error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("word list is empty")]
    EmptyWordList,

    #[error("word #{index} in the word list is empty")]
    EmptyWord { index: usize },

    #[error("unknown word list: {0}")]
    UnknownWordList(String),

    #[error("layer {0} is out of range (expected 0-5)")]
    LayerOutOfRange(i64),

    #[error("layer key {0:?} is not a number")]
    InvalidLayerKey(String),

    #[error("character must not be empty")]
    EmptyCharacter,

    #[error("character is {len} characters long (maximum {max})", max = MAX_CHARACTER_LEN)]
    CharacterTooLong { len: usize },

    #[error("no key is selected")]
    NoSelection,

    #[error("{0} is not allowed to sign in")]
    NotAllowed(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Failures at the keymap load/save boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered with a 4xx/5xx status. `message` is shown to the
    /// user exactly as reported.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("store error: {0}")]
    Store(String),
}

/// Store and validation failures seen through the save boundary. Validation
/// problems read like an unprocessable request.
impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Store(e) => ApiError::Store(e.to_string()),
            Error::Api(e) => e,
            other => ApiError::Rejected {
                status: 422,
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
