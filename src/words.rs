use crate::error::{Error, Result};
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

static WORDS_DIR: Dir = include_dir!("src/words");

pub const DEFAULT_WORD_LIST: &str = "beginner";

/// An ordered practice set.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct WordList {
    pub name: String,
    pub words: Vec<String>,
}

impl WordList {
    /// One of the lists compiled into the binary.
    pub fn bundled(name: &str) -> Result<Self> {
        let file = WORDS_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| Error::UnknownWordList(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| Error::UnknownWordList(name.to_string()))?;
        Self::from_json(contents)
    }

    pub fn bundled_names() -> Vec<String> {
        WORDS_DIR
            .files()
            .filter_map(|f| f.path().file_stem())
            .filter_map(|stem| stem.to_str())
            .map(str::to_string)
            .sorted()
            .collect()
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
