use crate::app_dirs::AppDirs;
use crate::auth::{AllowList, Identity};
use crate::typing_policy::InputPolicy;
use crate::words::DEFAULT_WORD_LIST;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub word_list: String,
    pub words_file: Option<PathBuf>,
    pub lock_on_error: bool,
    /// Remote keymap endpoint; the local store is used when unset.
    pub server_url: Option<String>,
    pub session_cookie: Option<String>,
    pub subject: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub allowed_emails: Vec<String>,
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_list: DEFAULT_WORD_LIST.to_string(),
            words_file: None,
            lock_on_error: true,
            server_url: None,
            session_cookie: None,
            subject: None,
            email: "local@localhost".to_string(),
            name: None,
            allowed_emails: Vec::new(),
            db_path: None,
        }
    }
}

impl Config {
    pub fn input_policy(&self) -> InputPolicy {
        InputPolicy::from_lock_flag(self.lock_on_error)
    }

    /// The local actor. Without an explicit subject the email stands in for it.
    pub fn identity(&self) -> Identity {
        Identity {
            subject: self.subject.clone().unwrap_or_else(|| self.email.clone()),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }

    pub fn allow_list(&self) -> AllowList {
        AllowList::new(&self.allowed_emails)
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .or_else(AppDirs::db_path)
            .unwrap_or_else(|| PathBuf::from("layertype_keymaps.db"))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("layertype_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
