// Preferences: school identity, grade/class, weekend skip, transport settings.
use crate::client::FetchError;
use crate::context::AppContext;
use crate::model::{School, SchoolType, UserSelection};
use anyhow::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://open.neis.go.kr/hub/";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// One week. Longer intervals are clamped to this on load.
pub const MAX_REFRESH_INTERVAL_HOURS: u64 = 24 * 7;

fn default_refresh_interval() -> u64 {
    6
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub school_type: Option<SchoolType>,
    #[serde(default)]
    pub school_code: String,
    #[serde(default)]
    pub org_code: String,
    #[serde(default)]
    pub school_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub grade: u32,
    #[serde(default)]
    pub class_number: u32,
    #[serde(default)]
    pub skip_weekend: bool,

    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_hours: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            school_type: None,
            school_code: String::new(),
            org_code: String::new(),
            school_name: String::new(),
            department: String::new(),
            grade: 1,
            class_number: 1,
            skip_weekend: false,
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_interval_hours: 6,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Grade and class read as 0 are coerced to 1.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let mut config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.normalize();

        Ok(config)
    }

    /// Load, treating a missing file as a fresh install.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(c) => Ok(c),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Whether an error from [`Config::load`] means the file does not exist,
    /// as opposed to being unreadable or malformed.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            atomic_write(&path, toml_str)?;
            Ok(())
        })
    }

    pub fn normalize(&mut self) {
        if self.grade == 0 {
            self.grade = 1;
        }
        if self.class_number == 0 {
            self.class_number = 1;
        }
        if self.refresh_interval_hours == 0 {
            self.refresh_interval_hours = default_refresh_interval();
        }
        self.refresh_interval_hours = self.refresh_interval_hours.min(MAX_REFRESH_INTERVAL_HOURS);
    }

    /// The persisted school, or `ConfigurationMissing` until setup completes.
    pub fn school(&self) -> Result<School, FetchError> {
        if self.school_name.is_empty() {
            return Err(FetchError::ConfigurationMissing("school name"));
        }
        if self.school_code.is_empty() || self.org_code.is_empty() {
            return Err(FetchError::ConfigurationMissing("school code"));
        }
        let school_type = self
            .school_type
            .ok_or(FetchError::ConfigurationMissing("school type"))?;
        Ok(School {
            org_code: self.org_code.clone(),
            school_code: self.school_code.clone(),
            school_name: self.school_name.clone(),
            school_type,
        })
    }

    pub fn set_school(&mut self, school: &School) {
        self.school_name = school.school_name.clone();
        self.org_code = school.org_code.clone();
        self.school_code = school.school_code.clone();
        self.school_type = Some(school.school_type);
    }

    pub fn selection(&self) -> UserSelection {
        UserSelection {
            grade: self.grade.max(1),
            class_number: self.class_number.max(1),
            skip_weekend: self.skip_weekend,
            ..UserSelection::default()
        }
    }
}

fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let lock_path = file_path.with_extension("lock");
    let file = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)?;

    file.lock_exclusive()?;
    let result = f();
    file.unlock()?;
    result
}

/// Write to a .tmp sibling, then rename over the target.
fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}
