//! Startup configuration.
//!
//! The single CLI argument names a properties file listing the program, the
//! persistent output, the renderer settings and the help and welcome texts.
//! Relative paths resolve against the directory holding the properties file.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::render::RenderSettings;

/// Key naming the program text file.
pub const INPUT_KEY: &str = "input";
/// Key naming the persistent output file.
pub const OUTPUT_KEY: &str = "output";
/// Key naming the renderer settings file.
pub const WRITER_KEY: &str = "writer";
/// Key naming the help text file.
pub const HELP_KEY: &str = "help";
/// Key naming the welcome text file.
pub const WELCOME_KEY: &str = "welcome";

/// Fatal startup configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file named by the configuration could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A required key is absent or empty.
    #[error("configuration is missing the `{0}` entry")]
    MissingKey(&'static str),
    /// The renderer settings file is not valid.
    #[error("invalid renderer settings in {}: {source}", .path.display())]
    Settings {
        /// Settings file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The persistent output file could not be created.
    #[error("cannot create output {}: {source}", .path.display())]
    CreateOutput {
        /// Output file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Parsed `key=value` properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Parses properties text.
    ///
    /// Blank lines and lines starting with `#` or `!` are skipped. The key
    /// ends at the first `=`, `:` or whitespace; whitespace may be followed by
    /// one `=` or `:`. A line holding only a key maps it to an empty value.
    /// Surrounding whitespace is trimmed and a later entry for the same key
    /// replaces an earlier one.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(['#', '!']) {
                continue;
            }
            let (key, value) = split_property(line);
            entries.insert(key.to_string(), value.to_string());
        }

        Self { entries }
    }

    /// Value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn require(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingKey(key))
    }
}

fn split_property(line: &str) -> (&str, &str) {
    let Some(split) = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace()) else {
        return (line, "");
    };
    let key = &line[..split];
    let rest = &line[split..];
    let value = match rest.trim_start().strip_prefix(['=', ':']) {
        Some(after) if rest.starts_with(char::is_whitespace) => after,
        _ if rest.starts_with(char::is_whitespace) => rest,
        _ => &rest[1..],
    };
    (key, value.trim())
}

/// Resolved startup paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program text.
    pub input: PathBuf,
    /// Persistent history output.
    pub output: PathBuf,
    /// Renderer settings (JSON).
    pub writer: PathBuf,
    /// Help text.
    pub help: PathBuf,
    /// Welcome text.
    pub welcome: PathBuf,
}

impl Config {
    /// Reads and resolves the properties file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the file cannot be read or lacks a
    /// required key.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_text(path)?;
        let properties = Properties::parse(&text);
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_properties(&properties, base)?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Builds a configuration from parsed properties, resolving relative
    /// paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingKey`] for the first absent key.
    pub fn from_properties(properties: &Properties, base: &Path) -> Result<Self, ConfigError> {
        let resolve = |key| properties.require(key).map(|value| base.join(value));
        Ok(Self {
            input: resolve(INPUT_KEY)?,
            output: resolve(OUTPUT_KEY)?,
            writer: resolve(WRITER_KEY)?,
            help: resolve(HELP_KEY)?,
            welcome: resolve(WELCOME_KEY)?,
        })
    }

    /// Creates (truncating) the persistent output file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CreateOutput`] when the file cannot be created.
    pub fn create_output(&self) -> Result<BufWriter<File>, ConfigError> {
        File::create(&self.output)
            .map(BufWriter::new)
            .map_err(|source| ConfigError::CreateOutput {
                path: self.output.clone(),
                source,
            })
    }
}

/// Text assets and settings loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assets {
    /// Program text.
    pub program: String,
    /// Renderer settings.
    pub settings: RenderSettings,
    /// Help text shown at startup and on `help`.
    pub help: String,
    /// Banner shown at startup.
    pub welcome: String,
}

impl Assets {
    /// Reads every file named by `config` except the output.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a file cannot be read or the settings
    /// are invalid.
    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        let settings_text = read_text(&config.writer)?;
        let settings =
            RenderSettings::from_json(&settings_text).map_err(|source| ConfigError::Settings {
                path: config.writer.clone(),
                source,
            })?;

        Ok(Self {
            program: read_text(&config.input)?,
            settings,
            help: read_text(&config.help)?.trim_end().to_string(),
            welcome: read_text(&config.welcome)?.trim_end().to_string(),
        })
    }
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
