use crate::launch::LaunchStrategy;
use crate::selector::SelectPolicy;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_DESCRIPTOR_LAUNCHER: &str = "kioclient5 exec";
const DEFAULT_IPC_LAUNCHER: &str = "systemd-run --user --collect --quiet";

/// What `config.toml` and `WMRAISE_*` variables may set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub any_desktop: bool,
    pub exec: bool,
    pub ignore_case: bool,
    pub strategies: Vec<LaunchStrategy>,
    pub descriptor_launcher: String,
    pub ipc_launcher: String,
    pub wmctrl: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            any_desktop: false,
            exec: false,
            ignore_case: false,
            strategies: vec![LaunchStrategy::Descriptor],
            descriptor_launcher: DEFAULT_DESCRIPTOR_LAUNCHER.to_string(),
            ipc_launcher: DEFAULT_IPC_LAUNCHER.to_string(),
            wmctrl: "wmctrl".to_string(),
        }
    }
}

/// Command-line switches layered over the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flags {
    pub any_desktop: bool,
    pub exec: bool,
    pub ipc: bool,
    pub ignore_case: bool,
    pub dry_run: bool,
}

/// Settings for one run, built once in `main` and passed down by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub any_desktop: bool,
    pub ignore_case: bool,
    pub dry_run: bool,
    pub strategies: Vec<LaunchStrategy>,
    pub descriptor_launcher: Vec<String>,
    pub ipc_launcher: Vec<String>,
    pub wmctrl: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            any_desktop: false,
            ignore_case: false,
            dry_run: false,
            strategies: vec![LaunchStrategy::Descriptor],
            descriptor_launcher: ["kioclient5", "exec"]
                .into_iter()
                .map(String::from)
                .collect(),
            ipc_launcher: ["systemd-run", "--user", "--collect", "--quiet"]
                .into_iter()
                .map(String::from)
                .collect(),
            wmctrl: "wmctrl".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid {key} '{value}': {source}")]
    Launcher {
        key: &'static str,
        value: String,
        #[source]
        source: shell_words::ParseError,
    },
    #[error("{0} must not be empty")]
    EmptyLauncher(&'static str),
}

impl Config {
    pub fn resolve(file: FileConfig, flags: Flags) -> Result<Self, ConfigError> {
        let mut strategies: Vec<LaunchStrategy> = Vec::new();
        for strategy in file.strategies {
            if !strategies.contains(&strategy) {
                strategies.push(strategy);
            }
        }
        if file.exec || flags.exec {
            strategies.retain(|s| *s != LaunchStrategy::Exec);
            strategies.insert(0, LaunchStrategy::Exec);
        }
        if flags.ipc && !strategies.contains(&LaunchStrategy::Ipc) {
            strategies.push(LaunchStrategy::Ipc);
        }
        if strategies.is_empty() {
            log::warn!("no launch strategies configured, programs will never be started");
        }

        Ok(Self {
            any_desktop: file.any_desktop || flags.any_desktop,
            ignore_case: file.ignore_case || flags.ignore_case,
            dry_run: flags.dry_run,
            strategies,
            descriptor_launcher: split_launcher("descriptor_launcher", &file.descriptor_launcher)?,
            ipc_launcher: split_launcher("ipc_launcher", &file.ipc_launcher)?,
            wmctrl: file.wmctrl,
        })
    }

    pub fn policy(&self) -> SelectPolicy {
        SelectPolicy {
            any_desktop: self.any_desktop,
        }
    }
}

fn split_launcher(key: &'static str, value: &str) -> Result<Vec<String>, ConfigError> {
    let argv = shell_words::split(value).map_err(|source| ConfigError::Launcher {
        key,
        value: value.to_string(),
        source,
    })?;
    if argv.is_empty() {
        return Err(ConfigError::EmptyLauncher(key));
    }
    Ok(argv)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("", "", "wmraise").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// `WMRAISE_*` variables; `WMRAISE_STRATEGIES` takes a comma-separated list.
fn environment() -> config::Environment {
    config::Environment::with_prefix("WMRAISE")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("strategies")
}

pub fn load_file_config() -> Result<FileConfig, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(environment())
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Like [`load_file_config`], but a broken file only costs a warning.
pub fn load_or_default() -> FileConfig {
    match load_file_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("ignoring configuration: {e}");
            FileConfig::default()
        }
    }
}
