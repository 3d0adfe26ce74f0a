use crate::config::Config;
use crate::desktop;
use serde_with::DeserializeFromStr;
use std::fmt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Ways of starting a program that has no open window, tried in configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DeserializeFromStr, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum LaunchStrategy {
    /// Run the identifier itself as an executable found on `PATH`.
    Exec,
    /// Hand a matching `.desktop` file to the descriptor launcher.
    Descriptor,
    /// Ask the session's launcher service to start the identifier.
    Ipc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    Descriptor(PathBuf),
    Executable(String),
}

impl LaunchTarget {
    pub fn descriptor(&self) -> Option<&Path> {
        match self {
            Self::Descriptor(path) => Some(path),
            Self::Executable(_) => None,
        }
    }
}

/// A fully resolved launch: which strategy produced it and the argv to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub strategy: LaunchStrategy,
    pub target: LaunchTarget,
    pub argv: Vec<String>,
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_words::join(&self.argv))
    }
}

impl LaunchStrategy {
    /// Builds the command for `program`, or `None` when this strategy has nothing to run.
    pub fn plan(&self, program: &str, config: &Config, dirs: &[PathBuf]) -> Option<LaunchCommand> {
        let (target, argv) = match self {
            Self::Exec => (
                LaunchTarget::Executable(program.to_string()),
                vec![program.to_string()],
            ),
            Self::Descriptor => {
                let path = desktop::find_descriptor(program, dirs, config.ignore_case)?;
                let argv = with_arg(&config.descriptor_launcher, path.to_string_lossy());
                (LaunchTarget::Descriptor(path), argv)
            }
            Self::Ipc => (
                LaunchTarget::Executable(program.to_string()),
                with_arg(&config.ipc_launcher, program),
            ),
        };
        Some(LaunchCommand {
            strategy: *self,
            target,
            argv,
        })
    }
}

fn with_arg(launcher: &[String], arg: impl Into<String>) -> Vec<String> {
    launcher.iter().cloned().chain([arg.into()]).collect()
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("refusing to spawn an empty command")]
    EmptyCommand,
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait Launcher {
    fn spawn(&self, command: &LaunchCommand) -> Result<(), LaunchError>;
}

/// Starts commands in their own process group with no stdio and never waits on them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl Launcher for Detached {
    fn spawn(&self, command: &LaunchCommand) -> Result<(), LaunchError> {
        let (program, args) = command
            .argv
            .split_first()
            .ok_or(LaunchError::EmptyCommand)?;

        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                command: command.to_string(),
                source,
            })?;
        Ok(())
    }
}

/// Walks the configured strategies until one produces a command that spawns.
///
/// Nothing here is fatal: a strategy with no target is skipped and a spawn failure is reported
/// before moving on. Returns the command that was started, if any.
pub fn launch(
    program: &str,
    config: &Config,
    dirs: &[PathBuf],
    launcher: &impl Launcher,
) -> Option<LaunchCommand> {
    for strategy in &config.strategies {
        let Some(command) = strategy.plan(program, config, dirs) else {
            log::info!("{strategy}: nothing to launch for '{program}'");
            continue;
        };

        if config.dry_run {
            println!("would run: {command}");
            return Some(command);
        }

        match launcher.spawn(&command) {
            Ok(()) => {
                log::info!("{strategy}: started {command}");
                return Some(command);
            }
            Err(e) => {
                log::error!("{strategy}: {e}");
                eprintln!("{e}");
            }
        }
    }
    None
}
