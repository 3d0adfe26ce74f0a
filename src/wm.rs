use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::process::Command;
use thiserror::Error;

/// Opaque window handle as printed by the window manager (`0x03a00007`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct WindowId(String);

crate::impl_string_newtype!(WindowId);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct WindowClass(String);

crate::impl_string_newtype!(WindowClass);

/// Virtual desktop a window lives on. `-1` marks a sticky window shown on every desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub struct DesktopIndex(i64);

impl DesktopIndex {
    pub const STICKY: Self = Self(-1);

    /// Accepts non-negative indices and the sticky sentinel, nothing else.
    pub fn parse(s: &str) -> Option<Self> {
        match s.parse::<i64>().ok()? {
            -1 => Some(Self::STICKY),
            i if i >= 0 => Some(Self(i)),
            _ => None,
        }
    }

    pub fn is_sticky(self) -> bool {
        self == Self::STICKY
    }
}

impl From<u32> for DesktopIndex {
    fn from(index: u32) -> Self {
        Self(index.into())
    }
}

#[derive(Debug, Error)]
pub enum WmError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed with {status}: {stderr}")]
    Status {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("`{0}` did not report an active desktop")]
    NoActiveDesktop(String),
}

/// The process boundary to the window manager.
pub trait WindowManager {
    /// Raw listing, one window per line: id, desktop, class, then free-form fields.
    fn list_windows(&self) -> Result<String, WmError>;

    fn active_desktop(&self) -> Result<DesktopIndex, WmError>;

    fn activate(&self, id: &WindowId) -> Result<(), WmError>;
}

/// Talks to an EWMH window manager through the `wmctrl` utility.
#[derive(Debug, Clone)]
pub struct Wmctrl {
    bin: String,
}

impl Wmctrl {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    fn run(&self, args: &[&str]) -> Result<String, WmError> {
        let command =
            shell_words::join(std::iter::once(self.bin.as_str()).chain(args.iter().copied()));
        log::debug!("running {command}");

        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .map_err(|source| WmError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(WmError::Status {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl WindowManager for Wmctrl {
    fn list_windows(&self) -> Result<String, WmError> {
        self.run(&["-l", "-x"])
    }

    fn active_desktop(&self) -> Result<DesktopIndex, WmError> {
        let listing = self.run(&["-d"])?;
        parse_active_desktop(&listing)
            .ok_or_else(|| WmError::NoActiveDesktop(format!("{} -d", self.bin)))
    }

    fn activate(&self, id: &WindowId) -> Result<(), WmError> {
        self.run(&["-i", "-a", id.as_str()]).map(|_| ())
    }
}

/// Picks the current desktop out of `wmctrl -d` output, where it is flagged with `*`.
pub fn parse_active_desktop(listing: &str) -> Option<DesktopIndex> {
    listing.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let index = fields.next()?;
        (fields.next()? == "*")
            .then(|| DesktopIndex::parse(index))
            .flatten()
            .filter(|d| !d.is_sticky())
    })
}
