use crate::config::Config;
use crate::launch::{self, LaunchCommand, Launcher};
use crate::selector::{self, Focus};
use crate::wm::{WindowClass, WindowId, WindowManager};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Focused { program: String, window: WindowId },
    Launched(LaunchCommand),
    NothingLaunched,
}

/// Focuses the first program in `programs` that has a window, otherwise launches the first one.
///
/// Programs are tried strictly in order. Query and raise failures are reported and the next
/// program is tried. Launching is fire-and-forget.
pub fn run_or_raise(
    programs: &[String],
    config: &Config,
    wm: &impl WindowManager,
    launcher: &impl Launcher,
    dirs: &[PathBuf],
) -> Outcome {
    let Some(first) = programs.first() else {
        println!("required program names one or more");
        return Outcome::NothingLaunched;
    };

    for program in programs {
        match selector::focus(wm, &WindowClass::new(program.as_str()), config) {
            Ok(Focus::Raised(window)) => {
                log::info!("focused {window} for '{program}'");
                return Outcome::Focused {
                    program: program.clone(),
                    window,
                };
            }
            Ok(Focus::NotRunning) => eprintln!("no window found for '{program}'"),
            Err(e) => eprintln!("'{program}': {e}"),
        }
    }

    println!("Starting the program {first}");
    match launch::launch(first, config, dirs, launcher) {
        Some(command) => {
            if let Some(path) = command.target.descriptor() {
                log::debug!("launched through descriptor {}", path.display());
            }
            Outcome::Launched(command)
        }
        None => {
            log::warn!("could not launch '{first}'");
            Outcome::NothingLaunched
        }
    }
}
