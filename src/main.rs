use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser};
use wmraise::config::{self, Config, Flags};
use wmraise::desktop;
use wmraise::launch::Detached;
use wmraise::raise;
use wmraise::wm::Wmctrl;

#[derive(Parser, Debug)]
#[command(name = "wmraise", version, about, long_about = None)]
struct Cli {
    /// Program names or window classes, tried in order. The first one is launched if none is open
    #[arg(required = true, value_parser = NonEmptyStringValueParser::new())]
    programs: Vec<String>,

    /// Also raise matching windows on other desktops or sticky windows
    #[arg(short = 'a', long)]
    any_desktop: bool,

    /// Launch by running the program name directly instead of searching for a desktop entry
    #[arg(short = 'e', long)]
    exec: bool,

    /// Fall back to the session launcher service when no desktop entry starts the program
    #[arg(short = 'i', long)]
    ipc: bool,

    /// Match window classes and desktop entry names case-insensitively
    #[arg(short = 'c', long)]
    ignore_case: bool,

    /// Print what would be raised or launched without doing it
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// More logging (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn flags(&self) -> Flags {
        Flags {
            any_desktop: self.any_desktop,
            exec: self.exec,
            ipc: self.ipc,
            ignore_case: self.ignore_case,
            dry_run: self.dry_run,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = Config::resolve(config::load_or_default(), cli.flags())
        .context("invalid wmraise configuration")?;
    log::debug!("{config:?}");

    let wm = Wmctrl::new(config.wmctrl.as_str());
    let outcome = raise::run_or_raise(
        &cli.programs,
        &config,
        &wm,
        &Detached,
        &desktop::search_dirs(),
    );
    log::debug!("{outcome:?}");

    Ok(())
}
