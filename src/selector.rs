use crate::config::Config;
use crate::matcher::MatchSet;
use crate::wm::{DesktopIndex, WindowClass, WindowId, WindowManager, WmError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectPolicy {
    /// Allow windows on other desktops when nothing matches on the current one.
    pub any_desktop: bool,
}

/// Picks the window to raise.
///
/// A window on the active desktop always wins. A sticky window comes next, but only when
/// `any_desktop` is set or it is the sole match. With `any_desktop` any remaining match is
/// taken, lowest desktop first.
///
/// Without `any_desktop`, a sticky window that shares the class with windows on other desktops
/// is not raised on purpose, and the caller goes on to launch a new instance.
pub fn select_window(
    matches: &MatchSet,
    active: DesktopIndex,
    policy: SelectPolicy,
) -> Option<&WindowId> {
    if let Some(id) = matches.on_desktop(active) {
        return Some(id);
    }
    if let Some(id) = matches.sticky()
        && (policy.any_desktop || matches.len() == 1)
    {
        return Some(id);
    }
    if policy.any_desktop {
        return matches.values().next();
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Raised(WindowId),
    NotRunning,
}

#[derive(Debug, Error)]
pub enum FocusError {
    #[error("could not query the window manager: {0}")]
    Query(#[source] WmError),
    #[error("failed to raise window {id}: {source}")]
    Raise {
        id: WindowId,
        #[source]
        source: WmError,
    },
}

/// One resolution pass for `class`: list, disambiguate by desktop, raise.
///
/// Reads fresh state from the window manager on every call. An empty listing match returns
/// early without asking for the active desktop.
pub fn focus(
    wm: &impl WindowManager,
    class: &WindowClass,
    config: &Config,
) -> Result<Focus, FocusError> {
    let listing = wm.list_windows().map_err(FocusError::Query)?;
    let matches = MatchSet::from_listing(&listing, class, config.ignore_case);
    if matches.is_empty() {
        log::debug!("no window class contains '{class}'");
        return Ok(Focus::NotRunning);
    }

    let active = wm.active_desktop().map_err(FocusError::Query)?;
    log::debug!("active desktop {active}, candidates {matches:?}");

    let Some(id) = select_window(&matches, active, config.policy()) else {
        log::info!("'{class}' is open only on other desktops");
        return Ok(Focus::NotRunning);
    };

    if config.dry_run {
        println!("would raise window {id}");
    } else {
        wm.activate(id).map_err(|source| FocusError::Raise {
            id: id.clone(),
            source,
        })?;
    }
    Ok(Focus::Raised(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn matches(listing: &str, class: &str) -> MatchSet {
        MatchSet::from_listing(listing, &WindowClass::new(class), false)
    }

    const SPREAD: &str = "\
0x10 -1 kitty.kitty host sticky
0x11  0 kitty.kitty host zero
0x12  3 kitty.kitty host three
";

    #[test]
    fn test_active_desktop_wins() {
        let set = matches(SPREAD, "kitty");
        for any_desktop in [false, true] {
            let policy = SelectPolicy { any_desktop };
            assert_eq!(
                select_window(&set, DesktopIndex::from(3), policy),
                Some(&WindowId::new("0x12"))
            );
            assert_eq!(
                select_window(&set, DesktopIndex::from(0), policy),
                Some(&WindowId::new("0x11"))
            );
        }
    }

    #[test]
    fn test_firefox_on_active_desktop() {
        let set = matches("0x0000001  2  firefox.Firefox  My Site", "firefox");
        assert_eq!(
            select_window(&set, DesktopIndex::from(2), SelectPolicy::default()),
            Some(&WindowId::new("0x0000001"))
        );
    }

    #[test]
    fn test_lone_sticky_window() {
        let set = matches("0x0000002  -1  Slack  Slack", "Slack");
        assert_eq!(
            select_window(&set, DesktopIndex::from(0), SelectPolicy::default()),
            Some(&WindowId::new("0x0000002"))
        );
    }

    #[test]
    fn test_sticky_needs_any_desktop_when_not_alone() {
        let set = matches(SPREAD, "kitty");
        let active = DesktopIndex::from(5);
        assert_eq!(select_window(&set, active, SelectPolicy::default()), None);
        assert_eq!(
            select_window(&set, active, SelectPolicy { any_desktop: true }),
            Some(&WindowId::new("0x10"))
        );
    }

    #[test]
    fn test_any_desktop_takes_other_desktop() {
        let set = matches("0x20 4 mpv.mpv host video", "mpv");
        let active = DesktopIndex::from(1);
        assert_eq!(select_window(&set, active, SelectPolicy::default()), None);
        assert_eq!(
            select_window(&set, active, SelectPolicy { any_desktop: true }),
            Some(&WindowId::new("0x20"))
        );
    }

    #[test]
    fn test_selection_is_repeatable() {
        let listing = "0x31 1 a.App h t\n0x32 2 a.App h t\n0x33 4 a.App h t\n";
        let policy = SelectPolicy { any_desktop: true };
        let active = DesktopIndex::from(7);
        let first = select_window(&matches(listing, "App"), active, policy).cloned();
        let second = select_window(&matches(listing, "App"), active, policy).cloned();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    struct FakeWm {
        listing: &'static str,
        active: Option<u32>,
        raise_fails: bool,
        desktop_queries: Cell<usize>,
        raised: RefCell<Vec<WindowId>>,
    }

    impl FakeWm {
        fn new(listing: &'static str, active: Option<u32>) -> Self {
            Self {
                listing,
                active,
                raise_fails: false,
                desktop_queries: Cell::new(0),
                raised: RefCell::new(Vec::new()),
            }
        }
    }

    impl WindowManager for FakeWm {
        fn list_windows(&self) -> Result<String, WmError> {
            Ok(self.listing.to_string())
        }

        fn active_desktop(&self) -> Result<DesktopIndex, WmError> {
            self.desktop_queries.set(self.desktop_queries.get() + 1);
            self.active
                .map(DesktopIndex::from)
                .ok_or_else(|| WmError::NoActiveDesktop("fake".to_string()))
        }

        fn activate(&self, id: &WindowId) -> Result<(), WmError> {
            if self.raise_fails {
                return Err(WmError::Status {
                    command: format!("wmctrl -i -a {id}"),
                    status: "exit status: 1".to_string(),
                    stderr: String::new(),
                });
            }
            self.raised.borrow_mut().push(id.clone());
            Ok(())
        }
    }

    #[test]
    fn test_focus_raises_selected_window() {
        let wm = FakeWm::new(SPREAD, Some(3));
        let result = focus(&wm, &WindowClass::new("kitty"), &Config::default()).unwrap();
        assert_eq!(result, Focus::Raised(WindowId::new("0x12")));
        assert_eq!(*wm.raised.borrow(), vec![WindowId::new("0x12")]);
    }

    #[test]
    fn test_focus_without_matches_skips_desktop_query() {
        let wm = FakeWm::new(SPREAD, None);
        let result = focus(&wm, &WindowClass::new("spotify"), &Config::default()).unwrap();
        assert_eq!(result, Focus::NotRunning);
        assert_eq!(wm.desktop_queries.get(), 0);
    }

    #[test]
    fn test_focus_desktop_query_failure() {
        let wm = FakeWm::new(SPREAD, None);
        let result = focus(&wm, &WindowClass::new("kitty"), &Config::default());
        assert!(matches!(result, Err(FocusError::Query(_))));
        assert!(wm.raised.borrow().is_empty());
    }

    #[test]
    fn test_focus_raise_failure() {
        let wm = FakeWm {
            raise_fails: true,
            ..FakeWm::new(SPREAD, Some(0))
        };
        let result = focus(&wm, &WindowClass::new("kitty"), &Config::default());
        assert!(matches!(
            result,
            Err(FocusError::Raise { ref id, .. }) if id.as_str() == "0x11"
        ));
    }

    #[test]
    fn test_focus_dry_run() {
        let wm = FakeWm::new(SPREAD, Some(0));
        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        let result = focus(&wm, &WindowClass::new("kitty"), &config).unwrap();
        assert_eq!(result, Focus::Raised(WindowId::new("0x11")));
        assert!(wm.raised.borrow().is_empty());
    }
}
