use crate::wm::{DesktopIndex, WindowClass, WindowId};
use derive_more::Deref;
use std::collections::BTreeMap;

/// One line of the window listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub id: WindowId,
    pub desktop: DesktopIndex,
    pub class: WindowClass,
}

impl WindowRecord {
    /// Reads `<id> <desktop> <class> ...`; anything after the class column is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let id = fields.next().filter(|f| is_window_id(f))?;
        let desktop = fields.next().and_then(DesktopIndex::parse)?;
        let class = fields.next()?;

        Some(Self {
            id: WindowId::new(id),
            desktop,
            class: WindowClass::new(class),
        })
    }
}

fn is_window_id(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

pub(crate) fn contains(haystack: &str, needle: &str, ignore_case: bool) -> bool {
    if ignore_case {
        haystack
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    } else {
        haystack.contains(needle)
    }
}

/// Matching windows keyed by the desktop they sit on, at most one per desktop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct MatchSet(BTreeMap<DesktopIndex, WindowId>);

impl MatchSet {
    /// Keeps every window whose class contains `class` anywhere. When two windows share a
    /// desktop the later line replaces the earlier one.
    pub fn from_listing(listing: &str, class: &WindowClass, ignore_case: bool) -> Self {
        let mut matches = BTreeMap::new();
        for record in listing.lines().filter_map(WindowRecord::parse) {
            if contains(&record.class, class, ignore_case) {
                matches.insert(record.desktop, record.id);
            }
        }
        Self(matches)
    }

    pub fn on_desktop(&self, desktop: DesktopIndex) -> Option<&WindowId> {
        self.0.get(&desktop)
    }

    pub fn sticky(&self) -> Option<&WindowId> {
        self.on_desktop(DesktopIndex::STICKY)
    }
}
