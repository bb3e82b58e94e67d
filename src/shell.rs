//! Model of the single-page app shell: navigation list, drawer and theme.
//!
//! The React client renders a fixed top bar, a side drawer built from
//! [`nav_items`] and a welcome panel. The drawer has three display states and
//! a single toggle; the server hands the navigation list to the client via
//! `GET /api/navigation`.

use serde::{Deserialize, Serialize};

/// A single entry in the side navigation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    /// Material icon name
    pub icon: String,
    pub route: String,
}

impl NavItem {
    fn new(label: &str, icon: &str, route: &str) -> Self {
        Self {
            label: label.to_string(),
            icon: icon.to_string(),
            route: route.to_string(),
        }
    }
}

/// The hard-coded navigation list rendered in the drawer.
pub fn nav_items() -> Vec<NavItem> {
    vec![
        NavItem::new("Dashboard", "dashboard", "/"),
        NavItem::new("Capacity", "storage", "/capacity"),
        NavItem::new("Settings", "settings", "/settings"),
    ]
}

/// Display state of the side drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawerState {
    #[default]
    Hidden,
    IconOnly,
    Expanded,
}

impl DrawerState {
    /// Rendered width in pixels.
    pub fn width(self) -> u16 {
        match self {
            DrawerState::Hidden => 0,
            DrawerState::IconOnly => 64,
            DrawerState::Expanded => 240,
        }
    }
}

impl std::fmt::Display for DrawerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawerState::Hidden => write!(f, "hidden"),
            DrawerState::IconOnly => write!(f, "icon-only"),
            DrawerState::Expanded => write!(f, "expanded"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Opening,
    Closing,
}

/// The side drawer.
///
/// Toggling walks `Hidden → IconOnly → Expanded` and back the same way, so
/// the icon-only step is visited in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drawer {
    state: DrawerState,
    direction: Direction,
}

impl Default for Drawer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawer {
    pub fn new() -> Self {
        Self {
            state: DrawerState::Hidden,
            direction: Direction::Opening,
        }
    }

    pub fn state(&self) -> DrawerState {
        self.state
    }

    /// Advance one step and return the new state.
    pub fn toggle(&mut self) -> DrawerState {
        let (state, direction) = match (self.state, self.direction) {
            (DrawerState::Hidden, _) => (DrawerState::IconOnly, Direction::Opening),
            (DrawerState::IconOnly, Direction::Opening) => {
                (DrawerState::Expanded, Direction::Closing)
            }
            (DrawerState::IconOnly, Direction::Closing) => {
                (DrawerState::Hidden, Direction::Opening)
            }
            (DrawerState::Expanded, _) => (DrawerState::IconOnly, Direction::Closing),
        };
        self.state = state;
        self.direction = direction;
        state
    }

    pub fn width(&self) -> u16 {
        self.state.width()
    }

    pub fn shows_labels(&self) -> bool {
        self.state == DrawerState::Expanded
    }
}

/// Color scheme of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawer_starts_hidden() {
        let drawer = Drawer::new();
        assert_eq!(drawer.state(), DrawerState::Hidden);
        assert_eq!(drawer.width(), 0);
        assert!(!drawer.shows_labels());
    }

    #[test]
    fn test_drawer_cycle_order() {
        let mut drawer = Drawer::new();
        let seen: Vec<DrawerState> = (0..8).map(|_| drawer.toggle()).collect();
        assert_eq!(
            seen,
            vec![
                DrawerState::IconOnly,
                DrawerState::Expanded,
                DrawerState::IconOnly,
                DrawerState::Hidden,
                DrawerState::IconOnly,
                DrawerState::Expanded,
                DrawerState::IconOnly,
                DrawerState::Hidden,
            ]
        );
    }

    #[test]
    fn test_drawer_only_expanded_shows_labels() {
        let mut drawer = Drawer::new();
        drawer.toggle();
        assert!(!drawer.shows_labels());
        assert_eq!(drawer.width(), 64);
        drawer.toggle();
        assert!(drawer.shows_labels());
        assert_eq!(drawer.width(), 240);
    }

    #[test]
    fn test_drawer_state_display() {
        assert_eq!(DrawerState::IconOnly.to_string(), "icon-only");
        assert_eq!(
            serde_json::to_string(&DrawerState::IconOnly).unwrap(),
            "\"icon_only\""
        );
    }

    #[test]
    fn test_nav_items_routes_are_unique() {
        let items = nav_items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].route, "/");
        let mut routes: Vec<&str> = items.iter().map(|i| i.route.as_str()).collect();
        routes.dedup();
        assert_eq!(routes.len(), items.len());
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }
}
