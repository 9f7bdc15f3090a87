use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    #[default]
    Welcome,
    Dashboard,
    LogActivity,
    History,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Welcome => "welcome",
            Screen::Dashboard => "dashboard",
            Screen::LogActivity => "log-activity",
            Screen::History => "history",
        }
    }
}

/// Identifies the view that issued a request. A result is only applied while
/// its token is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewToken {
    screen: Screen,
    generation: u64,
}

impl ViewToken {
    pub fn screen(&self) -> Screen {
        self.screen
    }
}

/// Current screen plus a generation counter bumped on every navigation.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: Screen,
    generation: u64,
}

impl Navigator {
    pub fn new(start: Screen) -> Self {
        Self {
            current: start,
            generation: 0,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn navigate_to(&mut self, screen: Screen) {
        self.current = screen;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Token for a fetch or insert started by the current view.
    pub fn begin_request(&self) -> ViewToken {
        ViewToken {
            screen: self.current,
            generation: self.generation,
        }
    }

    pub fn accepts(&self, token: &ViewToken) -> bool {
        token.screen == self.current && token.generation == self.generation
    }

    /// Hands `result` back only if the view that requested it is still active.
    pub fn deliver<T>(&self, token: &ViewToken, result: T) -> Option<T> {
        self.accepts(token).then_some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_welcome() {
        assert_eq!(Navigator::default().current(), Screen::Welcome);
        assert_eq!(Navigator::new(Screen::Dashboard).current(), Screen::Dashboard);
    }

    #[test]
    fn result_for_active_view_is_delivered() {
        let mut nav = Navigator::default();
        nav.navigate_to(Screen::Dashboard);
        let token = nav.begin_request();
        assert_eq!(token.screen(), Screen::Dashboard);
        assert_eq!(nav.deliver(&token, 42), Some(42));
    }

    #[test]
    fn result_after_navigating_away_is_discarded() {
        let mut nav = Navigator::default();
        nav.navigate_to(Screen::History);
        let token = nav.begin_request();
        nav.navigate_to(Screen::Dashboard);
        assert!(!nav.accepts(&token));
        assert_eq!(nav.deliver(&token, "stale"), None);
    }

    #[test]
    fn returning_to_same_screen_still_discards_old_request() {
        let mut nav = Navigator::default();
        nav.navigate_to(Screen::History);
        let token = nav.begin_request();
        nav.navigate_to(Screen::Dashboard);
        nav.navigate_to(Screen::History);
        assert!(!nav.accepts(&token));
        assert!(nav.accepts(&nav.begin_request()));
    }

    #[test]
    fn navigators_are_independent() {
        let mut first = Navigator::default();
        let second = Navigator::default();
        first.navigate_to(Screen::LogActivity);
        assert_eq!(first.current(), Screen::LogActivity);
        assert_eq!(second.current(), Screen::Welcome);
    }

    #[test]
    fn screen_names_are_kebab_case() {
        assert_eq!(serde_json::to_string(&Screen::LogActivity).unwrap(), "\"log-activity\"");
        for screen in [Screen::Welcome, Screen::Dashboard, Screen::LogActivity, Screen::History] {
            let json = serde_json::to_string(&screen).unwrap();
            assert_eq!(json, format!("\"{}\"", screen.as_str()));
        }
    }
}
