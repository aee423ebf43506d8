/// Screen routing for the desktop shell
use std::cell::RefCell;
use tracing::{info, warn};

use super::Navigator;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Create,
    Profile,
    Result,
}

impl Route {
    pub fn parse(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" | "/create" => Some(Route::Create),
            "/profile" => Some(Route::Profile),
            "/result" => Some(Route::Result),
            _ => None,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Create => "/create",
            Route::Profile => "/profile",
            Route::Result => "/result",
        }
    }
}

/// Navigator that records the last requested route for the shell to apply
#[derive(Debug, Default)]
pub struct RouteRecorder {
    requested: RefCell<Option<Route>>,
}

impl RouteRecorder {
    /// Take the pending request, if any
    pub fn take(&self) -> Option<Route> {
        self.requested.borrow_mut().take()
    }
}

impl Navigator for RouteRecorder {
    fn navigate_to(&self, path: &str) {
        match Route::parse(path) {
            Some(route) => {
                info!(path, "navigation requested");
                *self.requested.borrow_mut() = Some(route);
            }
            None => warn!(path, "navigation to unknown route ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_parse() {
        assert_eq!(Route::parse("/profile"), Some(Route::Profile));
        assert_eq!(Route::parse("/profile/"), Some(Route::Profile));
        assert_eq!(Route::parse("/"), Some(Route::Create));
        assert_eq!(Route::parse("/nowhere"), None);
        for route in [Route::Create, Route::Profile, Route::Result] {
            assert_eq!(Route::parse(route.path()), Some(route));
        }
    }

    #[test]
    fn recorder_hands_out_the_request_once() {
        let recorder = RouteRecorder::default();
        recorder.navigate_to("/profile");
        assert_eq!(recorder.take(), Some(Route::Profile));
        assert_eq!(recorder.take(), None);
    }

    #[test]
    fn unknown_route_is_not_recorded() {
        let recorder = RouteRecorder::default();
        recorder.navigate_to("/settings");
        assert_eq!(recorder.take(), None);
    }
}
