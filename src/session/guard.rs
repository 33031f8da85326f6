//! Two-state gate between the landing page and the dashboard.

/// Pages the gate protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Login form.
    Landing,
    /// Authenticated dashboard.
    Dashboard,
}

impl Page {
    /// Path the page is served at.
    pub fn path(&self) -> &'static str {
        match self {
            Page::Landing => "/",
            Page::Dashboard => "/dashboard",
        }
    }
}

/// What to do when a page is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the requested page.
    Render,
    /// Send the browser elsewhere.
    Redirect(Page),
}

/// Decide whether `page` may be shown given the session state.
///
/// Logged-in operators skip the landing page; everyone else is bounced off
/// the dashboard.
pub fn guard(page: Page, authenticated: bool) -> GuardDecision {
    match (page, authenticated) {
        (Page::Landing, true) => GuardDecision::Redirect(Page::Dashboard),
        (Page::Dashboard, false) => GuardDecision::Redirect(Page::Landing),
        _ => GuardDecision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_table() {
        assert_eq!(
            guard(Page::Landing, true),
            GuardDecision::Redirect(Page::Dashboard)
        );
        assert_eq!(guard(Page::Landing, false), GuardDecision::Render);
        assert_eq!(guard(Page::Dashboard, true), GuardDecision::Render);
        assert_eq!(
            guard(Page::Dashboard, false),
            GuardDecision::Redirect(Page::Landing)
        );
    }
}
