use ratatui::{buffer::Buffer, layout::Rect};

use crate::dashboard::{Dashboard, View};

use super::{dashboard_view, session_view, summary_view};

/// A UI Screen boundary: renders one view of the dashboard
pub trait Screen {
    fn render(&self, dashboard: &Dashboard, area: Rect, buf: &mut Buffer);
}

/// Progress overview and exercise catalog
pub struct DashboardScreen;

impl Screen for DashboardScreen {
    fn render(&self, dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
        dashboard_view::render(dashboard, area, buf);
    }
}

/// The mounted exercise, from instructions to completion
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
        match dashboard.runner() {
            Some(runner) => session_view::render(runner, area, buf),
            None => dashboard_view::render(dashboard, area, buf),
        }
    }
}

/// Results of the last completed exercise
pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, dashboard: &Dashboard, area: Rect, buf: &mut Buffer) {
        match dashboard.summary() {
            Some(summary) => summary_view::render(summary, area, buf),
            None => dashboard_view::render(dashboard, area, buf),
        }
    }
}

/// Helper to construct the appropriate screen for the current view
pub fn current_screen(view: View) -> Box<dyn Screen> {
    match view {
        View::Dashboard => Box::new(DashboardScreen),
        View::Session => Box::new(SessionScreen),
        View::Summary => Box::new(SummaryScreen),
    }
}
