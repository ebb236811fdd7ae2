use crate::{scheduler::RefreshState, view::WeatherView};

/// Display surface driven by the dashboard.
///
/// All calls happen on the dashboard's task, one at a time.
pub trait Presenter {
    /// A fetch is in flight; hide the weather panel and any error banner.
    fn show_loading(&mut self);

    /// Every in-flight fetch has resolved.
    fn hide_loading(&mut self);

    fn render_weather(&mut self, view: &WeatherView);

    /// The generic "not found" state: loading hidden, weather panel hidden.
    fn show_fetch_error(&mut self);

    fn render_favorites(&mut self, favorites: &[String]);

    fn render_countdown(&mut self, text: &str);

    /// Explicit status request; surfaces that throttle countdown output
    /// should show it regardless.
    fn render_status(&mut self, refresh: &RefreshState) {
        self.render_countdown(&refresh.text());
    }

    fn show_favorites_banner(&mut self, message: &str);

    fn hide_favorites_banner(&mut self);

    /// Synchronous user notification.
    fn alert(&mut self, message: &str);

    /// Ask the user to approve a destructive action.
    fn confirm(&mut self, prompt: &str) -> bool;
}
