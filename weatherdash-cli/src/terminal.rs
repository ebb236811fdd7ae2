use weatherdash_core::{Presenter, RefreshState, WeatherView, scheduler::PAUSED_TEXT};

/// Line-oriented presenter for an interactive terminal.
///
/// The countdown is only echoed every 30 seconds and on pause; the full value
/// is available through the `status` command.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    loading: bool,
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn print_weather(view: &WeatherView) {
    let place = if view.country.is_empty() {
        view.city.clone()
    } else if view.city.is_empty() {
        view.country.clone()
    } else {
        format!("{}, {}", view.city, view.country)
    };

    println!();
    println!("  {place}");
    println!("  {}  {}", view.temperature, view.condition);
    println!(
        "  Feels like {}   Min {}   Max {}",
        view.feels_like, view.min_temp, view.max_temp
    );
    println!("  Humidity    {}", view.humidity);
    println!("  Wind        {}", view.wind);
    println!("  Visibility  {}", view.visibility);
    println!("  Pressure    {}", view.pressure);
    if let Some(observed_at) = &view.observed_at {
        println!("  Forecast for {observed_at}");
    }
    println!();
}

pub fn print_favorites(favorites: &[String]) {
    if favorites.is_empty() {
        println!("No favorites yet. Use `fav` to add the displayed city.");
        return;
    }

    let entries: Vec<String> = favorites
        .iter()
        .enumerate()
        .map(|(i, city)| format!("[{}] {city}", i + 1))
        .collect();
    println!("Favorites: {}", entries.join("  "));
}

fn is_countdown_mark(text: &str) -> bool {
    text == PAUSED_TEXT || text.ends_with(":00") || text.ends_with(":30")
}

impl Presenter for TerminalPresenter {
    fn show_loading(&mut self) {
        if !self.loading {
            println!("Loading...");
        }
        self.loading = true;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn render_weather(&mut self, view: &WeatherView) {
        print_weather(view);
    }

    fn show_fetch_error(&mut self) {
        println!("City not found! Please try again.");
    }

    fn render_favorites(&mut self, favorites: &[String]) {
        print_favorites(favorites);
    }

    fn render_countdown(&mut self, text: &str) {
        if is_countdown_mark(text) {
            println!("{text}");
        }
    }

    fn render_status(&mut self, refresh: &RefreshState) {
        println!("{}", refresh.text());
    }

    fn show_favorites_banner(&mut self, message: &str) {
        println!("! {message}");
    }

    fn hide_favorites_banner(&mut self) {}

    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        // The input thread is parked until this command is acknowledged, so
        // the prompt has the terminal to itself.
        tokio::task::block_in_place(|| {
            inquire::Confirm::new(prompt)
                .with_default(false)
                .prompt()
                .unwrap_or(false)
        })
    }
}
