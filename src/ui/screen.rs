use ratatui::Frame;

use crate::{
    ui::{history::render_history, render_sign_in},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Typing screen - renders the typing UI using the App widget
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Results screen - renders the results UI using the App widget
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Results with the user name prompt on top
pub struct SignInScreen;

impl Screen for SignInScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
        render_sign_in(app, f);
    }
}

/// Recent games of the signed-in user
pub struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_history(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Typing => Box::new(TypingScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::SignIn => Box::new(SignInScreen),
        AppState::History => Box::new(HistoryScreen),
    }
}
