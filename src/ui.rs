pub mod charting;
pub mod history;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Widget, Wrap},
    Frame,
};
use typeline::{
    classifier::CharClass, game::SessionView, publisher::ResultSummary, session::StartTrigger,
};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold_style() -> Style {
    bold_style().add_modifier(Modifier::DIM)
}

/// Spans for the active line: typed positions colored by outcome, the cursor underlined
pub fn line_spans(target: &str, view: &SessionView) -> Vec<Span<'static>> {
    let green_bold_style = bold_style().fg(Color::Green);
    let red_bold_style = bold_style().fg(Color::Red);
    let underlined_dim_bold_style = dim_bold_style().add_modifier(Modifier::UNDERLINED);

    let target: Vec<char> = target.chars().collect();
    let typed: Vec<char> = view.typed.chars().collect();
    let cursor = typed.len();

    view.classes
        .iter()
        .enumerate()
        .map(|(idx, class)| match class {
            CharClass::Correct => Span::styled(target[idx].to_string(), green_bold_style),
            CharClass::Incorrect | CharClass::Extra => Span::styled(
                match typed[idx] {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            CharClass::Pending if idx == cursor => {
                Span::styled(target[idx].to_string(), underlined_dim_bold_style)
            }
            CharClass::Pending => {
                Span::styled(target[idx].to_string(), dim_bold_style())
            }
        })
        .collect()
}

impl App {
    fn render_typing(&self, area: Rect, buf: &mut Buffer) {
        let view = self.game.view();
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1), // settings
                Constraint::Min(0),
                Constraint::Length(2), // timer
                Constraint::Length(1), // active line
                Constraint::Length(1), // queued line
                Constraint::Min(0),
                Constraint::Length(1), // notice
                Constraint::Length(1), // legend
            ])
            .split(area);

        let user = self
            .auth_user()
            .map_or_else(|| "guest".to_string(), |u| u.to_string());
        Paragraph::new(Span::styled(
            format!(
                "{}  ·  {}  ·  {}",
                self.game.config().difficulty,
                view.timer,
                user
            ),
            Style::default().fg(Color::Cyan),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        if view.empty {
            Paragraph::new(Span::styled(
                format!(
                    "No {} sentences available. Add some with --add-sentence.",
                    self.game.config().difficulty
                ),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);
        } else {
            let timer_text = if view.started {
                view.seconds.to_string()
            } else {
                match self.game.config().start_trigger {
                    StartTrigger::Explicit => "press enter to start".to_string(),
                    StartTrigger::FirstKeystroke => "start typing".to_string(),
                }
            };
            Paragraph::new(Span::styled(timer_text, dim_bold_style()))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);

            let active = view.lines.first().map(String::as_str).unwrap_or_default();
            // wider than the screen: left-align
            let alignment = if active.width() <= chunks[3].width as usize {
                Alignment::Center
            } else {
                Alignment::Left
            };
            Paragraph::new(Line::from(line_spans(active, &view)))
                .alignment(alignment)
                .render(chunks[3], buf);

            if let Some(queued) = view.lines.get(1) {
                Paragraph::new(Span::styled(
                    queued.clone(),
                    Style::default().fg(Color::DarkGray),
                ))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
            }
        }

        if let Some(notice) = &self.notice {
            Paragraph::new(Span::styled(notice.clone(), Style::default().fg(Color::Yellow)))
                .alignment(Alignment::Center)
                .render(chunks[6], buf);
        }

        let legend = match (view.started, self.game.config().start_trigger) {
            (true, _) => "(enter) finish / (esc)ape",
            (false, StartTrigger::Explicit) => {
                "(enter) start / (tab) difficulty / (shift+tab) timer / (esc)ape"
            }
            (false, StartTrigger::FirstKeystroke) => {
                "(type) start / (tab) difficulty / (shift+tab) timer / (esc)ape"
            }
        };
        Paragraph::new(Span::styled(legend, italic_style)).render(chunks[7], buf);
    }

    fn render_results(&self, result: &ResultSummary, area: Rect, buf: &mut Buffer) {
        let bold_style = bold_style();
        let magenta_style = Style::default().fg(Color::Magenta);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),    // chart
                Constraint::Length(1), // stats
                Constraint::Length(1), // characters
                Constraint::Length(1), // publish status
                Constraint::Length(1), // padding
                Constraint::Length(1), // legend
            ])
            .split(area);

        let (overall_duration, highest_wpm) = charting::compute_chart_params(
            &result.history,
            self.game.config().timer.seconds(),
        );

        let tuples: Vec<(f64, f64)> = result
            .history
            .iter()
            .map(|p| <(f64, f64)>::from(*p))
            .collect();
        let marks: Vec<(f64, f64)> = result
            .history
            .iter()
            .filter(|p| p.is_mark)
            .map(|p| <(f64, f64)>::from(*p))
            .collect();
        let datasets = vec![
            Dataset::default()
                .marker(Marker::Braille)
                .style(magenta_style)
                .graph_type(GraphType::Line)
                .data(&tuples),
            Dataset::default()
                .marker(Marker::Dot)
                .style(magenta_style.add_modifier(Modifier::BOLD))
                .graph_type(GraphType::Scatter)
                .data(&marks),
        ];

        let chart = Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title("seconds")
                    .bounds([0.0, overall_duration])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(charting::format_label(overall_duration), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .title("wpm")
                    .bounds([0.0, highest_wpm])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(charting::format_label(highest_wpm), bold_style),
                    ]),
            );
        chart.render(chunks[0], buf);

        Paragraph::new(Span::styled(
            format!(
                "{} wpm   {}% acc   {}% consistency   {}s",
                result.wpm, result.accuracy, result.consistency, result.elapsed_seconds
            ),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        let stats = result.character_stats;
        Paragraph::new(Line::from(vec![
            Span::styled(stats.correct.to_string(), Style::default().fg(Color::Green)),
            Span::raw(" / "),
            Span::styled(stats.incorrect.to_string(), Style::default().fg(Color::Red)),
            Span::raw(" / "),
            Span::styled(stats.extra.to_string(), Style::default().fg(Color::Yellow)),
            Span::raw(" / "),
            Span::styled(stats.missed.to_string(), Style::default().fg(Color::DarkGray)),
            Span::styled("  correct / incorrect / extra / missed", italic_style),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        if let Some(notice) = &self.notice {
            Paragraph::new(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
        }

        Paragraph::new(Span::styled(
            "(r)etry / (n)ew / (s)ign in / (p)ublish / (h)istory / (esc)ape",
            italic_style,
        ))
        .render(chunks[5], buf);
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match (self.state, self.game.result()) {
            (AppState::Results | AppState::SignIn, Some(result)) => {
                self.render_results(result, area, buf)
            }
            _ => self.render_typing(area, buf),
        }
    }
}

/// Centered user name prompt drawn over the results
pub fn render_sign_in(app: &App, f: &mut Frame) {
    let [row] = Layout::vertical([Constraint::Length(5)])
        .flex(Flex::Center)
        .areas(f.area());
    let [popup] = Layout::horizontal([Constraint::Length(44)])
        .flex(Flex::Center)
        .areas(row);

    let prompt = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{}_", app.sign_in_input),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "(enter) sign in and save / (esc) cancel",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title("User name"))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup);
    f.render_widget(prompt, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use typeline::{config::Config, storage::GameDb};

    fn create_test_app() -> App {
        let mut db = GameDb::open_in_memory().unwrap();
        db.insert_sentence("hello world", Default::default()).unwrap();
        App::new(Config::default(), db)
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_ui_widget_idle() {
        let app = create_test_app();
        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("hello world"));
        assert!(rendered.contains("press enter to start"));
    }

    #[test]
    fn test_ui_widget_idle_keystroke_start() {
        let mut db = GameDb::open_in_memory().unwrap();
        db.insert_sentence("hello world", Default::default()).unwrap();
        let config = Config {
            start_trigger: StartTrigger::FirstKeystroke,
            ..Default::default()
        };
        let app = App::new(config, db);

        let rendered = render(&app, 100, 24);
        assert!(rendered.contains("start typing"));
        assert!(rendered.contains("(type) start"));
        assert!(!rendered.contains("(enter) start"));
    }

    #[test]
    fn test_ui_widget_in_progress() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Enter);
        for c in "hex".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("(enter) finish"));
        assert!(rendered.contains("30"));
    }

    #[test]
    fn test_ui_widget_finished() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Enter);
        for c in "hello world".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Results);

        let rendered = render(&app, 100, 30);
        assert!(rendered.contains("wpm"));
        assert!(rendered.contains("consistency"));
        assert!(rendered.contains("correct / incorrect / extra / missed"));
    }

    #[test]
    fn test_ui_widget_empty_pool() {
        let app = App::new(Config::default(), GameDb::open_in_memory().unwrap());
        let rendered = render(&app, 100, 24);
        assert!(rendered.contains("No easy sentences available"));
    }

    #[test]
    fn test_ui_widget_small_area() {
        let app = create_test_app();
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn test_line_spans_mark_errors_and_cursor() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char(' '));

        let view = app.game.view();
        let spans = line_spans("hello world", &view);
        assert_eq!(spans.len(), 11);
        assert_eq!(spans[0].content, "h");
        assert_eq!(spans[0].style.fg, Some(Color::Green));
        assert_eq!(spans[1].content, "·");
        assert_eq!(spans[1].style.fg, Some(Color::Red));
        assert!(spans[2].style.add_modifier.contains(Modifier::UNDERLINED));
        assert!(!spans[3].style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_sign_in_prompt_renders() {
        let mut app = create_test_app();
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('s'));
        for c in "ada".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| crate::ui(&app, f)).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("User name"));
        assert!(content.contains("ada_"));
    }
}
