use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};
use typeline::{
    history::{GameHistory, RECENT_GAMES},
    storage::StoredGame,
};

use crate::{ui::charting::format_label, App};

/// Pure presenter for one row of the games table
pub fn present_row(number: usize, game: &StoredGame) -> Row<'static> {
    let accuracy_color = if game.record.accuracy >= 95 {
        Color::Green
    } else if game.record.accuracy >= 85 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(number.to_string()),
        Cell::from(game.record.wpm.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{}%", game.record.accuracy))
            .style(Style::default().fg(accuracy_color)),
        Cell::from(game.record.score.to_string()),
        Cell::from(game.record.difficulty.to_string()),
        Cell::from(game.timestamp.format("%Y-%m-%d %H:%M").to_string()),
    ])
}

/// One-line averages under the table
pub fn summary_line(history: &GameHistory) -> String {
    match (
        history.average_wpm,
        history.average_accuracy,
        history.best_wpm,
    ) {
        (Some(wpm), Some(acc), Some(best)) => format!(
            "avg {wpm:.0} wpm   avg {acc:.0}% acc   best {best} wpm   over {} games",
            history.games.len()
        ),
        _ => "no games yet".to_string(),
    }
}

/// Render the game history screen
pub fn render_history(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Table and chart
            Constraint::Length(1), // Averages
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let who = app
        .auth_user()
        .map_or_else(|| "not signed in".to_string(), |u| u.to_string());
    let title = Paragraph::new(format!("Last {RECENT_GAMES} games ({who})"))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let history = &app.history;
    if history.is_empty() {
        let no_data = Paragraph::new(if app.auth_user().is_some() {
            "No games saved yet. Finish a session to record one."
        } else {
            "Sign in from the results screen with (s) to keep a history."
        })
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
        f.render_widget(no_data, chunks[1]);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        // Newest at the top of the table
        let rows: Vec<Row> = history
            .games
            .iter()
            .enumerate()
            .rev()
            .map(|(i, game)| present_row(i + 1, game))
            .collect();

        let header = Row::new(vec!["#", "WPM", "Acc", "Score", "Level", "When"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let widths = [
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Min(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Games"))
            .column_spacing(1);
        f.render_widget(table, body[0]);

        let wpm = history.wpm_points();
        let accuracy = history.accuracy_points();
        let top = history
            .best_wpm
            .map_or(100.0, |best| (best as f64).max(100.0));
        let last_game = wpm.len().max(2) as f64;

        let datasets = vec![
            Dataset::default()
                .name("wpm")
                .marker(Marker::Braille)
                .style(Style::default().fg(Color::Magenta))
                .graph_type(GraphType::Line)
                .data(&wpm),
            Dataset::default()
                .name("acc %")
                .marker(Marker::Braille)
                .style(Style::default().fg(Color::Cyan))
                .graph_type(GraphType::Line)
                .data(&accuracy),
        ];

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .x_axis(
                Axis::default()
                    .title("game")
                    .bounds([1.0, last_game])
                    .labels(vec![
                        Span::styled("1", bold_style),
                        Span::styled(format_label(last_game), bold_style),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, top])
                    .labels(vec![
                        Span::styled("0", bold_style),
                        Span::styled(format_label(top), bold_style),
                    ]),
            );
        f.render_widget(chart, body[1]);
    }

    let averages = Paragraph::new(summary_line(history))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::ITALIC));
    f.render_widget(averages, chunks[2]);

    let instructions = Paragraph::new("(b/esc) back  (n) new  (r) retry")
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use typeline::{auth::UserId, publisher::GameRecord, sentences::Difficulty};

    fn game(wpm: u32, accuracy: u32) -> StoredGame {
        StoredGame {
            id: 1,
            user_id: UserId::new("ada"),
            record: GameRecord {
                score: wpm * 5,
                wpm,
                accuracy,
                difficulty: Difficulty::Hard,
            },
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_summary_line() {
        let history = GameHistory::from_newest_first(vec![game(50, 90), game(30, 100)], 15);
        assert_eq!(
            summary_line(&history),
            "avg 40 wpm   avg 95% acc   best 50 wpm   over 2 games"
        );
        assert_eq!(summary_line(&GameHistory::default()), "no games yet");
    }

    #[test]
    fn test_present_row_builds() {
        let _row = present_row(3, &game(42, 80));
    }
}
