use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typeline::clock::{ClockSignal, ManualTimeSource, TimerMode};
use typeline::game::TypingGame;
use typeline::runtime::{FixedTicker, Runner, TestEventSource, TypingEvent, TypingEventSource};
use typeline::sentences::{Difficulty, SentenceItem};
use typeline::session::SessionConfig;
use typeline::time_series::HistoryPoint;

fn sentences(texts: &[&str]) -> Vec<SentenceItem> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| SentenceItem::new(i as i64 + 1, *t, Difficulty::Easy))
        .collect()
}

fn game(texts: &[&str], timer: TimerMode) -> (TypingGame, ManualTimeSource) {
    let time = ManualTimeSource::new();
    let config = SessionConfig {
        timer,
        ..Default::default()
    };
    (
        TypingGame::with_time_source(config, sentences(texts), time.clone()),
        time,
    )
}

fn key(c: char) -> TypingEvent {
    TypingEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

/// Feed events through the runner until the queue runs dry
fn drain(runner: &Runner<TestEventSource, FixedTicker>, game: &mut TypingGame) {
    for _ in 0..1000u32 {
        match runner.step() {
            TypingEvent::Tick => break,
            TypingEvent::Second => {
                game.on_second();
            }
            TypingEvent::Resize => {}
            TypingEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    game.write(c);
                }
            }
        }
    }
}

// Three perfect 20-character lines, one every eight seconds
#[test]
fn headless_three_perfect_lines() {
    let lines = [
        "the quick brown fox.",
        "jumps over the lazy.",
        "dog and runs away ok",
    ];
    let (mut game, time) = game(&lines, TimerMode::Fixed(30));
    let source = TestEventSource::new();
    let tx = source.sender();
    let runner = Runner::new(source, FixedTicker::new(Duration::from_millis(5)));

    assert!(game.start());
    for line in lines {
        for _ in 0..8 {
            time.advance_secs(1);
            tx.send(TypingEvent::Second).unwrap();
        }
        for c in line.chars() {
            tx.send(key(c)).unwrap();
        }
        drain(&runner, &mut game);
    }

    assert_eq!(game.completed_lines().len(), 3);
    let result = game.finish().cloned().unwrap();
    assert_eq!(result.accuracy, 100);
    assert_eq!(result.wpm, 30);
    assert_eq!(result.elapsed_seconds, 24);
    assert_eq!(result.score, 60);
    assert_eq!(result.history.first(), Some(&HistoryPoint::origin()));
    assert_eq!(result.history.last().map(|p| p.time), Some(24));
}

#[test]
fn headless_idle_session_times_out() {
    let (mut game, time) = game(&["nothing typed here"], TimerMode::Fixed(15));
    let source = TestEventSource::new();
    let tx = source.sender();
    let runner = Runner::new(source, FixedTicker::new(Duration::from_millis(5)));

    game.start();
    for _ in 0..15 {
        time.advance_secs(1);
        tx.send(TypingEvent::Second).unwrap();
    }
    // stragglers after expiry
    tx.send(TypingEvent::Second).unwrap();
    tx.send(TypingEvent::Second).unwrap();
    drain(&runner, &mut game);

    assert!(game.has_finished());
    let result = game.result().unwrap();
    assert_eq!(result.wpm, 0);
    assert_eq!(result.accuracy, 0);
    assert_eq!(
        result.history,
        vec![HistoryPoint::new(0, 0.0), HistoryPoint::new(15, 0.0)]
    );
    assert_eq!(game.on_second(), ClockSignal::Stopped);
}

#[test]
fn headless_open_ended_manual_finish() {
    let target = "abcdefghijklmnopqrstuvwxy";
    let (mut game, time) = game(&[target, "second line"], TimerMode::OpenEnded);
    game.start();

    for c in "abcdefghijklmnopqrst".chars() {
        game.write(c);
    }
    time.advance_secs(30);
    for c in "VWXYZ".chars() {
        game.write(c);
    }
    assert_eq!(game.completed_lines().len(), 1);

    let result = game.finish().unwrap();
    assert_eq!(result.accuracy, 80);
    assert_eq!(result.wpm, 8);
    assert_eq!(result.character_stats.incorrect, 5);
    assert_eq!(result.timer, TimerMode::OpenEnded);
}

#[test]
fn headless_small_pool_wraps_around() {
    let pool = ["a1", "b2", "c3", "d4", "e5"];
    let (mut game, _time) = game(&pool, TimerMode::OpenEnded);
    game.start();

    for line in pool {
        for c in line.chars() {
            game.write(c);
        }
    }

    assert_eq!(game.completed_lines().len(), 5);
    assert_eq!(game.window().line_index(), 5);
    assert_eq!(game.current_line(), "a1");
    assert_eq!(game.view().lines, vec!["a1".to_string(), "b2".to_string()]);

    game.write('a');
    game.write('1');
    assert_eq!(game.completed_lines().len(), 6);
}

#[test]
fn headless_open_ended_clock_counts_up() {
    let (mut game, _time) = game(&["count"], TimerMode::OpenEnded);
    let source = TestEventSource::new();
    let tx = source.sender();
    let runner = Runner::new(source, FixedTicker::new(Duration::from_millis(5)));

    game.start();
    for _ in 0..90 {
        tx.send(TypingEvent::Second).unwrap();
    }
    drain(&runner, &mut game);

    assert!(!game.has_finished());
    assert_eq!(game.view().seconds, 90);
}
