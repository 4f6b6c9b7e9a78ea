use crate::auth::AuthProvider;
use crate::classifier::{classify, CharClass, Edit, EditOutcome, LineStat};
use crate::clock::{ClockSignal, SystemTimeSource, TimeSource, TimerMode};
use crate::metrics::{finalize, whole_seconds};
use crate::publisher::{GameStore, PublishOutcome, Publication, ResultSummary};
use crate::sentences::SentenceItem;
use crate::session::{SessionConfig, SessionState, StartTrigger};
use crate::window::LineWindow;
use std::time::Duration;

/// Snapshot of everything needed to draw a running session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// Active line first, then the queued ones
    pub lines: Vec<String>,
    /// Per-character classification of the active line
    pub classes: Vec<CharClass>,
    pub typed: String,
    pub seconds: u32,
    pub timer: TimerMode,
    pub started: bool,
    pub finished: bool,
    /// No sentences were fetched, nothing can be typed
    pub empty: bool,
}

/// One typing session: owns its state, the visible lines, and the result
pub struct TypingGame {
    config: SessionConfig,
    window: LineWindow,
    state: SessionState,
    time: Box<dyn TimeSource>,
    publication: Option<Publication>,
}

impl std::fmt::Debug for TypingGame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingGame")
            .field("config", &self.config)
            .field("window", &self.window)
            .field("state", &self.state)
            .field("publication", &self.publication)
            .finish_non_exhaustive()
    }
}

impl TypingGame {
    pub fn new(config: SessionConfig, sentences: Vec<SentenceItem>) -> Self {
        Self::with_time_source(config, sentences, SystemTimeSource)
    }

    pub fn with_time_source<T: TimeSource + 'static>(
        config: SessionConfig,
        sentences: Vec<SentenceItem>,
        time: T,
    ) -> Self {
        if sentences.is_empty() {
            log::warn!("no {} sentences available, typing disabled", config.difficulty);
        }
        Self {
            window: LineWindow::with_visible(sentences, config.visible_lines),
            state: SessionState::new(config.timer),
            config,
            time: Box::new(time),
            publication: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn window(&self) -> &LineWindow {
        &self.window
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_line(&self) -> &str {
        self.window.current()
    }

    pub fn typed(&self) -> String {
        self.state.tracker.typed()
    }

    pub fn completed_lines(&self) -> &[LineStat] {
        &self.state.completed_lines
    }

    pub fn has_started(&self) -> bool {
        self.state.started
    }

    pub fn has_finished(&self) -> bool {
        self.state.finished
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled
    }

    /// Start the clock. Returns false when already started, finished, or there is nothing to type.
    pub fn start(&mut self) -> bool {
        if self.state.started || self.state.finished || self.window.is_empty() {
            return false;
        }
        self.state.started = true;
        self.state.started_at = Some(self.time.now());
        log::debug!(
            "session started: {} / {}",
            self.config.difficulty,
            self.config.timer
        );
        true
    }

    fn elapsed(&self) -> Duration {
        self.state
            .started_at
            .map(|start| self.time.now().saturating_duration_since(start))
            .unwrap_or_default()
    }

    /// Type one character into the active line
    pub fn write(&mut self, c: char) -> EditOutcome {
        if !self.state.started
            && !self.state.finished
            && self.config.start_trigger == StartTrigger::FirstKeystroke
            && !c.is_control()
        {
            self.start();
        }
        self.apply(Edit::Append(c))
    }

    pub fn backspace(&mut self) -> EditOutcome {
        self.apply(Edit::Backspace)
    }

    fn apply(&mut self, edit: Edit) -> EditOutcome {
        if !self.state.is_active() {
            return EditOutcome::Rejected;
        }

        let outcome = self.state.tracker.apply(edit, self.window.current());
        if outcome == EditOutcome::LineComplete {
            let elapsed = whole_seconds(self.elapsed());
            let stat = self.state.tracker.commit(self.window.current(), elapsed);
            log::debug!(
                "line {} done at {}s: {}/{} correct",
                self.window.line_index(),
                stat.elapsed_at_completion,
                stat.correct,
                stat.total_chars
            );
            self.state.completed_lines.push(stat);
            self.window.advance();
        }
        outcome
    }

    /// Advance the session clock by one second; ends a fixed-duration session at zero.
    ///
    /// Ticks arriving while idle or after the session ended change nothing.
    pub fn on_second(&mut self) -> ClockSignal {
        if !self.state.is_active() {
            return ClockSignal::Stopped;
        }

        let signal = self.state.clock.tick();
        if signal == ClockSignal::Expired {
            self.finish();
        }
        signal
    }

    /// End the session and compute its result.
    ///
    /// Returns the result the first time only; later calls return `None`
    /// and leave the stored result untouched.
    pub fn finish(&mut self) -> Option<&ResultSummary> {
        if !self.state.started || self.state.finished {
            return None;
        }
        self.state.finished = true;

        let metrics = finalize(
            &self.state.completed_lines,
            self.window.current(),
            &self.state.tracker.typed(),
            self.elapsed(),
            self.config.sample_interval_secs,
        );
        log::info!(
            "session finished: {} wpm, {}% acc, {}s, {} lines",
            metrics.wpm,
            metrics.accuracy,
            metrics.elapsed_seconds,
            self.state.completed_lines.len()
        );

        let summary = ResultSummary::package(metrics, self.config.difficulty, self.config.timer);
        self.publication = Some(Publication::new(summary));
        self.result()
    }

    /// The finished session's result, if any
    pub fn result(&self) -> Option<&ResultSummary> {
        self.publication.as_ref().map(Publication::summary)
    }

    pub fn publication(&self) -> Option<&Publication> {
        self.publication.as_ref()
    }

    /// Persist the result; `None` when there is no result to persist
    pub fn publish<A, S>(&mut self, auth: &A, store: &mut S) -> Option<PublishOutcome>
    where
        A: AuthProvider + ?Sized,
        S: GameStore + ?Sized,
    {
        self.publication
            .as_mut()
            .map(|publication| publication.publish(auth, store))
    }

    /// Abandon the session: stop the clock and drop typed input without producing a result
    pub fn cancel(&mut self) {
        if self.state.finished {
            return;
        }
        log::debug!("session cancelled");
        self.state.finished = true;
        self.state.cancelled = true;
        self.state.tracker.clear();
    }

    /// Fresh session over the same sentences
    pub fn reset(&mut self) {
        self.window.rewind();
        self.state = SessionState::new(self.config.timer);
        self.publication = None;
    }

    /// Tear down and start over with new settings and newly fetched sentences
    pub fn reconfigure(&mut self, config: SessionConfig, sentences: Vec<SentenceItem>) {
        if sentences.is_empty() {
            log::warn!("no {} sentences available, typing disabled", config.difficulty);
        }
        self.window = LineWindow::with_visible(sentences, config.visible_lines);
        self.state = SessionState::new(config.timer);
        self.config = config;
        self.publication = None;
    }

    pub fn view(&self) -> SessionView {
        let typed = self.state.tracker.typed();
        SessionView {
            lines: self
                .window
                .visible_lines()
                .into_iter()
                .map(str::to_string)
                .collect(),
            classes: classify(self.window.current(), &typed),
            typed,
            seconds: self.state.clock.display_seconds(),
            timer: self.config.timer,
            started: self.state.started,
            finished: self.state.finished,
            empty: self.window.is_empty(),
        }
    }
}
