use crate::sentences::SentenceItem;

/// Lines shown at once: the active line and the one queued after it
pub const DEFAULT_VISIBLE_LINES: usize = 2;

/// Scrolling window over the fetched sentences.
///
/// Line `n` of the session is `sentences[n % len]`, so a small pool is
/// recycled for as long as the session runs. An empty pool yields empty lines.
#[derive(Debug, Clone, Default)]
pub struct LineWindow {
    sentences: Vec<SentenceItem>,
    line_index: usize,
    visible: usize,
}

impl LineWindow {
    pub fn new(sentences: Vec<SentenceItem>) -> Self {
        Self::with_visible(sentences, DEFAULT_VISIBLE_LINES)
    }

    pub fn with_visible(sentences: Vec<SentenceItem>, visible: usize) -> Self {
        Self {
            sentences,
            line_index: 0,
            visible: visible.max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn sentences(&self) -> &[SentenceItem] {
        &self.sentences
    }

    /// Zero-based count of lines advanced past in this session
    pub fn line_index(&self) -> usize {
        self.line_index
    }

    fn line_at(&self, index: usize) -> &str {
        if self.sentences.is_empty() {
            return "";
        }
        &self.sentences[index % self.sentences.len()].text
    }

    /// The line being typed
    pub fn current(&self) -> &str {
        self.line_at(self.line_index)
    }

    /// The line queued after the current one
    pub fn next(&self) -> &str {
        self.line_at(self.line_index + 1)
    }

    /// Current line first, then the queued ones
    pub fn visible_lines(&self) -> Vec<&str> {
        (0..self.visible)
            .map(|offset| self.line_at(self.line_index + offset))
            .collect()
    }

    pub fn advance(&mut self) {
        self.line_index += 1;
    }

    /// Back to the first line, keeping the fetched sentences
    pub fn rewind(&mut self) {
        self.line_index = 0;
    }
}
