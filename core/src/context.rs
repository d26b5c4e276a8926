//! The composition buffer.
//!
//! A [`Context`] holds what the user is currently typing: the keyword
//! segments produced by the parser, the cursor over them, the display
//! fragments and candidate lists filled in by the model, and an optional
//! status line. The buffer always keeps these invariants:
//!
//! - `keywords` is never empty; its last entry is the open segment and may
//!   be the empty string.
//! - `preedit` and `candidates` have exactly one slot per keyword.
//! - `cursor < keywords.len()`, and with auto-prompt on the cursor never
//!   rests on a trailing empty segment (unless it is the only one).
//!
//! The context does not talk to the frontend. Mutating operations raise a
//! refresh flag that the engine drains with [`Context::take_refresh`] and
//! answers by pushing [`Context::render`] to the frontend.

use thiserror::Error;

use crate::model::{Candidate, Model, Selection};

/// State shared between the context and its model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub keywords: Vec<String>,
    pub preedit: Vec<String>,
    pub candidates: Vec<Option<Vec<Candidate>>>,
    pub selection: Vec<Selection>,
    pub aux_string: String,
    cursor: usize,
}

impl Default for Composition {
    fn default() -> Self {
        Self {
            keywords: vec![String::new()],
            preedit: vec![String::new()],
            candidates: vec![None],
            selection: Vec::new(),
            aux_string: String::new(),
            cursor: 0,
        }
    }
}

impl Composition {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Restore slot counts after a model touched the vectors.
    fn normalize(&mut self) {
        if self.keywords.is_empty() {
            self.keywords.push(String::new());
        }
        let n = self.keywords.len();
        self.preedit.resize(n, String::new());
        self.candidates.resize(n, None);
        if self.cursor >= n {
            self.cursor = n - 1;
        }
    }
}

/// Result of a successful [`Context::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    pub candidate: Candidate,
    /// Cursor after the selection was applied.
    pub cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("candidate index {index} out of range ({available} available)")]
    InvalidIndex { index: usize, available: usize },

    #[error("no candidates at the cursor")]
    NoCandidates,
}

/// Snapshot of everything the frontend shows for a composition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Render {
    pub preedit: String,
    /// Char offset where the cursor segment starts.
    pub start: usize,
    /// Char offset one past the cursor segment.
    pub end: usize,
    pub aux_string: String,
    pub candidates: Option<Vec<String>>,
}

/// The composition state machine.
pub struct Context {
    comp: Composition,
    model: Box<dyn Model>,
    auto_prompt: bool,
    dirty: bool,
}

impl Context {
    pub fn new(model: Box<dyn Model>, auto_prompt: bool) -> Self {
        Self {
            comp: Composition::default(),
            model,
            auto_prompt,
            dirty: true,
        }
    }

    pub fn auto_prompt(&self) -> bool {
        self.auto_prompt
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }

    /// Reset to the canonical empty state.
    pub fn clear(&mut self) {
        self.comp = Composition::default();
        self.dirty = true;
    }

    /// True when nothing is typed: a single empty segment.
    pub fn is_empty(&self) -> bool {
        self.comp.keywords.len() == 1 && self.comp.keywords[0].is_empty()
    }

    pub fn keywords(&self) -> &[String] {
        &self.comp.keywords
    }

    /// Direct access for parsers. Call [`Context::update_keywords`] afterwards.
    pub fn keywords_mut(&mut self) -> &mut Vec<String> {
        &mut self.comp.keywords
    }

    pub fn cursor(&self) -> usize {
        self.comp.cursor
    }

    /// Propagate a change of the keyword segmentation: cursor to the end,
    /// fresh preedit and candidates from the model.
    pub fn update_keywords(&mut self) {
        if self.comp.keywords.is_empty() {
            self.comp.keywords.push(String::new());
        }
        let n = self.comp.keywords.len();
        self.comp.cursor = self.suppress(n - 1);
        self.comp.preedit = self.comp.keywords.clone();
        self.comp.candidates = vec![None; n];
        self.model.update(&mut self.comp);
        self.comp.normalize();
        tracing::debug!(keywords = ?self.comp.keywords, cursor = self.comp.cursor, "keywords updated");
        self.dirty = true;
    }

    /// Choose candidate `index` at the cursor.
    ///
    /// The cursor advances by the candidate's length, saturating at the last
    /// segment, and the suppression rule is applied again. A model that
    /// re-segments the keywords while selecting gets an `update` for the new
    /// segments, and the cursor is checked against them.
    pub fn select(&mut self, index: usize) -> Result<Selected, SelectError> {
        let candidate = {
            let list = self.candidates().ok_or(SelectError::NoCandidates)?;
            list.get(index)
                .cloned()
                .ok_or(SelectError::InvalidIndex {
                    index,
                    available: list.len(),
                })?
        };
        let start = self.comp.cursor;
        let last = self.comp.keywords.len() - 1;
        self.comp.cursor = self.suppress(start.saturating_add(candidate.length).min(last));
        let selection = Selection {
            start,
            candidate: candidate.clone(),
        };
        let segments = self.comp.keywords.len();
        self.model.select(&mut self.comp, &selection);
        if self.comp.keywords.len() != segments {
            self.comp.normalize();
            self.comp.candidates = vec![None; self.comp.keywords.len()];
            self.model.update(&mut self.comp);
        }
        self.comp.normalize();
        self.comp.cursor = self.suppress(self.comp.cursor);
        self.dirty = true;
        Ok(Selected {
            candidate,
            cursor: self.comp.cursor,
        })
    }

    /// Move the cursor to `pos`, taken modulo the segment count; `-1` is
    /// the last segment.
    pub fn set_cursor(&mut self, pos: isize) {
        let n = self.comp.keywords.len() as isize;
        let pos = pos.rem_euclid(n) as usize;
        self.comp.cursor = self.suppress(pos);
        self.dirty = true;
    }

    pub fn move_cursor(&mut self, offset: isize) {
        self.set_cursor(self.comp.cursor as isize + offset);
    }

    /// The whole composition as displayed.
    pub fn preedit(&self) -> String {
        self.comp.preedit.concat()
    }

    pub fn set_aux_string(&mut self, aux: impl Into<String>) {
        self.comp.aux_string = aux.into();
        self.dirty = true;
    }

    /// Status line: the explicit override if any, else the raw keyword at
    /// the cursor while it is meaningful to show.
    pub fn aux_string(&self) -> String {
        if !self.comp.aux_string.is_empty() {
            return self.comp.aux_string.clone();
        }
        let cursor = self.comp.cursor;
        if cursor + 1 < self.comp.keywords.len() || self.auto_prompt {
            return self.comp.keywords[cursor].clone();
        }
        String::new()
    }

    /// Candidates at the cursor; `None` when the model computed none there.
    pub fn candidates(&self) -> Option<&[Candidate]> {
        self.comp
            .candidates
            .get(self.comp.cursor)
            .and_then(|slot| slot.as_deref())
    }

    pub fn has_candidates(&self) -> bool {
        self.candidates().is_some_and(|list| !list.is_empty())
    }

    /// Let the model record the finished composition.
    pub fn learn(&mut self) {
        self.model.learn(&self.comp);
    }

    /// Whether a mutation happened since the last call.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn render(&self) -> Render {
        let cursor = self.comp.cursor;
        let start: usize = self.comp.preedit[..cursor]
            .iter()
            .map(|s| s.chars().count())
            .sum();
        let end = start + self.comp.preedit[cursor].chars().count();
        Render {
            preedit: self.preedit(),
            start,
            end,
            aux_string: self.aux_string(),
            candidates: self
                .candidates()
                .map(|list| list.iter().map(|c| c.text.clone()).collect()),
        }
    }

    fn suppress(&self, pos: usize) -> usize {
        let n = self.comp.keywords.len();
        if pos > 0 && pos == n - 1 && self.auto_prompt && self.comp.keywords[pos].is_empty() {
            pos - 1
        } else {
            pos
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("comp", &self.comp)
            .field("auto_prompt", &self.auto_prompt)
            .finish_non_exhaustive()
    }
}
