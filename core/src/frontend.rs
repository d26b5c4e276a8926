//! Frontend callbacks.
//!
//! The core never renders anything. After every key event it pushes the
//! preedit span, the status line and the candidate labels through the
//! [`Frontend`] trait, which a host (IBus, a terminal, a test) implements.
//!
//! Two helpers ship with the crate:
//! - [`LookupTable`]: a paged label list a frontend can use to answer
//!   `page_up`/`page_down`/`candidate_index`.
//! - [`RecordingFrontend`]: keeps the last pushed state and accumulates
//!   committed text; used by the console tool and the tests.

use std::ops::Range;

/// Callbacks the engine and schema menu drive.
pub trait Frontend {
    /// Deliver finished text to the application.
    fn commit_string(&mut self, text: &str);

    /// Show `text` as preedit; `[start, end)` (char offsets) is the segment
    /// under the cursor.
    fn update_preedit(&mut self, text: &str, start: usize, end: usize);

    fn update_aux_string(&mut self, text: &str);

    /// Replace the candidate list; `None` hides it.
    fn update_candidates(&mut self, candidates: Option<&[String]>);

    /// Returns false when already on the first page.
    fn page_up(&mut self) -> bool;

    /// Returns false when already on the last page.
    fn page_down(&mut self) -> bool;

    /// Absolute candidate index of the `relative` entry on the current page.
    fn candidate_index(&self, relative: usize) -> usize;
}

// ============================================================================
// LookupTable
// ============================================================================

/// A paginated candidate label list.
#[derive(Debug, Clone)]
pub struct LookupTable {
    labels: Vec<String>,
    page_size: usize,
    current_page: usize,
}

impl LookupTable {
    pub const DEFAULT_PAGE_SIZE: usize = 5;

    pub fn new() -> Self {
        Self::with_page_size(Self::DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            labels: Vec::new(),
            page_size: page_size.max(1),
            current_page: 0,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the labels and go back to the first page.
    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
        self.current_page = 0;
    }

    pub fn clear(&mut self) {
        self.set_labels(Vec::new());
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn num_pages(&self) -> usize {
        self.labels.len().div_ceil(self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Absolute index of the first entry on the current page.
    pub fn page_start(&self) -> usize {
        self.current_page * self.page_size
    }

    fn page_range(&self) -> Range<usize> {
        let start = self.page_start().min(self.labels.len());
        let end = (start + self.page_size).min(self.labels.len());
        start..end
    }

    pub fn current_page_labels(&self) -> &[String] {
        &self.labels[self.page_range()]
    }

    pub fn page_up(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn page_down(&mut self) -> bool {
        if self.current_page + 1 < self.num_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }
}

impl Default for LookupTable {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RecordingFrontend
// ============================================================================

/// A frontend that simply remembers what it was told.
///
/// Fields are public so callers read the state directly after each key.
/// `commit_text` accumulates until taken with [`RecordingFrontend::take_commit`].
#[derive(Debug, Clone, Default)]
pub struct RecordingFrontend {
    pub preedit_text: String,
    pub preedit_start: usize,
    pub preedit_end: usize,
    pub commit_text: String,
    pub aux_text: String,
    /// `None` while the candidate window is hidden.
    pub candidates: Option<Vec<String>>,
    pub table: LookupTable,
}

impl RecordingFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            table: LookupTable::with_page_size(page_size),
            ..Self::default()
        }
    }

    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit_text)
    }

    /// Preedit split into the three highlight runs.
    pub fn highlight(&self) -> [PreeditRun; 3] {
        preedit_highlight(&self.preedit_text, self.preedit_start, self.preedit_end)
    }
}

impl Frontend for RecordingFrontend {
    fn commit_string(&mut self, text: &str) {
        self.commit_text.push_str(text);
    }

    fn update_preedit(&mut self, text: &str, start: usize, end: usize) {
        self.preedit_text = text.to_string();
        self.preedit_start = start;
        self.preedit_end = end;
    }

    fn update_aux_string(&mut self, text: &str) {
        self.aux_text = text.to_string();
    }

    fn update_candidates(&mut self, candidates: Option<&[String]>) {
        match candidates {
            Some(labels) => {
                self.table.set_labels(labels.to_vec());
                self.candidates = Some(labels.to_vec());
            }
            None => {
                self.table.clear();
                self.candidates = None;
            }
        }
    }

    fn page_up(&mut self) -> bool {
        self.table.page_up()
    }

    fn page_down(&mut self) -> bool {
        self.table.page_down()
    }

    fn candidate_index(&self, relative: usize) -> usize {
        self.table.page_start() + relative
    }
}

// ============================================================================
// Preedit highlighting
// ============================================================================

/// How a run of preedit characters is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreeditStyle {
    /// Converted or pending text around the cursor segment.
    Plain,
    /// The segment under the cursor.
    Cursor,
}

/// A styled char range of the preedit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreeditRun {
    pub chars: Range<usize>,
    pub style: PreeditStyle,
}

/// Split `text` into before / at / after the `[start, end)` cursor segment.
/// Offsets are clamped to the text length; empty runs are kept.
pub fn preedit_highlight(text: &str, start: usize, end: usize) -> [PreeditRun; 3] {
    let len = text.chars().count();
    let start = start.min(len);
    let end = end.clamp(start, len);
    [
        PreeditRun { chars: 0..start, style: PreeditStyle::Plain },
        PreeditRun { chars: start..end, style: PreeditStyle::Cursor },
        PreeditRun { chars: end..len, style: PreeditStyle::Plain },
    ]
}
