//! Candidate models.
//!
//! A model looks at the segmented keywords of a [`Composition`] and fills in
//! display fragments and per-position candidate lists. It also applies the
//! user's choices and learns from finished compositions.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::context::Composition;
use crate::store::{ConfigStore, Phrase};

/// One conversion choice offered at a cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Lookup key the candidate was found under (segments joined by a space).
    pub key: String,
    /// Text shown and committed.
    pub text: String,
    /// Number of keyword segments the candidate consumes.
    pub length: usize,
}

impl Candidate {
    pub fn new(key: impl Into<String>, text: impl Into<String>, length: usize) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            length,
        }
    }
}

/// A candidate chosen at segment `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub candidate: Candidate,
}

impl Selection {
    /// One past the last segment covered.
    pub fn end(&self) -> usize {
        self.start + self.candidate.length
    }
}

/// Candidate generation and learning.
///
/// `update` runs after every change of the keyword segmentation with every
/// candidate slot empty. After a parser edit `preedit` arrives reset to the
/// raw keywords; after a `select` that changed the segment count it is left
/// as `select` wrote it. `select` applies a choice the user made at
/// `selection.start` and may merge or split keywords. `learn` is called once
/// per commit.
pub trait Model {
    fn update(&mut self, comp: &mut Composition);

    fn select(&mut self, comp: &mut Composition, selection: &Selection);

    fn learn(&mut self, comp: &Composition);
}

// ============================================================================
// TableModel
// ============================================================================

/// Phrase-table model over a [`ConfigStore`].
///
/// Candidates at a position come from every run of consecutive non-empty
/// segments starting there (longest run first, at most `max_span` segments),
/// each looked up as a single key with the segments joined by spaces.
pub struct TableModel {
    store: Arc<dyn ConfigStore>,
    schema: String,
    max_span: usize,
    cache: LruCache<String, Vec<Phrase>>,
}

impl TableModel {
    pub const DEFAULT_MAX_SPAN: usize = 4;
    const CACHE_CAPACITY: usize = 256;

    pub fn new(store: Arc<dyn ConfigStore>, schema: impl Into<String>) -> Self {
        let capacity = NonZeroUsize::new(Self::CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            schema: schema.into(),
            max_span: Self::DEFAULT_MAX_SPAN,
            cache: LruCache::new(capacity),
        }
    }

    pub fn with_max_span(mut self, max_span: usize) -> Self {
        self.max_span = max_span.max(1);
        self
    }

    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }

    fn lookup(&mut self, key: &str) -> Vec<Phrase> {
        if let Some(hit) = self.cache.get(key) {
            return hit.clone();
        }
        let phrases = match self.store.lookup_phrases(&self.schema, key) {
            Ok(phrases) => phrases,
            Err(e) => {
                tracing::warn!(schema = %self.schema, key, error = %e, "phrase lookup failed");
                Vec::new()
            }
        };
        self.cache.put(key.to_string(), phrases.clone());
        phrases
    }

    fn candidates_at(&mut self, keywords: &[String], pos: usize) -> Vec<Candidate> {
        let mut out = Vec::new();
        let longest = self.max_span.min(keywords.len() - pos);
        for length in (1..=longest).rev() {
            let span = &keywords[pos..pos + length];
            if span.iter().any(|k| k.is_empty()) {
                continue;
            }
            let key = span.join(" ");
            for phrase in self.lookup(&key) {
                out.push(Candidate::new(key.clone(), phrase.text, length));
            }
        }
        out
    }
}

fn span_key(keywords: &[String], sel: &Selection) -> Option<String> {
    keywords.get(sel.start..sel.end()).map(|span| span.join(" "))
}

/// Rewrite `preedit` so chosen spans show their text.
fn apply_selections(comp: &mut Composition) {
    comp.preedit = comp.keywords.clone();
    for sel in &comp.selection {
        let end = sel.end().min(comp.preedit.len());
        if sel.start >= end {
            continue;
        }
        comp.preedit[sel.start] = sel.candidate.text.clone();
        for fragment in &mut comp.preedit[sel.start + 1..end] {
            fragment.clear();
        }
    }
}

impl Model for TableModel {
    fn update(&mut self, comp: &mut Composition) {
        let keywords = comp.keywords.clone();
        comp.selection
            .retain(|sel| span_key(&keywords, sel).as_deref() == Some(sel.candidate.key.as_str()));
        apply_selections(comp);

        comp.candidates = (0..keywords.len())
            .map(|pos| Some(self.candidates_at(&keywords, pos)).filter(|c| !c.is_empty()))
            .collect();
        tracing::trace!(segments = keywords.len(), "table model updated");
    }

    fn select(&mut self, comp: &mut Composition, selection: &Selection) {
        let (start, end) = (selection.start, selection.end());
        comp.selection
            .retain(|sel| sel.end() <= start || sel.start >= end);
        comp.selection.push(selection.clone());
        comp.selection.sort_by_key(|sel| sel.start);
        apply_selections(comp);
    }

    fn learn(&mut self, comp: &Composition) {
        for sel in &comp.selection {
            if let Err(e) = self
                .store
                .learn_phrase(&self.schema, &sel.candidate.key, &sel.candidate.text)
            {
                tracing::warn!(schema = %self.schema, text = %sel.candidate.text, error = %e, "could not record phrase use");
            }
        }
        self.cache.clear();
    }
}
