// core/tests/context_invariants.rs
//
// Integration tests for the composition buffer.
//
// Tests cover:
// - slot counts and cursor bounds after arbitrary edits
// - cursor wraparound and the auto-prompt suppression rule
// - selection cursor advance (saturating, zero-length)
// - models that merge segments while selecting
// - clear() idempotence

use zime_core::{Candidate, Composition, Context, Model, SelectError, Selection};

/// Offers, at every non-empty segment, candidates consuming 1, 99 and 0
/// segments, and marks selections by upper-casing the fragment.
struct SpanModel;

impl Model for SpanModel {
    fn update(&mut self, comp: &mut Composition) {
        for (pos, key) in comp.keywords.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            comp.candidates[pos] = Some(vec![
                Candidate::new(key.clone(), key.to_uppercase(), 1),
                Candidate::new(key.clone(), format!("{key}+"), 99),
                Candidate::new(key.clone(), format!("{key}0"), 0),
            ]);
        }
    }

    fn select(&mut self, comp: &mut Composition, selection: &Selection) {
        comp.preedit[selection.start] = selection.candidate.text.clone();
    }

    fn learn(&mut self, _comp: &Composition) {}
}

/// Offers a two-segment candidate at every non-empty segment and joins the
/// consumed segments into one keyword on selection.
struct MergingModel;

impl Model for MergingModel {
    fn update(&mut self, comp: &mut Composition) {
        for (pos, key) in comp.keywords.iter().enumerate() {
            if !key.is_empty() {
                comp.candidates[pos] = Some(vec![Candidate::new(key.clone(), key.to_uppercase(), 2)]);
            }
        }
    }

    fn select(&mut self, comp: &mut Composition, selection: &Selection) {
        let end = selection.end().min(comp.keywords.len() - 1);
        if end <= selection.start {
            return;
        }
        let merged: String = comp.keywords.drain(selection.start..end).collect();
        comp.keywords.insert(selection.start, merged);
        comp.preedit = comp.keywords.clone();
        comp.preedit[selection.start] = selection.candidate.text.clone();
    }

    fn learn(&mut self, _comp: &Composition) {}
}

fn context(keywords: &[&str], auto_prompt: bool) -> Context {
    let mut ctx = Context::new(Box::new(SpanModel), auto_prompt);
    *ctx.keywords_mut() = keywords.iter().map(|k| k.to_string()).collect();
    ctx.update_keywords();
    ctx
}

fn assert_invariants(ctx: &Context) {
    let comp = ctx.composition();
    let n = comp.keywords.len();
    assert!(n >= 1);
    assert_eq!(comp.preedit.len(), n);
    assert_eq!(comp.candidates.len(), n);
    assert!(ctx.cursor() < n);
    if ctx.auto_prompt() && n > 1 && comp.keywords[n - 1].is_empty() {
        assert_ne!(ctx.cursor(), n - 1, "cursor rests on suppressed slot");
    }
    assert_eq!(ctx.preedit(), comp.preedit.concat());
}

#[test]
fn set_cursor_minus_one_lands_on_last_segment() {
    let mut ctx = context(&["ni", "hao", ""], false);
    ctx.set_cursor(-1);
    assert_eq!(ctx.cursor(), 2);

    let mut ctx = context(&["ni", "hao", ""], true);
    ctx.set_cursor(-1);
    assert_eq!(ctx.cursor(), 1);

    let mut ctx = context(&["ni", "hao", "ma"], true);
    ctx.set_cursor(-1);
    assert_eq!(ctx.cursor(), 2);
}

#[test]
fn moving_right_never_reaches_suppressed_slot() {
    let mut ctx = context(&["ni", "hao", ""], true);
    assert_eq!(ctx.cursor(), 1);
    ctx.set_cursor(0);

    let mut seen = Vec::new();
    for _ in 0..6 {
        ctx.move_cursor(1);
        seen.push(ctx.cursor());
        assert_invariants(&ctx);
    }
    assert!(seen.iter().all(|&c| c < 2));
    assert_eq!(seen[0], 1);
}

#[test]
fn moving_left_wraps() {
    let mut ctx = context(&["ni", "hao", ""], false);
    ctx.set_cursor(0);
    ctx.move_cursor(-1);
    assert_eq!(ctx.cursor(), 2);
    ctx.move_cursor(-4);
    assert_eq!(ctx.cursor(), 1);
}

#[test]
fn select_saturates_overshooting_length() {
    let mut ctx = context(&["ni", "hao", ""], false);
    ctx.set_cursor(0);
    let selected = ctx.select(1).unwrap();
    assert_eq!(selected.cursor, 2);
    assert_invariants(&ctx);

    let mut ctx = context(&["ni", "hao", ""], true);
    ctx.set_cursor(0);
    let selected = ctx.select(1).unwrap();
    assert_eq!(selected.cursor, 1);
    assert_invariants(&ctx);
}

#[test]
fn zero_length_selection_keeps_cursor() {
    let mut ctx = context(&["ni", "hao", ""], false);
    ctx.set_cursor(1);
    let selected = ctx.select(2).unwrap();
    assert_eq!(selected.cursor, 1);
    assert_eq!(ctx.preedit(), "nihao0");
}

#[test]
fn merging_selection_keeps_cursor_off_suppressed_slot() {
    let mut ctx = Context::new(Box::new(MergingModel), true);
    *ctx.keywords_mut() = ["ni", "hao", "ma", ""].iter().map(|k| k.to_string()).collect();
    ctx.update_keywords();
    ctx.set_cursor(1);

    let selected = ctx.select(0).unwrap();
    assert_eq!(selected.candidate.text, "HAO");
    assert_eq!(ctx.keywords(), ["ni", "haoma", ""]);
    assert_eq!(selected.cursor, 1);
    assert_eq!(ctx.cursor(), 1);
    assert_invariants(&ctx);

    // candidates follow the merged segments
    assert_eq!(ctx.preedit(), "niHAO");
    assert_eq!(ctx.candidates().unwrap()[0].key, "haoma");
    assert!(ctx.composition().candidates[2].is_none());
}

#[test]
fn invalid_selection_leaves_state_untouched() {
    let mut ctx = context(&["ni", ""], false);
    ctx.set_cursor(0);
    let before = ctx.composition().clone();
    assert_eq!(
        ctx.select(7),
        Err(SelectError::InvalidIndex { index: 7, available: 3 })
    );
    assert_eq!(ctx.composition(), &before);
}

#[test]
fn clear_is_idempotent() {
    let mut ctx = context(&["ni", "hao", ""], true);
    ctx.clear();
    let once = ctx.composition().clone();
    ctx.clear();
    assert_eq!(ctx.composition(), &once);
    assert!(ctx.is_empty());
    assert_eq!(ctx.cursor(), 0);
    assert_eq!(ctx.keywords(), [""]);
}

#[test]
fn invariants_hold_across_an_edit_session() {
    for auto_prompt in [false, true] {
        let mut ctx = context(&[], auto_prompt);
        assert_invariants(&ctx);

        for step in 0..40usize {
            match step % 7 {
                0 => ctx.keywords_mut().last_mut().unwrap().push('a'),
                1 => ctx.keywords_mut().push(String::new()),
                2 => {
                    let n = ctx.keywords().len();
                    if n >= 2 {
                        ctx.keywords_mut().remove(n - 2);
                    }
                }
                3 => ctx.move_cursor(step as isize - 20),
                4 => {
                    if ctx.has_candidates() {
                        ctx.select(step % 3).unwrap();
                    }
                }
                5 => ctx.set_cursor(-1),
                _ => {}
            }
            if step % 7 <= 2 {
                ctx.update_keywords();
            }
            assert_invariants(&ctx);
        }
    }
}
