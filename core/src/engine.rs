//! Per-session key dispatch.
//!
//! An [`Engine`] owns one schema, one parser instance and one composition
//! context. Every key goes through the same pipeline:
//!
//! 1. Caps Lock and host hotkeys (Control, Alt, Super, Hyper, Meta) are
//!    rejected; Num Lock is ignored.
//! 2. While a punctuation mark is being cycled, the overlay sees the key
//!    first. Pressing the same key again shows the next form; any other key
//!    commits the current form (Escape and BackSpace discard it instead).
//! 3. The parser gets the key. What it defers falls back to the default
//!    handling below: navigation, paging, digit selection, BackSpace and
//!    commit while composing, literal pass-through while idle.
//!
//! After each change of the composition the engine pushes preedit, status
//! line and candidates to the [`Frontend`].

use crate::context::Context;
use crate::error::ZimeError;
use crate::frontend::Frontend;
use crate::key_event::{KeyEvent, ModifierMask};
use crate::keysym;
use crate::model::{Model, TableModel};
use crate::parser::{Parser, Processed, Punct};
use crate::runtime::Runtime;
use crate::schema::Schema;

/// Punctuation forms being cycled by repeated presses of `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PunctOverlay {
    forms: Vec<String>,
    key: u32,
    rep: usize,
}

impl PunctOverlay {
    fn current(&self) -> &str {
        &self.forms[self.rep]
    }
}

pub struct Engine {
    schema: Schema,
    parser: Box<dyn Parser>,
    ctx: Context,
    punct: Option<PunctOverlay>,
}

impl Engine {
    /// Build an engine for schema `name` with the runtime's parser and a
    /// phrase-table model, then show its (empty) state.
    pub fn new(runtime: &Runtime, name: &str, fe: &mut dyn Frontend) -> Result<Self, ZimeError> {
        let schema = Schema::load(name, runtime.store().clone())?;
        let parser = runtime.parsers().create(&schema)?;
        let model = TableModel::new(runtime.store().clone(), name);
        tracing::info!(schema = name, parser = parser.name(), "engine created");
        Ok(Self::with_parts(schema, parser, Box::new(model), fe))
    }

    /// Assemble an engine from ready-made parts.
    pub fn with_parts(
        schema: Schema,
        parser: Box<dyn Parser>,
        model: Box<dyn Model>,
        fe: &mut dyn Frontend,
    ) -> Self {
        let ctx = Context::new(model, schema.auto_prompt());
        let mut engine = Self {
            schema,
            parser,
            ctx,
            punct: None,
        };
        engine.ctx.take_refresh();
        engine.update_ui(fe);
        engine
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// True while a punctuation mark is waiting to be committed.
    pub fn is_cycling_punct(&self) -> bool {
        self.punct.is_some()
    }

    /// Returns true when the key was consumed and must not reach the
    /// application.
    pub fn process_key_event(&mut self, fe: &mut dyn Frontend, keycode: u32, mask: ModifierMask) -> bool {
        if mask.contains(ModifierMask::LOCK) {
            return false;
        }
        let mask = mask - ModifierMask::NUM_LOCK;
        if mask.intersects(ModifierMask::HOTKEYS) {
            return false;
        }

        let event = KeyEvent::new(keycode, mask);
        if self.punct.is_some() && !keysym::is_shift(keycode) && !event.is_release() {
            if let Some(handled) = self.process_punct_overlay(fe, &event) {
                return handled;
            }
        }

        let processed = self.parser.process(&event, &mut self.ctx);
        self.refresh(fe);
        match processed {
            Processed::Handled => true,
            Processed::Deferred => self.process_default(fe, &event),
        }
    }

    /// `Some(handled)` ends dispatch; `None` lets the key through.
    fn process_punct_overlay(&mut self, fe: &mut dyn Frontend, event: &KeyEvent) -> Option<bool> {
        let overlay = self.punct.as_mut()?;
        if event.keycode() == overlay.key {
            overlay.rep = (overlay.rep + 1) % overlay.forms.len();
            let form = overlay.current();
            fe.update_preedit(form, 0, form.chars().count());
            return Some(true);
        }

        let overlay = self.punct.take()?;
        fe.update_preedit("", 0, 0);
        match event.keycode() {
            keysym::ESCAPE | keysym::BACKSPACE => {
                tracing::debug!(punct = overlay.current(), "punctuation discarded");
                Some(true)
            }
            keycode => {
                fe.commit_string(overlay.current());
                if keycode == keysym::SPACE || keycode == keysym::RETURN {
                    Some(true)
                } else {
                    None
                }
            }
        }
    }

    fn process_default(&mut self, fe: &mut dyn Frontend, event: &KeyEvent) -> bool {
        if self.ctx.is_empty() {
            if self.handle_punct(fe, event, false) {
                return true;
            }
            return self.judge(fe, event);
        }
        if event.is_release() {
            return true;
        }

        match event.keycode() {
            keysym::HOME => self.ctx.set_cursor(0),
            keysym::END | keysym::ESCAPE => self.ctx.set_cursor(-1),
            keysym::LEFT => self.ctx.move_cursor(-1),
            keysym::RIGHT | keysym::TAB => self.ctx.move_cursor(1),
            keysym::PAGE_UP | keysym::UP | keysym::MINUS | keysym::COMMA => {
                if self.ctx.has_candidates() {
                    fe.page_up();
                }
            }
            keysym::PAGE_DOWN | keysym::DOWN | keysym::EQUAL | keysym::PERIOD => {
                if self.ctx.has_candidates() {
                    fe.page_down();
                }
            }
            keycode @ keysym::KEY_1..=keysym::KEY_9 => {
                if self.ctx.has_candidates() {
                    let index = fe.candidate_index((keycode - keysym::KEY_1) as usize);
                    if let Err(e) = self.ctx.select(index) {
                        tracing::warn!(index, error = %e, "candidate selection ignored");
                    }
                }
            }
            keysym::BACKSPACE => {
                if !self.backspace() {
                    return self.judge(fe, event);
                }
            }
            keysym::SPACE | keysym::RETURN => self.commit(fe),
            _ => {
                // swallowed while composing
                self.handle_punct(fe, event, true);
            }
        }
        self.refresh(fe);
        true
    }

    /// Clear the open segment, or drop the last closed one.
    fn backspace(&mut self) -> bool {
        let keywords = self.ctx.keywords_mut();
        let Some(last) = keywords.last_mut() else {
            return false;
        };
        if !last.is_empty() {
            last.clear();
        } else if keywords.len() >= 2 {
            let closed = keywords.len() - 2;
            keywords.remove(closed);
        } else {
            return false;
        }
        self.ctx.update_keywords();
        true
    }

    fn judge(&mut self, fe: &mut dyn Frontend, event: &KeyEvent) -> bool {
        match event.char() {
            Some(ch) if event.is_coined() => {
                let mut buf = [0u8; 4];
                fe.commit_string(ch.encode_utf8(&mut buf));
                true
            }
            _ => false,
        }
    }

    /// Enter punctuation handling for `event`, committing the composition
    /// first when `commit` is set. Returns false if the key is not
    /// punctuation.
    fn handle_punct(&mut self, fe: &mut dyn Frontend, event: &KeyEvent, commit: bool) -> bool {
        let punct = match self.parser.check_punct(event) {
            Some(Punct::Cycle(forms)) => Punct::from_forms(forms),
            other => other,
        };
        let Some(punct) = punct else {
            return false;
        };
        if commit {
            self.commit(fe);
        }
        match punct {
            Punct::Commit(text) => fe.commit_string(&text),
            Punct::Cycle(forms) => {
                let overlay = PunctOverlay {
                    forms,
                    key: event.keycode(),
                    rep: 0,
                };
                let form = overlay.current();
                fe.update_preedit(form, 0, form.chars().count());
                self.punct = Some(overlay);
            }
        }
        true
    }

    fn commit(&mut self, fe: &mut dyn Frontend) {
        let text = self.ctx.preedit();
        tracing::debug!(schema = self.schema.name(), text = %text, "commit");
        fe.commit_string(&text);
        self.ctx.learn();
        self.ctx.clear();
        self.parser.clear();
        self.refresh(fe);
    }

    fn refresh(&mut self, fe: &mut dyn Frontend) {
        if self.ctx.take_refresh() {
            self.update_ui(fe);
        }
    }

    /// Push the current composition to the frontend.
    pub fn update_ui(&self, fe: &mut dyn Frontend) {
        let render = self.ctx.render();
        fe.update_preedit(&render.preedit, render.start, render.end);
        fe.update_aux_string(&render.aux_string);
        fe.update_candidates(render.candidates.as_deref());
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("schema", &self.schema)
            .field("parser", &self.parser.name())
            .field("ctx", &self.ctx)
            .field("punct", &self.punct)
            .finish()
    }
}
