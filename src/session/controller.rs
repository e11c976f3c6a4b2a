use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::Entry;
use crate::engine::display::{self, DisplayMode};
use crate::engine::filter::{self, Content, Selection};
use crate::engine::pool::{DrawError, SessionPool};
use crate::engine::random::RandomSource;
use crate::session::prompt::Prompt;

/// How many times a draw whose primary text repeats the previous prompt is
/// put back and redrawn before the repeat is accepted.
pub const MAX_REPEAT_REDRAWS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    /// Hint shown with every prompt.
    Learning,
    /// Hint shown on request.
    #[default]
    Memory,
}

impl PracticeMode {
    pub fn label(self) -> &'static str {
        match self {
            PracticeMode::Learning => "Learning",
            PracticeMode::Memory => "Memory",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            PracticeMode::Learning => PracticeMode::Memory,
            PracticeMode::Memory => PracticeMode::Learning,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PracticeError {
    #[error("nothing selected to practice")]
    NothingSelected,
    #[error("no items available")]
    NoItems,
    #[error("no prompt yet")]
    NoPrompt,
    #[error("session not started")]
    NotStarted,
}

/// Session lifecycle for one practice surface.
pub struct PracticeController<R: RandomSource> {
    content: Content,
    selection: Selection,
    eligible: Vec<Entry>,
    pool: SessionPool<Entry>,
    state: SessionState,
    prompt: Option<Prompt>,
    hint_visible: bool,
    display_mode: DisplayMode,
    practice_mode: PracticeMode,
    rng: R,
}

impl<R: RandomSource> PracticeController<R> {
    pub fn new(
        content: Content,
        selection: Selection,
        display_mode: DisplayMode,
        practice_mode: PracticeMode,
        rng: R,
    ) -> Self {
        let eligible = filter::eligible(&content, &selection);
        Self {
            content,
            selection,
            eligible,
            pool: SessionPool::new(),
            state: SessionState::NotStarted,
            prompt: None,
            hint_visible: false,
            display_mode,
            practice_mode,
            rng,
        }
    }

    pub fn start(&mut self) -> Result<&Prompt, PracticeError> {
        if self.eligible.is_empty() {
            return Err(PracticeError::NothingSelected);
        }
        self.pool.init(self.eligible.clone());
        self.state = SessionState::Active;
        self.prompt = None;
        debug!("session started with {} items", self.eligible.len());
        self.advance()
    }

    pub fn advance(&mut self) -> Result<&Prompt, PracticeError> {
        if self.state != SessionState::Active {
            return Err(PracticeError::NotStarted);
        }

        let previous = self.prompt.as_ref().map(|p| p.primary.clone());
        let mut redraws = 0;
        let (entry, resolved, bit) = loop {
            let entry = match self.pool.draw(&mut self.rng) {
                Ok(entry) => entry.clone(),
                Err(DrawError::NothingAvailable) => return Err(PracticeError::NoItems),
                Err(DrawError::Uninitialized) => return Err(PracticeError::NotStarted),
            };
            let bit = self.display_mode.is_randomized() && self.rng.flip();
            let resolved = display::resolve(&entry, self.display_mode, bit);

            let repeats = previous.as_deref() == Some(resolved.primary.as_str());
            let can_differ = self.pool.len() > 1 || self.display_mode.is_randomized();
            if repeats && can_differ && redraws < MAX_REPEAT_REDRAWS {
                self.pool.put_back_last();
                redraws += 1;
                continue;
            }
            break (entry, resolved, bit);
        };

        self.hint_visible = self.practice_mode == PracticeMode::Learning;
        Ok(&*self.prompt.insert(Prompt::new(entry, resolved, bit)))
    }

    pub fn reveal_hint(&mut self) -> Result<(), PracticeError> {
        if self.prompt.is_none() {
            return Err(PracticeError::NoPrompt);
        }
        self.hint_visible = true;
        Ok(())
    }

    /// Flip hint visibility, returning the new state.
    pub fn toggle_hint(&mut self) -> Result<bool, PracticeError> {
        if self.prompt.is_none() {
            return Err(PracticeError::NoPrompt);
        }
        self.hint_visible = !self.hint_visible;
        Ok(self.hint_visible)
    }

    /// Recompute the eligible set and reset the pool. The prompt on screen
    /// stays until the next advance.
    pub fn change_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.refilter();
    }

    /// Swap in freshly loaded catalogs, e.g. after a cache clear.
    pub fn replace_content(&mut self, content: Content) {
        self.content = content;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.eligible = filter::eligible(&self.content, &self.selection);
        self.pool.init(self.eligible.clone());
        debug!("eligible set now {} items", self.eligible.len());
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    pub fn set_practice_mode(&mut self, mode: PracticeMode) {
        self.practice_mode = mode;
        if self.state == SessionState::Active {
            self.hint_visible = mode == PracticeMode::Learning;
        }
    }

    pub fn stop(&mut self) {
        self.state = SessionState::NotStarted;
        self.prompt = None;
        self.hint_visible = false;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_visible && self.prompt.is_some()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn eligible(&self) -> &[Entry] {
        &self.eligible
    }

    pub fn eligible_len(&self) -> usize {
        self.eligible.len()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn practice_mode(&self) -> PracticeMode {
        self.practice_mode
    }

    /// 1-based cycle number through the pool.
    pub fn cycle(&self) -> usize {
        self.pool.cycle() + 1
    }

    /// (drawn this cycle, pool size)
    pub fn progress(&self) -> (usize, usize) {
        (self.pool.consumed_len(), self.pool.len())
    }
}
