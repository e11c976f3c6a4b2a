use crate::engine::random::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("pool was drawn from before init")]
    Uninitialized,
    #[error("no items available")]
    NothingAvailable,
}

/// Draw-without-replacement pool. Items move from `remaining` to `consumed`
/// one per draw; when `remaining` runs out, `consumed` becomes the new
/// `remaining` and the next cycle begins.
#[derive(Clone, Debug)]
pub struct SessionPool<T> {
    remaining: Vec<T>,
    consumed: Vec<T>,
    ready: bool,
    cycle: usize,
}

impl<T> Default for SessionPool<T> {
    fn default() -> Self {
        Self {
            remaining: Vec::new(),
            consumed: Vec::new(),
            ready: false,
            cycle: 0,
        }
    }
}

impl<T> SessionPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over with `items`. Also used as the reset operation.
    pub fn init(&mut self, items: Vec<T>) {
        self.remaining = items;
        self.consumed.clear();
        self.ready = true;
        self.cycle = 0;
    }

    pub fn draw<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<&T, DrawError> {
        if !self.ready {
            return Err(DrawError::Uninitialized);
        }
        if self.remaining.is_empty() {
            if self.consumed.is_empty() {
                return Err(DrawError::NothingAvailable);
            }
            std::mem::swap(&mut self.remaining, &mut self.consumed);
            self.cycle += 1;
        }

        let idx = rng.index(self.remaining.len());
        let item = self.remaining.swap_remove(idx);
        self.consumed.push(item);
        Ok(&self.consumed[self.consumed.len() - 1])
    }

    /// Move the most recent draw back into `remaining`. Does nothing at the
    /// start of a cycle, where `consumed` is empty.
    pub fn put_back_last(&mut self) -> bool {
        match self.consumed.pop() {
            Some(item) => {
                self.remaining.push(item);
                true
            }
            None => false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn len(&self) -> usize {
        self.remaining.len() + self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining_len(&self) -> usize {
        self.remaining.len()
    }

    pub fn consumed_len(&self) -> usize {
        self.consumed.len()
    }

    /// Number of reshuffles since the last `init`.
    pub fn cycle(&self) -> usize {
        self.cycle
    }
}
