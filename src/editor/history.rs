use std::collections::VecDeque;

use image::RgbaImage;

pub const HISTORY_CAPACITY_DEFAULT: usize = 12;
pub const HISTORY_CAPACITY_MIN: usize = 2;
pub const HISTORY_CAPACITY_MAX: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

impl HistoryAction {
    pub const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "undo stack empty",
            Self::Redo => "redo stack empty",
        }
    }
}

/// Bounded linear undo over mask buffers.
///
/// The top of the undo stack always mirrors the live mask, so undo pops it onto the redo
/// stack and hands back the entry underneath.
#[derive(Debug, Clone)]
pub struct MaskHistory {
    undo: VecDeque<RgbaImage>,
    redo: Vec<RgbaImage>,
    capacity: usize,
}

impl Default for MaskHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY_DEFAULT)
    }
}

impl MaskHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.clamp(HISTORY_CAPACITY_MIN, HISTORY_CAPACITY_MAX),
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len().saturating_sub(1)
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Forget everything and start over from `initial`.
    pub fn reseed(&mut self, initial: RgbaImage) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push_back(initial);
    }

    /// Record the state after a committed change. Forward history is dropped.
    pub fn snapshot(&mut self, mask: RgbaImage) {
        self.push_bounded(mask);
        self.redo.clear();
        tracing::debug!(depth = self.undo.len(), "history snapshot recorded");
    }

    /// State to apply after stepping back, or `None` when nothing older is retained.
    pub fn undo(&mut self) -> Option<&RgbaImage> {
        if !self.can_undo() {
            return None;
        }
        let current = self.undo.pop_back()?;
        self.redo.push(current);
        self.undo.back()
    }

    /// State to apply after stepping forward, or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<&RgbaImage> {
        let next = self.redo.pop()?;
        self.push_bounded(next);
        self.undo.back()
    }

    fn push_bounded(&mut self, mask: RgbaImage) {
        self.undo.push_back(mask);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }
}
