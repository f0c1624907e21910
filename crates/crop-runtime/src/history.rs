//! Undo and redo stacks of planner snapshots.

/// Snapshot stacks. The newest entry is last.
#[derive(Clone, Debug)]
pub struct History<S> {
    undo: Vec<S>,
    redo: Vec<S>,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }
}

impl<S: Clone + PartialEq> History<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `before` when it differs from `after`, dropping any redo entries.
    /// Returns whether an entry was recorded.
    pub fn record(&mut self, before: S, after: &S) -> bool {
        if before == *after {
            return false;
        }
        self.undo.push(before);
        self.redo.clear();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Pop the last undo entry and hand it to `restore`. On success `current`
    /// moves onto the redo stack; on failure the entry is put back.
    pub fn undo<E>(
        &mut self,
        current: S,
        restore: impl FnOnce(&S) -> Result<(), E>,
    ) -> Option<Result<(), E>> {
        step(&mut self.undo, &mut self.redo, current, restore)
    }

    /// Mirror of [`History::undo`].
    pub fn redo<E>(
        &mut self,
        current: S,
        restore: impl FnOnce(&S) -> Result<(), E>,
    ) -> Option<Result<(), E>> {
        step(&mut self.redo, &mut self.undo, current, restore)
    }
}

fn step<S, E>(
    from: &mut Vec<S>,
    to: &mut Vec<S>,
    current: S,
    restore: impl FnOnce(&S) -> Result<(), E>,
) -> Option<Result<(), E>> {
    let target = from.pop()?;
    match restore(&target) {
        Ok(()) => {
            to.push(current);
            Some(Ok(()))
        }
        Err(err) => {
            from.push(target);
            Some(Err(err))
        }
    }
}
