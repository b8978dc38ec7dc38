use crate::types::CanvasElement;

/// Snapshot-based undo/redo over the element list. The cursor always points
/// at the snapshot matching the live element list.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<Vec<CanvasElement>>,
    cursor: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            snapshots: vec![Vec::new()],
            cursor: 0,
        }
    }

    /// Records `elements` as the newest state, dropping any redo tail.
    pub fn commit(&mut self, elements: &[CanvasElement]) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(elements.to_vec());
        self.cursor = self.snapshots.len() - 1;
    }

    /// Steps back one snapshot. Returns `None` at the oldest snapshot; the
    /// caller treats that as a full clear.
    pub fn undo(&mut self) -> Option<Vec<CanvasElement>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.snapshots[self.cursor].clone())
    }

    pub fn redo(&mut self) -> Option<Vec<CanvasElement>> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.snapshots[self.cursor].clone())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn current(&self) -> &[CanvasElement] {
        &self.snapshots[self.cursor]
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }
}
