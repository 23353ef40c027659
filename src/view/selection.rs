use crate::tree::arena::NodeId;

/// Card preview selection. Hover previews freely until a click locks a
/// card in place; the lock survives further hovering and only another
/// click changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Unlocked,
    Locked(NodeId),
}

/// Selection state plus the card currently shown in the preview pane.
#[derive(Debug, Clone, Copy)]
pub struct SelectionState {
    selection: Selection,
    preview: Option<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self { selection: Selection::Unlocked, preview: None }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.selection, Selection::Locked(_))
    }

    /// The card the preview pane should show, if any.
    pub fn preview(&self) -> Option<NodeId> {
        self.preview
    }

    /// Hovering a card updates the preview only while unlocked.
    pub fn hover(&mut self, card: Option<NodeId>) {
        if self.selection == Selection::Unlocked {
            self.preview = card;
        }
    }

    /// Clicking a card toggles the lock: a click on the locked card
    /// releases it, a click on any other card moves the lock there.
    pub fn click(&mut self, card: NodeId) {
        match self.selection {
            Selection::Locked(current) if current == card => {
                self.selection = Selection::Unlocked;
            }
            _ => {
                self.selection = Selection::Locked(card);
                self.preview = Some(card);
            }
        }
    }

    /// Clear everything, e.g. after a refresh invalidates node ids.
    pub fn reset(&mut self) {
        self.selection = Selection::Unlocked;
        self.preview = None;
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}
