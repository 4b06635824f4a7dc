/// `widget/attach.rs` — insertion-ordered, non-owning child list
///
/// Children are stored as handle ids, so releasing a child invalidates its
/// membership instead of leaving a dangling reference. Presentation order on
/// the host follows this sequence; removal shifts the tail left.
use crate::handle::HandleId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    children: Vec<HandleId>,
}

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` unless it is already present. Returns `true` if appended.
    pub fn attach(&mut self, id: HandleId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.children.push(id);
        true
    }

    /// Remove `id` keeping the order of the rest. Returns `true` if removed.
    pub fn detach(&mut self, id: HandleId) -> bool {
        match self.children.iter().position(|c| *c == id) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: HandleId) -> bool {
        self.children.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = HandleId> + '_ {
        self.children.iter().copied()
    }

    /// Drop entries for which `is_live` is false. Returns how many were dropped.
    pub fn compact(&mut self, mut is_live: impl FnMut(HandleId) -> bool) -> usize {
        let before = self.children.len();
        self.children.retain(|id| is_live(*id));
        before - self.children.len()
    }
}
