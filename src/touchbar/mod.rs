/// `touchbar/` — the host side of the bridge
///
/// `TouchBar` is the root container that the global `attach`/`detach`
/// functions operate on. `flush` walks it in presentation order and turns
/// dirty handles into `UpdateEvent`s for the host renderer, clearing the
/// dirty bits as it goes.
use std::collections::HashSet;

use serde::Serialize;

use crate::handle::{HandleId, HandleKind, HandleRegistry, NativeHandle, StateFlags};
use crate::widget::{Attachments, Colors, WidgetValue};

/// Receives a notification whenever a handle gains a dirty bit.
///
/// Called synchronously from inside the mutator. Implementations must not
/// call back into the bridge.
pub trait UpdateSink {
    fn notify_changed(&mut self, id: HandleId, handle: &NativeHandle);
}

/// Default sink, only writes a debug line.
#[derive(Debug, Default)]
pub struct LogSink;

impl UpdateSink for LogSink {
    fn notify_changed(&mut self, id: HandleId, handle: &NativeHandle) {
        log::debug!(
            "changed id={id} flags={} state={:?}",
            handle.flags_bits(),
            handle.state()
        );
    }
}

/// One visual update for the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateEvent {
    pub id: u64,
    pub parent: Option<u64>,
    pub position: usize,
    pub kind: HandleKind,
    /// First time the host sees this handle.
    pub created: bool,
    /// Dirty bits consumed by this update.
    pub changes: u32,
    pub value: Option<WidgetValue>,
    pub colors: Option<Colors>,
}

impl UpdateEvent {
    fn capture(
        id: HandleId,
        parent: Option<HandleId>,
        position: usize,
        handle: &NativeHandle,
        created: bool,
    ) -> Self {
        Self {
            id: id.to_bits(),
            parent: parent.map(HandleId::to_bits),
            position,
            kind: handle.kind(),
            created,
            changes: (handle.state() & StateFlags::DIRTY).bits(),
            value: handle.value(),
            colors: handle.widget().map(|w| w.colors),
        }
    }
}

#[derive(Debug, Default)]
pub struct TouchBar {
    items: Attachments,
}

impl TouchBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, id: HandleId) -> bool {
        self.items.attach(id)
    }

    pub fn detach(&mut self, id: HandleId) -> bool {
        self.items.detach(id)
    }

    pub fn items(&self) -> Vec<HandleId> {
        self.items.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forget items whose handles were released.
    pub fn compact(&mut self, registry: &HandleRegistry) -> usize {
        self.items.compact(|id| registry.is_live(id))
    }

    /// Collect updates for every attached handle, depth first, in order.
    pub fn flush(&mut self, registry: &mut HandleRegistry) -> Vec<UpdateEvent> {
        self.compact(registry);

        let mut events = Vec::new();
        let mut visited = HashSet::new();
        for (position, id) in self.items.iter().enumerate() {
            flush_tree(registry, id, None, position, &mut visited, &mut events);
        }
        if !events.is_empty() {
            log::debug!("flush produced {} updates", events.len());
        }
        events
    }
}

fn flush_tree(
    registry: &mut HandleRegistry,
    id: HandleId,
    parent: Option<HandleId>,
    position: usize,
    visited: &mut HashSet<HandleId>,
    events: &mut Vec<UpdateEvent>,
) {
    // Scrubbers may contain each other.
    if !visited.insert(id) {
        return;
    }

    let Some(handle) = registry.get_mut(id) else {
        return;
    };
    let created = !handle.state().contains(StateFlags::CREATED);
    if created || handle.state().is_dirty() {
        events.push(UpdateEvent::capture(id, parent, position, handle, created));
    }
    handle.clear(StateFlags::DIRTY);
    handle.mark(StateFlags::CONFIGURED | StateFlags::CREATED);

    if registry.compact_children(id).is_none() {
        return;
    }
    let children: Vec<HandleId> = registry
        .get(id)
        .and_then(|h| h.scrubber())
        .map(|s| s.children.iter().collect())
        .unwrap_or_default();
    for (child_position, child) in children.into_iter().enumerate() {
        flush_tree(registry, child, Some(id), child_position, visited, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::CallContext;
    use crate::widget::{ColorSlot, Rgb};

    fn alloc(reg: &mut HandleRegistry, kind: HandleKind) -> HandleId {
        reg.allocate(CallContext::Constructor, kind).unwrap()
    }

    #[test]
    fn first_flush_creates_then_only_dirty_handles_update() {
        let mut reg = HandleRegistry::new();
        let mut bar = TouchBar::new();
        let label = alloc(&mut reg, HandleKind::Label);
        let button = alloc(&mut reg, HandleKind::Button);
        bar.attach(label);
        bar.attach(button);

        let events = bar.flush(&mut reg);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.created));
        assert_eq!(events[0].id, label.to_bits());
        assert_eq!(events[1].position, 1);

        assert!(bar.flush(&mut reg).is_empty());

        if let Some(h) = reg.get_mut(button) {
            h.set_color(ColorSlot::Background, Rgb::new(255, 0, 0));
        }
        let events = bar.flush(&mut reg);
        assert_eq!(events.len(), 1);
        assert!(!events[0].created);
        assert_eq!(events[0].changes, StateFlags::COLOR_BG.bits());
        assert_eq!(
            events[0].colors.and_then(|c| c.bg),
            Some(Rgb::new(255, 0, 0))
        );
        let state = reg.get(button).map(|h| h.state()).unwrap_or_default();
        assert!(!state.is_dirty());
        assert!(state.contains(StateFlags::CREATED | StateFlags::CONFIGURED));
    }

    #[test]
    fn flush_walks_scrubber_children_in_order() {
        let mut reg = HandleRegistry::new();
        let mut bar = TouchBar::new();
        let scrubber = alloc(&mut reg, HandleKind::Scrubber);
        let a = alloc(&mut reg, HandleKind::Button);
        let b = alloc(&mut reg, HandleKind::Button);
        if let Some(s) = reg.get_mut(scrubber).and_then(|h| h.scrubber_mut()) {
            s.children.attach(b);
            s.children.attach(a);
        }
        bar.attach(scrubber);

        let events = bar.flush(&mut reg);
        let order: Vec<(u64, Option<u64>, usize)> =
            events.iter().map(|e| (e.id, e.parent, e.position)).collect();
        assert_eq!(
            order,
            vec![
                (scrubber.to_bits(), None, 0),
                (b.to_bits(), Some(scrubber.to_bits()), 0),
                (a.to_bits(), Some(scrubber.to_bits()), 1),
            ]
        );
    }

    #[test]
    fn mutually_nested_scrubbers_terminate() {
        let mut reg = HandleRegistry::new();
        let mut bar = TouchBar::new();
        let outer = alloc(&mut reg, HandleKind::Scrubber);
        let inner = alloc(&mut reg, HandleKind::Scrubber);
        if let Some(s) = reg.get_mut(outer).and_then(|h| h.scrubber_mut()) {
            s.children.attach(inner);
        }
        if let Some(s) = reg.get_mut(inner).and_then(|h| h.scrubber_mut()) {
            s.children.attach(outer);
        }
        bar.attach(outer);

        assert_eq!(bar.flush(&mut reg).len(), 2);
    }

    #[test]
    fn released_items_are_compacted() {
        let mut reg = HandleRegistry::new();
        let mut bar = TouchBar::new();
        let a = alloc(&mut reg, HandleKind::Label);
        let b = alloc(&mut reg, HandleKind::Label);
        bar.attach(a);
        bar.attach(b);
        assert!(reg.release(a).is_ok());

        let events = bar.flush(&mut reg);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].position, 0);
        assert_eq!(bar.items(), vec![b]);
    }
}
