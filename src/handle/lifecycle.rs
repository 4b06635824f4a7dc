/// `handle/lifecycle.rs` — ties a handle's lifetime to its script object
///
/// The guard is created right after allocation and stored inside the
/// script object. When the scripting runtime collects that object the guard
/// is dropped and the handle is released, exactly once. A guard whose
/// bridge is already gone does nothing.
use std::rc::{Rc, Weak};

use super::HandleId;
use crate::bridge::Bridge;

#[derive(Debug)]
pub struct HandleGuard {
    id: HandleId,
    bridge: Weak<Bridge>,
}

impl HandleGuard {
    pub(crate) fn new(id: HandleId, bridge: &Rc<Bridge>) -> Self {
        Self {
            id,
            bridge: Rc::downgrade(bridge),
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn bridge(&self) -> Option<Rc<Bridge>> {
        self.bridge.upgrade()
    }
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        match self.bridge.upgrade() {
            Some(bridge) => bridge.finalize(self.id),
            None => log::debug!("finalize id={} after bridge shutdown", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bridge::Bridge;
    use crate::handle::{CallContext, HandleKind, TypeFlags};
    use crate::touchbar::LogSink;

    #[test]
    fn dropping_guard_releases_once() {
        let bridge = Bridge::new(Box::new(LogSink));
        let guard = bridge.construct(CallContext::Constructor, HandleKind::Label).unwrap();
        let id = guard.id();
        assert!(bridge.is_live(id));

        drop(guard);
        assert!(!bridge.is_live(id));
        assert_eq!(bridge.live_count(), 0);
        assert!(bridge.describe(id, TypeFlags::LABEL).is_none());
    }

    #[test]
    fn guard_outliving_bridge_is_harmless() {
        let bridge = Bridge::new(Box::new(LogSink));
        let guard = bridge.construct(CallContext::Constructor, HandleKind::Slider).unwrap();
        drop(bridge);
        assert!(guard.bridge().is_none());
        drop(guard);
    }
}
