/// `bridge.rs` — the shared core behind every script object
///
/// Holds the handle registry, the root touch bar and the update sink.
/// Script bindings call in here with a `HandleId` and a capability mask;
/// an id that does not resolve under the mask turns the call into a no-op.
///
/// Nothing in here calls back into the scripting runtime, so a registry
/// borrow can never be held across a garbage collection. Finalizers that
/// still find the registry borrowed are queued and drained later.
use std::{cell::RefCell, rc::Rc};

use crate::{
    error::Result,
    handle::{CallContext, HandleGuard, HandleId, HandleKind, HandleRegistry, NativeHandle, StateFlags, TypeFlags},
    touchbar::{TouchBar, UpdateEvent, UpdateSink},
    widget::{ColorSlot, Rgb, WidgetValue},
};

pub struct Bridge {
    registry: RefCell<HandleRegistry>,
    touchbar: RefCell<TouchBar>,
    sink: RefCell<Box<dyn UpdateSink>>,
    deferred: RefCell<Vec<HandleId>>,
}

impl Bridge {
    pub fn new(sink: Box<dyn UpdateSink>) -> Rc<Self> {
        Rc::new(Self {
            registry: RefCell::new(HandleRegistry::new()),
            touchbar: RefCell::new(TouchBar::new()),
            sink: RefCell::new(sink),
            deferred: RefCell::new(Vec::new()),
        })
    }

    // ── Registry ──────────────────────────────────────────────────────────

    /// Allocate a handle of `kind` and wrap it in its lifecycle guard.
    pub fn construct(self: &Rc<Self>, call: CallContext, kind: HandleKind) -> Result<HandleGuard> {
        self.drain_deferred();
        let id = self.registry.borrow_mut().allocate(call, kind)?;
        Ok(HandleGuard::new(id, self))
    }

    /// Populate a freshly constructed handle from its constructor argument.
    pub fn populate(&self, id: HandleId, value: WidgetValue) {
        if let Some(handle) = self.registry.borrow_mut().get_mut(id) {
            handle.set_initial(value);
        }
    }

    /// Release `id`. Only the lifecycle guard calls this.
    pub(crate) fn finalize(&self, id: HandleId) {
        let Ok(mut registry) = self.registry.try_borrow_mut() else {
            log::debug!("finalize id={id} deferred, registry busy");
            self.deferred.borrow_mut().push(id);
            return;
        };
        match registry.release(id) {
            Ok(handle) => log::debug!("finalized id={id} flags={}", handle.flags_bits()),
            Err(e) => log::error!("finalize id={id} failed: {e}"),
        }
        drop(registry);

        if let Ok(mut touchbar) = self.touchbar.try_borrow_mut() {
            touchbar.detach(id);
        }
    }

    fn drain_deferred(&self) {
        let pending = std::mem::take(&mut *self.deferred.borrow_mut());
        for id in pending {
            self.finalize(id);
        }
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.registry.borrow().is_live(id)
    }

    pub fn live_count(&self) -> usize {
        self.drain_deferred();
        self.registry.borrow().len()
    }

    /// Whether `id` is live and carries a type bit in `mask`.
    pub fn resolves(&self, id: HandleId, mask: TypeFlags) -> bool {
        self.registry.borrow().resolve(id, mask).is_some()
    }

    /// Read a resolved handle.
    pub fn inspect<R>(&self, id: HandleId, mask: TypeFlags, f: impl FnOnce(&NativeHandle) -> R) -> Option<R> {
        self.registry.borrow().resolve(id, mask).map(f)
    }

    /// Mutate a resolved handle. `f` returns the dirty bit it raised, and the
    /// sink is notified on every raise, even if the bit was already set.
    pub fn update(
        &self,
        id: HandleId,
        mask: TypeFlags,
        f: impl FnOnce(&mut NativeHandle) -> Option<StateFlags>,
    ) -> Option<StateFlags> {
        let mut registry = self.registry.borrow_mut();
        let handle = registry.resolve_mut(id, mask)?;
        let raised = f(&mut *handle)?;
        self.sink.borrow_mut().notify_changed(id, handle);
        Some(raised)
    }

    // ── Widget model ──────────────────────────────────────────────────────

    pub fn set_color(&self, id: HandleId, slot: ColorSlot, rgb: Rgb) -> bool {
        self.update(id, TypeFlags::WIDGETS, |h| h.set_color(slot, rgb))
            .is_some()
    }

    pub fn color(&self, id: HandleId, slot: ColorSlot) -> Option<Rgb> {
        self.inspect(id, TypeFlags::WIDGETS, |h| h.color(slot)).flatten()
    }

    pub fn value(&self, id: HandleId, mask: TypeFlags) -> Option<WidgetValue> {
        self.inspect(id, mask, NativeHandle::value).flatten()
    }

    pub fn describe(&self, id: HandleId, mask: TypeFlags) -> Option<String> {
        self.inspect(id, mask, NativeHandle::describe)
    }

    pub fn set_percent(&self, id: HandleId, percent: i64) -> bool {
        self.update(id, TypeFlags::SLIDER, |h| h.set_percent(percent))
            .is_some()
    }

    pub fn percent(&self, id: HandleId) -> Option<i64> {
        self.inspect(id, TypeFlags::SLIDER, NativeHandle::percent).flatten()
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Run the command behind `id`. `Ok(false)` if `id` is not a command.
    pub fn exec_command(&self, id: HandleId) -> Result<bool> {
        let Some(mut command) = self.inspect(id, TypeFlags::COMMAND, |h| h.command().cloned()).flatten() else {
            return Ok(false);
        };
        command.exec()?;
        self.update(id, TypeFlags::COMMAND, |h| {
            if let Some(c) = h.command_mut() {
                *c = command;
            }
            None
        });
        Ok(true)
    }

    pub fn command_output(&self, id: HandleId) -> Option<String> {
        self.inspect(id, TypeFlags::COMMAND, |h| h.command().and_then(|c| c.output.clone()))
            .flatten()
    }

    // ── Containers ────────────────────────────────────────────────────────

    /// Append `child` to the scrubber `container`.
    pub fn attach(&self, container: HandleId, child: HandleId) -> bool {
        if container == child {
            log::debug!("refusing to attach id={child} to itself");
            return false;
        }
        let mut registry = self.registry.borrow_mut();
        if registry.resolve(child, TypeFlags::ATTACHABLE).is_none() {
            return false;
        }
        registry
            .resolve_mut(container, TypeFlags::SCRUBBER)
            .and_then(|h| h.scrubber_mut())
            .map(|s| s.children.attach(child))
            .unwrap_or(false)
    }

    /// Remove `child` from `container`, keeping the order of the rest.
    pub fn detach(&self, container: HandleId, child: HandleId) -> bool {
        let mut registry = self.registry.borrow_mut();
        if registry.resolve(child, TypeFlags::ATTACHABLE).is_none() {
            return false;
        }
        registry
            .resolve_mut(container, TypeFlags::SCRUBBER)
            .and_then(|h| h.scrubber_mut())
            .map(|s| s.children.detach(child))
            .unwrap_or(false)
    }

    /// Live children of `container`.
    pub fn count(&self, container: HandleId) -> Option<usize> {
        let mut registry = self.registry.borrow_mut();
        registry.resolve(container, TypeFlags::SCRUBBER)?;
        registry.compact_children(container)
    }

    pub fn children(&self, container: HandleId) -> Vec<HandleId> {
        self.count(container);
        self.registry
            .borrow()
            .resolve(container, TypeFlags::SCRUBBER)
            .and_then(|h| h.scrubber())
            .map(|s| s.children.iter().collect())
            .unwrap_or_default()
    }

    // ── Touch bar ─────────────────────────────────────────────────────────

    pub fn attach_root(&self, child: HandleId) -> bool {
        if self.registry.borrow().resolve(child, TypeFlags::ATTACHABLE).is_none() {
            return false;
        }
        self.touchbar.borrow_mut().attach(child)
    }

    pub fn detach_root(&self, child: HandleId) -> bool {
        if self.registry.borrow().resolve(child, TypeFlags::ATTACHABLE).is_none() {
            return false;
        }
        self.touchbar.borrow_mut().detach(child)
    }

    pub fn root_items(&self) -> Vec<HandleId> {
        let mut touchbar = self.touchbar.borrow_mut();
        touchbar.compact(&self.registry.borrow());
        touchbar.items()
    }

    /// Hand every pending change to the host and clear the dirty bits.
    pub fn flush(&self) -> Vec<UpdateEvent> {
        self.drain_deferred();
        let mut registry = self.registry.borrow_mut();
        self.touchbar.borrow_mut().flush(&mut registry)
    }
}
