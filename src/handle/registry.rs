/// `handle/registry.rs` — generational table of native handles
///
/// Slots are reused after release, but each reuse bumps the slot
/// generation so an id kept around after its handle was freed never
/// resolves to the new occupant.
use std::fmt;

use super::{HandleKind, NativeHandle, TypeFlags};
use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId {
    index: u32,
    generation: u32,
}

impl HandleId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    /// Pack into a single integer for transport to the host.
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// How the native function allocating a handle was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallContext {
    /// `Class.new(...)`
    Constructor,
    /// Any other call, e.g. calling the class table directly.
    Plain,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    handle: Option<NativeHandle>,
}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zeroed handle of `kind`.
    ///
    /// Only a constructor call may allocate; anything else is reported as a
    /// type error to the script and nothing is stored.
    pub fn allocate(&mut self, call: CallContext, kind: HandleKind) -> Result<HandleId> {
        if call != CallContext::Constructor {
            return Err(BridgeError::NotConstructorCall { kind });
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    handle: None,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.handle = Some(NativeHandle::zeroed(kind));
        self.live += 1;

        let id = HandleId::new(index, slot.generation);
        log::debug!("allocate id={id} flags={}", kind.flag().bits());
        Ok(id)
    }

    /// Free the handle behind `id`. A second release of the same id fails.
    pub fn release(&mut self, id: HandleId) -> Result<NativeHandle> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation && s.handle.is_some())
            .ok_or(BridgeError::StaleHandle(id))?;

        let handle = slot.handle.take().ok_or(BridgeError::StaleHandle(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;

        log::debug!("release id={id} flags={}", handle.flags_bits());
        Ok(handle)
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: HandleId) -> Option<&NativeHandle> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.handle.as_ref())
    }

    pub fn get_mut(&mut self, id: HandleId) -> Option<&mut NativeHandle> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.handle.as_mut())
    }

    /// Handle behind `id` if its type bits intersect `mask`.
    pub fn resolve(&self, id: HandleId, mask: TypeFlags) -> Option<&NativeHandle> {
        let handle = self.get(id)?;
        if handle.type_flags().intersects(mask) {
            Some(handle)
        } else {
            log::debug!(
                "resolve id={id} flags={} does not match mask={}",
                handle.flags_bits(),
                mask.bits()
            );
            None
        }
    }

    pub fn resolve_mut(&mut self, id: HandleId, mask: TypeFlags) -> Option<&mut NativeHandle> {
        let handle = self.get_mut(id)?;
        if handle.type_flags().intersects(mask) {
            Some(handle)
        } else {
            log::debug!(
                "resolve id={id} flags={} does not match mask={}",
                handle.flags_bits(),
                mask.bits()
            );
            None
        }
    }

    /// Drop released children from a scrubber. Returns the live child count.
    pub fn compact_children(&mut self, container: HandleId) -> Option<usize> {
        let mut children = std::mem::take(&mut self.get_mut(container)?.scrubber_mut()?.children);
        let dropped = children.compact(|child| self.is_live(child));
        if dropped > 0 {
            log::debug!("container id={container} dropped {dropped} released children");
        }
        let count = children.len();
        if let Some(scrubber) = self.get_mut(container).and_then(|h| h.scrubber_mut()) {
            scrubber.children = children;
        }
        Some(count)
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(reg: &mut HandleRegistry) -> HandleId {
        reg.allocate(CallContext::Constructor, HandleKind::Label).unwrap()
    }

    #[test]
    fn allocate_outside_constructor_is_rejected() {
        let mut reg = HandleRegistry::new();
        let res = reg.allocate(CallContext::Plain, HandleKind::Button);
        assert!(matches!(
            res,
            Err(BridgeError::NotConstructorCall {
                kind: HandleKind::Button
            })
        ));
        assert!(reg.is_empty());
    }

    #[test]
    fn resolve_checks_type_mask() {
        let mut reg = HandleRegistry::new();
        let id = label(&mut reg);

        assert!(reg.resolve(id, TypeFlags::LABEL).is_some());
        assert!(reg.resolve(id, TypeFlags::WIDGETS).is_some());
        assert!(reg.resolve(id, TypeFlags::BUTTON).is_none());
        assert!(reg.resolve_mut(id, TypeFlags::SLIDER).is_none());
    }

    #[test]
    fn release_twice_is_an_error() {
        let mut reg = HandleRegistry::new();
        let id = label(&mut reg);

        assert!(reg.release(id).is_ok());
        assert!(matches!(reg.release(id), Err(BridgeError::StaleHandle(s)) if s == id));
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn stale_id_does_not_resolve_after_slot_reuse() {
        let mut reg = HandleRegistry::new();
        let old = label(&mut reg);
        assert!(reg.release(old).is_ok());

        let new = label(&mut reg);
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(reg.get(old).is_none());
        assert!(reg.resolve(old, TypeFlags::LABEL).is_none());
        assert!(reg.get(new).is_some());
    }

    #[test]
    fn bits_round_trip_through_u64() {
        let id = HandleId::new(7, 3);
        assert_eq!(HandleId::from_bits(id.to_bits()), id);
        assert_eq!(id.to_string(), "7v3");
    }

    #[test]
    fn compact_children_drops_released_entries() {
        let mut reg = HandleRegistry::new();
        let scrubber = reg.allocate(CallContext::Constructor, HandleKind::Scrubber).unwrap();
        let a = label(&mut reg);
        let b = label(&mut reg);
        if let Some(s) = reg.get_mut(scrubber).and_then(|h| h.scrubber_mut()) {
            s.children.attach(a);
            s.children.attach(b);
        }

        assert!(reg.release(a).is_ok());
        assert_eq!(reg.compact_children(scrubber), Some(1));
        assert_eq!(reg.compact_children(a), None);
    }
}
