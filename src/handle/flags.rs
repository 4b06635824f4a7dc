/// `handle/flags.rs` — type and state bitmasks stamped on every native handle
///
/// Type bits identify the concrete kind and are fixed at allocation.
/// State bits record dirty/configured/created status and change freely.
/// The bit positions match the layout the touch bar host expects.
use bitflags::bitflags;

bitflags! {
    /// Concrete kind of a handle. Exactly one bit is set on a live handle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const EMBED          = 1 << 0;
        const COMMAND        = 1 << 1;
        const WINDOW_MANAGER = 1 << 2;
        const WINDOW         = 1 << 4;

        const LABEL          = 1 << 10;
        const BUTTON         = 1 << 11;
        const SLIDER         = 1 << 12;
        const SCRUBBER       = 1 << 13;
    }
}

impl TypeFlags {
    /// Kinds that carry a value and a color pair.
    pub const WIDGETS: Self = Self::LABEL.union(Self::BUTTON).union(Self::SLIDER);

    /// Kinds that may be placed into a container or onto the touch bar.
    pub const ATTACHABLE: Self = Self::WIDGETS.union(Self::SCRUBBER);

    #[inline]
    pub fn is_widget(&self) -> bool {
        self.intersects(Self::WIDGETS)
    }

    #[inline]
    pub fn is_attachable(&self) -> bool {
        self.intersects(Self::ATTACHABLE)
    }
}

bitflags! {
    /// Mutable status bits of a handle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFlags: u32 {
        /// Foreground color changed since the last flush.
        const COLOR_FG   = 1 << 26;
        /// Background color changed since the last flush.
        const COLOR_BG   = 1 << 27;
        /// Value changed since the last flush.
        const VALUE      = 1 << 28;
        /// The host applied the current configuration at least once.
        const CONFIGURED = 1 << 29;
        /// The host created a visual item for this handle.
        const CREATED    = 1 << 30;
    }
}

impl StateFlags {
    pub const COLORS: Self = Self::COLOR_FG.union(Self::COLOR_BG);

    /// Every bit the flush cycle consumes.
    pub const DIRTY: Self = Self::COLORS.union(Self::VALUE);

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.intersects(Self::DIRTY)
    }
}
