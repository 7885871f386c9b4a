//! Handle Registry: Dense, recyclable integer handles for live windows.
//!
//! The native layer only ever holds a [`WindowHandle`], never a reference to
//! actor state. The registry is an arena of slots plus a stack of freed
//! indices, so the most recently released handle is the next one handed out
//! and the live handle space stays dense.
//!
//! The registry itself is not synchronized; the [`Hub`](super::hub::Hub)
//! guards it with the same lock as the request queue.

/// Identifier of a window across the logic/native boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(u32);

impl WindowHandle {
    /// Create a handle from its raw value.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value, as passed across the C boundary.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of window slots addressed by [`WindowHandle`].
#[derive(Debug)]
pub struct HandleRegistry<T> {
    /// Slot table; `None` means the handle is not live.
    slots: Vec<Option<T>>,
    /// Released indices, most recent last.
    free: Vec<u32>,
    /// Number of occupied slots.
    live: usize,
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleRegistry<T> {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` and return its handle.
    ///
    /// Reuses the most recently released handle before growing the table.
    /// Returns `None` only when the `u32` handle space is exhausted.
    pub fn allocate(&mut self, value: T) -> Option<WindowHandle> {
        let handle = if let Some(index) = self.free.pop() {
            WindowHandle(index)
        } else {
            let index = u32::try_from(self.slots.len()).ok()?;
            self.slots.push(None);
            WindowHandle(index)
        };
        self.slots[handle.index()] = Some(value);
        self.live += 1;
        Some(handle)
    }

    /// Clear the slot and make the handle available for reuse.
    ///
    /// Returns the stored value, or `None` if the handle was not live
    /// (a double release is ignored rather than corrupting the free list).
    pub fn release(&mut self, handle: WindowHandle) -> Option<T> {
        let value = self.slots.get_mut(handle.index())?.take()?;
        self.free.push(handle.0);
        self.live -= 1;
        Some(value)
    }

    /// Look up a live handle.
    pub fn lookup(&self, handle: WindowHandle) -> Option<&T> {
        self.slots.get(handle.index())?.as_ref()
    }

    /// Number of live handles.
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Check if no handle is live.
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// All live handles in ascending order.
    pub fn live_handles(&self) -> Vec<WindowHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .filter_map(|(index, _)| u32::try_from(index).ok().map(WindowHandle))
            .collect()
    }
}
