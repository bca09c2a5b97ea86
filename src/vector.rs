use crate::consts::VECTOR_TABLE_ALIGN;

/// An interrupt handler as the controller sees it: entered directly by the
/// core on trap, no arguments, no return value. A handler for a
/// software-latched source must clear its own pending byte before returning.
pub type InterruptHandler = extern "C" fn();

/// The per-source handler registry consulted by hardware in vectored mode.
///
/// One address slot per source ID. The controller computes the entry address
/// for source `id` as `base + id * word size`, so the base alignment is part
/// of the dispatch contract and is carried by the type. Create one table for
/// the life of the program, default every slot with [`reset_all`], then
/// overwrite individual slots as sources are armed.
///
/// A slot may only change while its source's enable bit is clear or while
/// global interrupts are masked; otherwise dispatch races the write. Slot
/// indices are the caller's obligation: `id` must be below `N`.
///
/// [`reset_all`]: VectorTable::reset_all
#[repr(C, align(64))]
pub struct VectorTable<const N: usize> {
    slots: [usize; N],
}

impl<const N: usize> VectorTable<N> {
    pub const fn new() -> Self {
        Self { slots: [0; N] }
    }

    /// Number of slots.
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Points every slot at `default_handler`. Must run before any source is
    /// armed; an enabled source whose slot was never installed traps into
    /// the default exception path.
    pub fn reset_all(&mut self, default_handler: InterruptHandler) {
        for slot in self.slots.iter_mut() {
            *slot = default_handler as usize;
        }
    }

    /// Overwrites slot `id` with `handler`.
    pub fn install(&mut self, id: usize, handler: InterruptHandler) {
        self.slots[id] = handler as usize;
    }

    /// The handler address currently routed for source `id`.
    pub fn entry(&self, id: usize) -> usize {
        self.slots[id]
    }

    /// Base address programmed into the controller's table-base register.
    pub fn base_address(&self) -> usize {
        self.slots.as_ptr() as usize
    }
}

impl<const N: usize> Default for VectorTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

const _: () = assert!(core::mem::align_of::<VectorTable<1>>() == VECTOR_TABLE_ALIGN);

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn fallback() {}
    extern "C" fn armed() {}

    #[test]
    fn reset_fills_every_slot() {
        let mut table = VectorTable::<48>::new();
        table.reset_all(fallback);
        for id in 0..table.len() {
            assert_eq!(table.entry(id), fallback as usize);
        }
    }

    #[test]
    fn install_overwrites_one_slot_only() {
        let mut table = VectorTable::<48>::new();
        table.reset_all(fallback);
        table.install(16, armed);
        for id in 0..table.len() {
            let expect = if id == 16 { armed as usize } else { fallback as usize };
            assert_eq!(table.entry(id), expect);
        }
    }

    #[test]
    fn base_is_table_aligned() {
        let table = VectorTable::<4>::new();
        assert_eq!(table.base_address() % VECTOR_TABLE_ALIGN, 0);
    }

    #[test]
    #[should_panic]
    fn out_of_range_slot_panics() {
        let mut table = VectorTable::<8>::new();
        table.install(8, armed);
    }
}
