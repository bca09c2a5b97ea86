use axerrno::{ax_err, AxResult};
use log::trace;

use crate::utils::RegisterBus;
use crate::Clic;

/// Per-source control: level/priority byte, enable bit, pending bit.
///
/// Every operation is idempotent. Register state is authoritative: queries
/// read the controller, never a cached copy. Ordering is enforced where the
/// hardware punishes getting it wrong silently — a control byte cannot be
/// reprogrammed while its source is enabled (the controller would re-rank a
/// live source mid-flight), and a source cannot be enabled before its control
/// byte has been programmed at least once.
///
/// Tie-break contract assumed from hardware, not enforced here: among
/// simultaneously pending-and-enabled sources at the same encoded
/// level/priority, the highest-numbered source ID dispatches first.
impl<B: RegisterBus> Clic<B> {
    fn check_id(&self, id: usize) -> AxResult {
        if id >= self.layout.num_sources {
            return ax_err!(InvalidInput, "source id out of range");
        }
        Ok(())
    }

    /// Bit position of the level/priority field inside the control byte; the
    /// implemented bits occupy the top of the byte.
    fn ctl_shift(&self) -> u8 {
        8 - self.layout.intctl_bits
    }

    /// Programs the encoded level/priority field for `id`.
    ///
    /// `value` is the field value, `intctl_bits` wide. How many of those bits
    /// mean level and how many mean priority is fixed by
    /// [`configure`](Clic::configure). The unimplemented low bits of the
    /// control byte are written as ones, matching what the hardware hardwires
    /// them to, so the all-priority flat policy programs 0xFF exactly.
    ///
    /// Must precede [`enable`](Clic::enable) for this source and is rejected
    /// while the source is enabled.
    pub fn set_level_priority(&self, id: usize, value: u8) -> AxResult {
        self.check_id(id)?;
        if (value as u16) >= 1u16 << self.layout.intctl_bits {
            return ax_err!(InvalidInput, "level/priority value exceeds implemented width");
        }
        if self.bus.read_byte(self.layout.intie_addr(self.hart, id)) != 0 {
            return ax_err!(BadState, "source must be disabled before reprogramming");
        }
        let hardwired_ones = (0xFFu16 >> self.layout.intctl_bits) as u8;
        let byte = (value << self.ctl_shift()) | hardwired_ones;
        self.bus
            .write_byte(self.layout.intctl_addr(self.hart, id), byte);
        self.configured.lock().set(id, true);
        trace!("clic: source {} intctl <- {:#04x}", id, byte);
        Ok(())
    }

    /// Reads back the encoded level/priority field for `id`.
    pub fn level_priority(&self, id: usize) -> u8 {
        assert!(id < self.layout.num_sources, "source id {} out of range", id);
        self.bus.read_byte(self.layout.intctl_addr(self.hart, id)) >> self.ctl_shift()
    }

    /// Sets the enable bit for `id`.
    ///
    /// The caller must have installed a handler in the vector table slot for
    /// `id` first; enabling a source whose slot still holds the default
    /// handler makes every delivery a fatal fault.
    pub fn enable(&self, id: usize) -> AxResult {
        self.check_id(id)?;
        if !self.configured.lock().get(id) {
            return ax_err!(BadState, "level/priority must be programmed before enable");
        }
        self.bus.write_byte(self.layout.intie_addr(self.hart, id), 1);
        self.enabled.lock().set(id, true);
        trace!("clic: source {} enabled", id);
        Ok(())
    }

    /// Clears the enable bit for `id`. The source may stay pending; it will
    /// dispatch as soon as it is re-enabled. An already dispatched handler is
    /// not cancelled.
    pub fn disable(&self, id: usize) -> AxResult {
        self.check_id(id)?;
        self.bus.write_byte(self.layout.intie_addr(self.hart, id), 0);
        self.enabled.lock().set(id, false);
        trace!("clic: source {} disabled", id);
        Ok(())
    }

    /// Sets the pending bit for `id`, triggering dispatch once the source and
    /// global interrupts are enabled. Only meaningful for software-settable
    /// sources; hardware-latched lines own their own pending state.
    pub fn set_pending(&self, id: usize) -> AxResult {
        self.check_id(id)?;
        self.bus.write_byte(self.layout.intip_addr(self.hart, id), 1);
        Ok(())
    }

    /// Clears the pending bit for `id`. A handler for a software-latched
    /// source must call this before returning or it will be re-entered
    /// immediately.
    pub fn clear_pending(&self, id: usize) -> AxResult {
        self.check_id(id)?;
        self.bus.write_byte(self.layout.intip_addr(self.hart, id), 0);
        Ok(())
    }

    pub fn is_pending(&self, id: usize) -> bool {
        assert!(id < self.layout.num_sources, "source id {} out of range", id);
        self.bus.read_byte(self.layout.intip_addr(self.hart, id)) != 0
    }

    pub fn is_enabled(&self, id: usize) -> bool {
        assert!(id < self.layout.num_sources, "source id {} out of range", id);
        self.bus.read_byte(self.layout.intie_addr(self.hart, id)) != 0
    }

    /// Raises this hart's own software interrupt (msip).
    pub fn raise_software_interrupt(&self) {
        self.bus.write_word(self.layout.msip_addr(self.hart), 1);
    }

    /// Clears this hart's software interrupt; the software handler's one
    /// mandatory action.
    pub fn clear_software_interrupt(&self) {
        self.bus.write_word(self.layout.msip_addr(self.hart), 0);
    }

    /// Arms the timer comparator `ticks_ahead` timer ticks from now. The
    /// timer line latches in hardware; re-arming the comparator is what
    /// clears its pending state.
    pub fn set_timer_compare(&self, ticks_ahead: u64) {
        let now = self.bus.read_dword(self.layout.mtime_addr());
        self.bus
            .write_dword(self.layout.mtimecmp_addr(self.hart), now + ticks_ahead);
    }
}
