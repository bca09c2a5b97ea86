use crate::consts::{
    MCAUSE_CODE_MASK, MCAUSE_INTERRUPT, MTVEC_MODE_CLIC_VECTORED, MTVEC_MODE_MASK,
    VECTOR_TABLE_ALIGN,
};
use crate::vector::{InterruptHandler, VectorTable};

/// Trap CSR access for one hart.
///
/// The dispatch logic never touches CSRs directly; it goes through this
/// capability so that targets with different register-access mechanisms (or a
/// test fixture) can supply their own implementation. [`MachineTrap`] is the
/// implementation for the executing hart on RISC-V targets.
pub trait TrapControl {
    /// Sets mstatus.mie, allowing pending-and-enabled sources to preempt.
    fn global_enable(&self);

    /// Clears mstatus.mie. Every configuration operation in this crate must
    /// run between `global_disable` and `global_enable`; masking is the only
    /// mutual exclusion between software mutating the vector table and the
    /// core reading it.
    fn global_disable(&self);

    /// Writes the trap-vector register with a combined `base | mode` value.
    fn write_mtvec(&self, value: usize);

    /// Writes the CLIC vector-table-base register (mtvt, CSR 0x307).
    fn write_mtvt(&self, base: usize);

    /// Reads the cause, faulting address, and trap value registers.
    fn fault_snapshot(&self) -> FaultSnapshot;
}

/// What the default exception path captures on entry, for a debugger to read
/// after the halt. Not persisted anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub mcause: usize,
    pub mepc: usize,
    pub mtval: usize,
}

impl FaultSnapshot {
    /// True when the trap was an interrupt, false for a synchronous exception.
    pub const fn is_interrupt(&self) -> bool {
        self.mcause & MCAUSE_INTERRUPT != 0
    }

    /// The cause code with the interrupt bit stripped.
    pub const fn code(&self) -> usize {
        self.mcause & MCAUSE_CODE_MASK
    }
}

/// Programs the trap-vector base for CLIC vectored mode and points the
/// controller's table-base register at `table`.
///
/// Any source with no armed handler, and every synchronous exception, lands
/// on `default_handler`. Must run after the table has been defaulted with
/// [`VectorTable::reset_all`] and before any source is enabled: an
/// enabled-but-unrouted source traps with nothing sane at the vector base.
pub fn configure_trap_entry<T: TrapControl, const N: usize>(
    trap: &T,
    default_handler: InterruptHandler,
    table: &VectorTable<N>,
) {
    let base = default_handler as usize;
    assert_eq!(
        base & MTVEC_MODE_MASK,
        0,
        "default handler {:#x} overlaps the mtvec mode field",
        base
    );
    trap.write_mtvec(base | MTVEC_MODE_CLIC_VECTORED);

    let table_base = table.base_address();
    assert_eq!(
        table_base % VECTOR_TABLE_ALIGN,
        0,
        "vector table base {:#x} is not {}-byte aligned",
        table_base,
        VECTOR_TABLE_ALIGN
    );
    trap.write_mtvt(table_base);
}

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
mod machine {
    use log::error;

    use super::{FaultSnapshot, TrapControl};

    /// CSR-backed trap control for the hart this code runs on.
    pub struct MachineTrap;

    impl TrapControl for MachineTrap {
        fn global_enable(&self) {
            unsafe { riscv::register::mstatus::set_mie() }
        }

        fn global_disable(&self) {
            unsafe { riscv::register::mstatus::clear_mie() }
        }

        fn write_mtvec(&self, value: usize) {
            unsafe { core::arch::asm!("csrw mtvec, {0}", in(reg) value) }
        }

        fn write_mtvt(&self, base: usize) {
            // mtvt has no named mnemonic in the base ISA; 0x307 is the CLIC
            // CSR number.
            unsafe { core::arch::asm!("csrw 0x307, {0}", in(reg) base) }
        }

        fn fault_snapshot(&self) -> FaultSnapshot {
            FaultSnapshot {
                mcause: riscv::register::mcause::read().bits(),
                mepc: riscv::register::mepc::read(),
                mtval: riscv::register::mtval::read(),
            }
        }
    }

    /// Terminal landing point for unrouted interrupts and synchronous
    /// exceptions.
    ///
    /// Captures the fault registers, then idles forever without touching
    /// anything else so that a debugger (or reset) can inspect the hart in
    /// the state it faulted in. There is no recovery tier at this layer:
    /// either a handler services its source and returns, or execution ends
    /// here.
    pub extern "C" fn default_exception_handler() {
        let fault = MachineTrap.fault_snapshot();
        error!(
            "unhandled trap: mcause={:#x} (interrupt={} code={}) mepc={:#x} mtval={:#x}",
            fault.mcause,
            fault.is_interrupt(),
            fault.code(),
            fault.mepc,
            fault.mtval
        );
        loop {
            unsafe { core::arch::asm!("wfi") }
        }
    }
}

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub use machine::{default_exception_handler, MachineTrap};

#[cfg(test)]
pub(crate) mod testing {
    use spin::Mutex;

    use super::{FaultSnapshot, TrapControl};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TrapOp {
        GlobalEnable,
        GlobalDisable,
        Mtvec(usize),
        Mtvt(usize),
    }

    /// Records CSR traffic so tests can assert ordering and values.
    #[derive(Default)]
    pub struct RecordingTrap {
        pub ops: Mutex<Vec<TrapOp>>,
    }

    impl TrapControl for RecordingTrap {
        fn global_enable(&self) {
            self.ops.lock().push(TrapOp::GlobalEnable);
        }

        fn global_disable(&self) {
            self.ops.lock().push(TrapOp::GlobalDisable);
        }

        fn write_mtvec(&self, value: usize) {
            self.ops.lock().push(TrapOp::Mtvec(value));
        }

        fn write_mtvt(&self, base: usize) {
            self.ops.lock().push(TrapOp::Mtvt(base));
        }

        fn fault_snapshot(&self) -> FaultSnapshot {
            FaultSnapshot {
                mcause: 0,
                mepc: 0,
                mtval: 0,
            }
        }
    }
}
