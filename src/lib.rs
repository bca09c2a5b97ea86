#![cfg_attr(not(test), no_std)]

//! Core-local interrupt controller (CLIC) configuration and vectored
//! dispatch for a single RISC-V hart.
//!
//! The controller holds one pending byte, one enable byte, and one
//! level/priority byte per interrupt source, plus a vector table of handler
//! addresses it jumps through directly on trap entry. This crate owns the
//! configuration state machine over those registers; it deliberately does
//! not own handler bodies, board address generation, or link-time layout.
//!
//! Bring-up order matters and is encoded in [`Clic::init`]: global
//! interrupts are masked, every vector slot is pointed at the default
//! exception handler, the controller-wide configuration byte is written,
//! and only then are mtvec/mtvt programmed. Arming individual sources
//! (level/priority, handler slot, enable bit) and unmasking are left to the
//! application, which must finish arming before it unmasks.

mod consts;
mod source;
mod trap;
mod utils;
mod vector;

pub use consts::*;
#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub use trap::{default_exception_handler, MachineTrap};
pub use trap::{configure_trap_entry, FaultSnapshot, TrapControl};
pub use utils::{MmioBus, RegisterBus};
pub use vector::{InterruptHandler, VectorTable};

use axerrno::{ax_err, AxResult};
use bitmaps::Bitmap;
use log::info;
use spin::Mutex;

/// Register addresses and field widths for one CLIC design.
///
/// Supplied by board-specific code, never computed here: every design
/// generates its own base addresses and source count. All address methods
/// are public so board code and test fixtures can reach individual
/// registers.
#[derive(Clone, Copy, Debug)]
pub struct ClicLayout {
    /// Physical base address of the controller block.
    pub base: usize,
    /// Offset from `base` to hart 0's interrupt control block.
    pub hart_block_offset: usize,
    /// Spacing between per-hart control blocks.
    pub hart_stride: usize,
    /// Offsets within a hart block.
    pub intip_offset: usize,
    pub intie_offset: usize,
    pub intctl_offset: usize,
    pub cfg_offset: usize,
    /// CLINT-compatible registers relative to `base`.
    pub msip_offset: usize,
    pub mtimecmp_offset: usize,
    pub mtime_offset: usize,
    /// Number of interrupt sources this design implements.
    pub num_sources: usize,
    /// Implemented bits in each per-source control byte (top-justified).
    pub intctl_bits: u8,
}

impl ClicLayout {
    /// The SiFive CLIC0 map: per-source bytes at intip 0x000 / intie 0x400 /
    /// intctl 0x800, cliccfg at 0xc00, hart blocks at +0x0080_0000, CLINT
    /// registers at the bottom of the block.
    pub const fn sifive_clic0(base: usize, num_sources: usize, intctl_bits: u8) -> Self {
        Self {
            base,
            hart_block_offset: CLIC_HART_BLOCK_OFFSET,
            hart_stride: CLIC_HART_STRIDE,
            intip_offset: CLIC_INTIP_OFFSET,
            intie_offset: CLIC_INTIE_OFFSET,
            intctl_offset: CLIC_INTCTL_OFFSET,
            cfg_offset: CLIC_CFG_OFFSET,
            msip_offset: CLIC_MSIP_OFFSET,
            mtimecmp_offset: CLIC_MTIMECMP_OFFSET,
            mtime_offset: CLIC_MTIME_OFFSET,
            num_sources,
            intctl_bits,
        }
    }

    const fn hart_base(&self, hart: usize) -> usize {
        self.base + self.hart_block_offset + hart * self.hart_stride
    }

    /// Address of the pending byte for `id` on `hart`.
    pub const fn intip_addr(&self, hart: usize, id: usize) -> usize {
        self.hart_base(hart) + self.intip_offset + id
    }

    /// Address of the enable byte for `id` on `hart`.
    pub const fn intie_addr(&self, hart: usize, id: usize) -> usize {
        self.hart_base(hart) + self.intie_offset + id
    }

    /// Address of the level/priority byte for `id` on `hart`.
    pub const fn intctl_addr(&self, hart: usize, id: usize) -> usize {
        self.hart_base(hart) + self.intctl_offset + id
    }

    /// Address of the controller-wide configuration byte for `hart`.
    pub const fn cfg_addr(&self, hart: usize) -> usize {
        self.hart_base(hart) + self.cfg_offset
    }

    /// Address of the software-interrupt pending word for `hart`.
    pub const fn msip_addr(&self, hart: usize) -> usize {
        self.base + self.msip_offset + hart * CLIC_MSIP_HART_STRIDE
    }

    /// Address of the timer compare register for `hart`.
    pub const fn mtimecmp_addr(&self, hart: usize) -> usize {
        self.base + self.mtimecmp_offset + hart * CLIC_MTIMECMP_HART_STRIDE
    }

    /// Address of the free-running timer register.
    pub const fn mtime_addr(&self) -> usize {
        self.base + self.mtime_offset
    }
}

/// Controller-wide configuration, packed into the cliccfg byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClicConfig {
    /// When set, a source may opt out of vector-table dispatch and trap to
    /// the common entry instead. This design keeps it off: every enabled
    /// source dispatches through its table slot.
    pub selective_vectoring: bool,
    /// How many implemented control-byte bits encode preemption level; the
    /// rest encode priority within a level.
    pub level_bits: u8,
    /// How many bits restrict privilege modes. Zero means machine mode only.
    pub mode_bits: u8,
}

impl ClicConfig {
    /// The flat policy: no selective vectoring, a single preemption level of
    /// 255 with every implemented bit used as priority, machine mode only.
    /// Ties among equal-priority pending sources go to the highest source ID
    /// in hardware.
    pub const fn flat() -> Self {
        Self {
            selective_vectoring: false,
            level_bits: 0,
            mode_bits: 0,
        }
    }

    const fn pack(self) -> u8 {
        ((self.selective_vectoring as u8) << CLICCFG_NVBITS_SHIFT)
            | ((self.level_bits & CLICCFG_NLBITS_MAX) << CLICCFG_NLBITS_SHIFT)
            | ((self.mode_bits & CLICCFG_NMBITS_MAX) << CLICCFG_NMBITS_SHIFT)
    }
}

/// Driver for one hart's CLIC.
///
/// Generic over the register bus so the same state machine runs against real
/// memory-mapped hardware ([`MmioBus`]) or a simulated register file in
/// tests. The two bitmaps mirror driver-side knowledge the hardware cannot
/// answer: whether a source's control byte has been programmed since reset,
/// and which sources this driver has enabled.
pub struct Clic<B: RegisterBus> {
    layout: ClicLayout,
    hart: usize,
    bus: B,
    configured: Mutex<Bitmap<{ CLIC_NUM_SOURCES }>>,
    enabled: Mutex<Bitmap<{ CLIC_NUM_SOURCES }>>,
}

impl<B: RegisterBus> Clic<B> {
    pub fn new(layout: ClicLayout, hart: usize, bus: B) -> Self {
        assert!(
            layout.num_sources > 0 && layout.num_sources <= CLIC_NUM_SOURCES,
            "source count {} outside 1..={}",
            layout.num_sources,
            CLIC_NUM_SOURCES
        );
        assert!(
            layout.intctl_bits >= 1 && layout.intctl_bits <= 8,
            "control byte cannot implement {} bits",
            layout.intctl_bits
        );
        Self {
            layout,
            hart,
            bus,
            configured: Mutex::new(Bitmap::new()),
            enabled: Mutex::new(Bitmap::new()),
        }
    }

    pub fn layout(&self) -> &ClicLayout {
        &self.layout
    }

    pub fn hart(&self) -> usize {
        self.hart
    }

    pub(crate) fn bus(&self) -> &B {
        &self.bus
    }

    /// Writes the controller-wide configuration byte.
    ///
    /// Once written, the level/priority split of every control byte is
    /// fixed, so reconfiguring while any source is enabled is rejected: the
    /// controller would silently re-rank live sources. Must run with global
    /// interrupts masked; [`Clic::init`] sequences this.
    pub fn configure(&self, cfg: ClicConfig) -> AxResult {
        if cfg.level_bits > CLICCFG_NLBITS_MAX || cfg.level_bits > self.layout.intctl_bits {
            return ax_err!(InvalidInput, "level bits exceed implemented control width");
        }
        if cfg.mode_bits > CLICCFG_NMBITS_MAX {
            return ax_err!(InvalidInput, "mode bits exceed field width");
        }
        if !self.enabled.lock().is_empty() {
            return ax_err!(BadState, "cannot reconfigure controller with sources enabled");
        }
        self.bus.write_byte(self.layout.cfg_addr(self.hart), cfg.pack());
        info!(
            "cliccfg: nvbits={} nlbits={} nmbits={}",
            cfg.selective_vectoring as u8, cfg.level_bits, cfg.mode_bits
        );
        Ok(())
    }

    /// One-time bring-up, in the only safe order: mask global interrupts,
    /// route every vector slot to `default_handler`, write the controller
    /// configuration, then program the trap entry registers.
    ///
    /// Returns with global interrupts still masked. The application arms its
    /// sources (control byte, table slot, enable bit) and then calls
    /// [`TrapControl::global_enable`] itself; nothing may be enabled before
    /// this function returns.
    pub fn init<T: TrapControl, const N: usize>(
        &self,
        trap: &T,
        table: &mut VectorTable<N>,
        default_handler: InterruptHandler,
        cfg: ClicConfig,
    ) -> AxResult {
        assert!(
            N >= self.layout.num_sources,
            "vector table has {} slots for {} sources",
            N,
            self.layout.num_sources
        );

        trap.global_disable();
        table.reset_all(default_handler);
        self.configure(cfg)?;
        configure_trap_entry(trap, default_handler, table);

        info!(
            "clic: hart {} ready, {} sources, {} control bits",
            self.hart, self.layout.num_sources, self.layout.intctl_bits
        );
        Ok(())
    }
}
