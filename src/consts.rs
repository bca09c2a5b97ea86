// Follows the SiFive CLIC0 memory map. All per-source registers are one byte
// wide and indexed by source ID; msip/mtimecmp/mtime keep the CLINT layout at
// the bottom of the block.

/// Architectural ceiling on CLIC interrupt sources. Source IDs range from 0
/// to 1023 (inclusive); a given design implements some prefix of this range.
pub const CLIC_NUM_SOURCES: usize = 1024;

// --- CLINT-compatible registers (relative to the controller base) ---

/// Offset to the software interrupt pending word for hart 0.
/// msip for hart H is at: CLIC_MSIP_OFFSET + H * CLIC_MSIP_HART_STRIDE
pub const CLIC_MSIP_OFFSET: usize = 0x0000;

/// Stride between per-hart msip words (one 32-bit word each).
pub const CLIC_MSIP_HART_STRIDE: usize = 0x4;

/// Offset to the timer compare register for hart 0 (64-bit).
/// mtimecmp for hart H is at: CLIC_MTIMECMP_OFFSET + H * CLIC_MTIMECMP_HART_STRIDE
pub const CLIC_MTIMECMP_OFFSET: usize = 0x4000;

/// Stride between per-hart mtimecmp registers.
pub const CLIC_MTIMECMP_HART_STRIDE: usize = 0x8;

/// Offset to the free-running timer register (64-bit, shared by all harts).
pub const CLIC_MTIME_OFFSET: usize = 0xBFF8;

// --- Per-hart interrupt control block ---

/// Offset from the controller base to hart 0's interrupt control block.
/// The block for hart H starts at: CLIC_HART_BLOCK_OFFSET + H * CLIC_HART_STRIDE
pub const CLIC_HART_BLOCK_OFFSET: usize = 0x0080_0000;

/// Stride between per-hart control blocks. Single-hart parts ignore this.
pub const CLIC_HART_STRIDE: usize = 0x1000;

/// Offset within a hart block to the pending bytes (one byte per source).
pub const CLIC_INTIP_OFFSET: usize = 0x000;

/// Offset within a hart block to the enable bytes (one byte per source).
pub const CLIC_INTIE_OFFSET: usize = 0x400;

/// Offset within a hart block to the level/priority control bytes
/// (one byte per source).
pub const CLIC_INTCTL_OFFSET: usize = 0x800;

/// Offset within a hart block to the controller-wide configuration byte.
pub const CLIC_CFG_OFFSET: usize = 0xC00;

// --- cliccfg fields: nvbits[0] | nlbits[4:1] | nmbits[6:5] ---

pub const CLICCFG_NVBITS_SHIFT: u8 = 0;
pub const CLICCFG_NLBITS_SHIFT: u8 = 1;
pub const CLICCFG_NMBITS_SHIFT: u8 = 5;

/// Largest encodable level-bit count (nlbits is a 4-bit field).
pub const CLICCFG_NLBITS_MAX: u8 = 15;

/// Largest encodable mode-bit count (nmbits is a 2-bit field).
pub const CLICCFG_NMBITS_MAX: u8 = 3;

// --- mtvec.mode encodings: bit[0] with a CLINT, bits[1:0] with a CLIC ---

pub const MTVEC_MODE_CLINT_DIRECT: usize = 0x0;
pub const MTVEC_MODE_CLINT_VECTORED: usize = 0x1;
pub const MTVEC_MODE_CLIC_DIRECT: usize = 0x2;
pub const MTVEC_MODE_CLIC_VECTORED: usize = 0x3;

/// Mask covering the mtvec mode field; the base address must keep these clear.
pub const MTVEC_MODE_MASK: usize = 0x3;

// --- mcause decoding ---

/// Set in mcause when the trap was an interrupt rather than an exception.
pub const MCAUSE_INTERRUPT: usize = 1 << (usize::BITS - 1);

/// Mask extracting the cause code from mcause.
pub const MCAUSE_CODE_MASK: usize = 0x3FF;

// --- Well-known local source IDs ---

pub const IRQ_SOFTWARE: usize = 3;
pub const IRQ_TIMER: usize = 7;
pub const IRQ_EXTERNAL: usize = 11;
pub const IRQ_CLIC_SOFTWARE: usize = 12;

/// First local external interrupt; lines above this are board-defined.
pub const IRQ_LOCAL_EXT_BASE: usize = 16;

/// Required alignment of the vector table base: the controller derives entry
/// addresses as base + id * word size and ignores the low base bits.
pub const VECTOR_TABLE_ALIGN: usize = 64;
