//! MIPS code generation
//!
//! Translates quadruples into assembly for a teaching MIPS simulator.
//! The work is split into focused submodules:
//!
//! - `emitter.rs`: instruction selection per quad, the calling convention,
//!   string-pool management, and the stringish concatenation rewrite
//! - `regalloc.rs`: the `$t0..$t9` allocator with LRU spill to the frame
//! - `layout.rs`: per-class field layouts computed from the semantic
//!   pass's class records, plus the demo fallback table
//!
//! The emitter never fails: malformed input degrades to comments so the
//! output file stays assemblable.

mod emitter;
mod layout;
mod regalloc;

pub use emitter::MipsEmitter;
pub use layout::{FieldLayouts, FieldSlot};
pub use regalloc::{Eviction, RegAlloc, RegGrant, TREGS};
