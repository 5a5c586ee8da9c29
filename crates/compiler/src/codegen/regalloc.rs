//! Register allocation with LRU spill to the activation record
//!
//! Maps TAC names onto `$t0..$t9`. When no register is free, the least
//! recently used unpinned, non-ephemeral binding is evicted: its value is
//! stored to a spill slot at a negative offset from `$fp` (the caller
//! emits the `sw` from the returned eviction record) and reloaded lazily
//! at its next use. Ephemeral temporaries back literals and intermediate
//! values; they are excluded from victim selection while held.

use std::collections::{HashMap, HashSet};

/// The caller-save temporary register pool
pub const TREGS: [&str; 10] = [
    "$t0", "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7", "$t8", "$t9",
];

/// A spilled binding: the evicted name and its slot offset from `$fp`.
/// The register being handed out still holds the old value, so the store
/// must be emitted before the register is reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eviction {
    pub name: String,
    pub offset: i32,
}

/// Result of a register request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegGrant {
    pub reg: &'static str,
    pub evicted: Option<Eviction>,
}

#[derive(Debug, Default)]
pub struct RegAlloc {
    name2reg: HashMap<String, &'static str>,
    reg2name: HashMap<&'static str, String>,
    dirty: HashSet<String>,
    pinned: HashSet<&'static str>,
    use_tick: u64,
    last_use: HashMap<&'static str, u64>,
    spill_slot: HashMap<String, i32>,
    spill_next_off: i32,
    temp_inuse: HashSet<&'static str>,
    tregs_free: Vec<&'static str>,
    frame_spill_limit: usize,
}

impl RegAlloc {
    pub fn new() -> Self {
        let mut alloc = RegAlloc::default();
        alloc.reset(-4, 0);
        alloc
    }

    fn reset(&mut self, spill_next_off: i32, frame_spill_limit: usize) {
        self.name2reg.clear();
        self.reg2name.clear();
        self.dirty.clear();
        self.pinned.clear();
        self.use_tick = 0;
        self.last_use.clear();
        self.spill_slot.clear();
        self.spill_next_off = spill_next_off;
        self.temp_inuse.clear();
        self.tregs_free = TREGS.to_vec();
        self.frame_spill_limit = frame_spill_limit;
    }

    /// Reset per-function state; returns the spill bytes to reserve in
    /// the frame.
    pub fn start_function(&mut self, spill_bytes_hint: usize) -> usize {
        self.reset(-4, spill_bytes_hint);
        self.frame_spill_limit
    }

    pub fn end_function(&mut self) {
        self.reset(-4, 0);
    }

    // ---- internals ----

    fn touch(&mut self, reg: &'static str) {
        self.use_tick += 1;
        self.last_use.insert(reg, self.use_tick);
    }

    fn alloc_spill_slot(&mut self, name: &str) -> i32 {
        if let Some(&off) = self.spill_slot.get(name) {
            return off;
        }
        let off = self.spill_next_off;
        self.spill_next_off -= 4;
        self.spill_slot.insert(name.to_string(), off);
        off
    }

    /// LRU victim among mapped registers, skipping pinned and ephemeral
    /// ones. Ties break on register order for determinism.
    fn choose_victim(&self) -> Option<&'static str> {
        let mut candidates: Vec<(u64, &'static str)> = self
            .reg2name
            .keys()
            .filter(|r| !self.pinned.contains(*r) && !self.temp_inuse.contains(*r))
            .map(|&r| (self.last_use.get(r).copied().unwrap_or(0), r))
            .collect();
        candidates.sort();
        candidates.first().map(|&(_, r)| r)
    }

    /// Unbind a register, recording a spill store for its name
    fn evict(&mut self, reg: &'static str) -> Option<Eviction> {
        let name = self.reg2name.remove(reg)?;
        self.name2reg.remove(&name);
        self.dirty.remove(&name);
        self.last_use.remove(reg);
        let offset = self.alloc_spill_slot(&name);
        Some(Eviction { name, offset })
    }

    fn take_register(&mut self) -> (&'static str, Option<Eviction>) {
        if !self.tregs_free.is_empty() {
            return (self.tregs_free.remove(0), None);
        }
        let victim = self.choose_victim().unwrap_or(TREGS[TREGS.len() - 1]);
        let evicted = self.evict(victim);
        (victim, evicted)
    }

    // ---- API ----

    /// Register for a named value, binding one on demand. The returned
    /// eviction, if any, must be stored before the register is reused.
    pub fn get(&mut self, name: &str, for_write: bool) -> RegGrant {
        if let Some(&reg) = self.name2reg.get(name) {
            self.touch(reg);
            if for_write {
                self.dirty.insert(name.to_string());
            }
            return RegGrant { reg, evicted: None };
        }

        let (reg, evicted) = self.take_register();
        self.name2reg.insert(name.to_string(), reg);
        self.reg2name.insert(reg, name.to_string());
        self.touch(reg);
        if for_write {
            self.dirty.insert(name.to_string());
        }
        RegGrant { reg, evicted }
    }

    pub fn has_spill_slot(&self, name: &str) -> bool {
        self.spill_slot.contains_key(name)
    }

    /// Negative offset from `$fp` backing a spilled name
    pub fn spill_slot_offset(&self, name: &str) -> Option<i32> {
        self.spill_slot.get(name).copied()
    }

    /// Acquire an ephemeral temporary for a literal or an intermediate
    /// value. Excluded from victim selection until released.
    pub fn temp_acquire(&mut self) -> RegGrant {
        let (reg, evicted) = self.take_register();
        self.temp_inuse.insert(reg);
        self.touch(reg);
        RegGrant { reg, evicted }
    }

    pub fn temp_release(&mut self, reg: &str) {
        let Some(&reg) = TREGS.iter().find(|&&r| r == reg) else {
            return;
        };
        if self.temp_inuse.remove(reg)
            && !self.reg2name.contains_key(reg)
            && !self.tregs_free.contains(&reg)
        {
            self.tregs_free.push(reg);
        }
    }

    /// Protect a register across a multi-instruction sequence
    pub fn pin(&mut self, reg: &str) {
        if let Some(&reg) = TREGS.iter().find(|&&r| r == reg) {
            self.pinned.insert(reg);
        }
    }

    pub fn unpin(&mut self, reg: &str) {
        self.pinned.retain(|&r| r != reg);
    }

    pub fn is_temp_reg(reg: &str) -> bool {
        TREGS.contains(&reg)
    }

    /// True when no name or ephemeral state survives (checked after
    /// `end_function`)
    pub fn is_clean(&self) -> bool {
        self.name2reg.is_empty() && self.reg2name.is_empty() && self.temp_inuse.is_empty()
    }
}
