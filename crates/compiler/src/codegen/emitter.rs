//! MIPS instruction selection and emission
//!
//! ABI:
//! - `$a0..$a3` carry the first four arguments; extras go on the caller's
//!   stack at `0($sp), 4($sp), ...` right before the `jal`.
//! - `$v0` carries the return value; `$t0..$t9` are caller-save and are
//!   pushed/popped around every call site.
//! - Frames: `addiu $sp, $sp, -FRAME`, `$ra` at `FRAME-4($sp)`, `$fp` at
//!   `FRAME-8($sp)`, then `$fp <- $sp`, where FRAME is the 8-byte-aligned
//!   sum of locals, the spill reservation, and the two saved words.
//! - The entry function ends with `li $v0, 10; syscall` instead of an
//!   epilogue (simulator exit).
//!
//! Method calls arrive as `call method <name>`: the last pending `Param`
//! is the receiver and moves to `$a0`, the rest renumber from 1. Inside a
//! method body the formal at TAC index `i` therefore lives in `$a(i+1)`,
//! and `this` reads straight from `$a0`.
//!
//! Each `Param` freezes its value into a private temporary so later
//! argument evaluation cannot clobber earlier ones. A `+` over stringish
//! operands turns into a `__strcat_new` runtime call. The emitter never
//! fails: unknown fields resolve to offset 0 under a comment and
//! unparsed TAC lines come through as comments.

use super::layout::FieldLayouts;
use super::regalloc::{RegAlloc, RegGrant};
use crate::tac::{BinKind, Quad};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

pub struct MipsEmitter {
    lines: Vec<String>,
    entry: String,
    spill_bytes_hint: usize,
    current_func: Option<String>,
    /// Pre-mangling name of the current function
    current_raw_name: Option<String>,
    /// True when the current function receives `this` in `$a0`
    in_method_callee: bool,
    stack_size: usize,
    regs: RegAlloc,
    /// literal text -> `.data` label, in first-seen order
    str_pool: IndexMap<String, String>,
    str_count: usize,
    /// names whose spill slot is already materialized in their register
    loaded: HashSet<String>,
    /// frozen (index, register) pairs awaiting the next call
    pending_args: Vec<(usize, &'static str)>,
    func_seen: HashMap<String, usize>,
    func_mangle: HashMap<String, String>,
    /// names known to hold string pointers in the current function
    stringish: HashSet<String>,
    layouts: FieldLayouts,
}

impl Default for MipsEmitter {
    fn default() -> Self {
        Self::new(FieldLayouts::demo())
    }
}

impl MipsEmitter {
    pub fn new(layouts: FieldLayouts) -> Self {
        MipsEmitter {
            lines: Vec::new(),
            entry: "main".to_string(),
            spill_bytes_hint: 256,
            current_func: None,
            current_raw_name: None,
            in_method_callee: false,
            stack_size: 0,
            regs: RegAlloc::new(),
            str_pool: IndexMap::new(),
            str_count: 0,
            loaded: HashSet::new(),
            pending_args: Vec::new(),
            func_seen: HashMap::new(),
            func_mangle: HashMap::new(),
            stringish: HashSet::new(),
            layouts: FieldLayouts::demo(),
        }
        .with_layouts(layouts)
    }

    fn with_layouts(mut self, layouts: FieldLayouts) -> Self {
        self.layouts = if layouts.is_empty() {
            FieldLayouts::demo()
        } else {
            layouts
        };
        self
    }

    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_spill_hint(mut self, bytes: usize) -> Self {
        self.spill_bytes_hint = bytes;
        self
    }

    #[cfg(test)]
    pub(crate) fn allocator(&self) -> &RegAlloc {
        &self.regs
    }

    // ---- base utilities ----

    fn emit(&mut self, s: impl Into<String>) {
        self.lines.push(s.into());
    }

    fn comment(&mut self, s: &str) {
        self.lines.push(format!("# {}", s));
    }

    fn align8(n: usize) -> usize {
        n.div_ceil(8) * 8
    }

    fn str_label(&mut self, text: &str) -> String {
        if let Some(label) = self.str_pool.get(text) {
            return label.clone();
        }
        let label = format!("STR_{}", self.str_count);
        self.str_count += 1;
        self.str_pool.insert(text.to_string(), label.clone());
        label
    }

    fn emit_data(&self) -> Vec<String> {
        if self.str_pool.is_empty() {
            return Vec::new();
        }
        let mut out = vec![".data".to_string()];
        for (text, label) in &self.str_pool {
            // escapes arrived assembler-native in the TAC literal
            out.push(format!("{}: .asciiz \"{}\"", label, text));
        }
        out
    }

    /// Apply an eviction from the allocator: store the old value before
    /// the register is reused, and forget its materialization.
    fn take(&mut self, grant: RegGrant) -> &'static str {
        if let Some(ev) = grant.evicted {
            self.lines
                .push(format!("  sw   {}, {}($fp)", grant.reg, ev.offset));
            self.loaded.remove(&ev.name);
        }
        grant.reg
    }

    fn reg_for(&mut self, name: &str, for_write: bool) -> &'static str {
        let grant = self.regs.get(name, for_write);
        let reg = self.take(grant);
        if for_write {
            // a full overwrite makes any spilled copy stale
            self.loaded.insert(name.to_string());
        }
        reg
    }

    fn temp_reg(&mut self) -> &'static str {
        let grant = self.regs.temp_acquire();
        self.take(grant)
    }

    fn release_if_temp(&mut self, reg: &str) {
        if reg.starts_with("$t") {
            self.regs.temp_release(reg);
        }
    }

    // ---- prologue / epilogue ----

    fn begin_function(&mut self, name: &str, local_bytes: usize, is_method: bool) {
        // mangle overloaded labels: name, name$1, name$2, ...
        let counter = self
            .func_seen
            .entry(name.to_string())
            .and_modify(|c| *c += 1)
            .or_insert(0);
        let mangled = if *counter == 0 {
            name.to_string()
        } else {
            format!("{}${}", name, counter)
        };
        self.func_mangle.insert(name.to_string(), mangled.clone());

        self.current_func = Some(mangled.clone());
        self.current_raw_name = Some(name.to_string());
        self.in_method_callee = is_method || name == "constructor";
        self.loaded.clear();
        self.pending_args.clear();
        self.stringish.clear();

        let spill_bytes = self.regs.start_function(self.spill_bytes_hint);
        let real_locals = local_bytes + spill_bytes;
        self.stack_size = Self::align8(real_locals + 8);

        self.emit(format!("\n# --- function {} ---", mangled));
        self.emit(".text");
        if name == self.entry {
            self.emit(format!(".globl {}", self.entry));
        }
        self.emit(format!("{}:", mangled));
        self.emit(format!("  addiu $sp, $sp, -{}", self.stack_size));
        self.emit(format!("  sw   $ra, {}($sp)", self.stack_size - 4));
        self.emit(format!("  sw   $fp, {}($sp)", self.stack_size - 8));
        self.emit("  addu $fp, $sp, $zero");
    }

    fn end_function(&mut self) {
        // a `return` already tore the function down; EndFunc is then a no-op
        let Some(_) = self.current_func.take() else {
            return;
        };
        if self.current_raw_name.as_deref() == Some(self.entry.as_str()) {
            // simulator exit replaces the entry epilogue
            self.emit("  li   $v0, 10");
            self.emit("  syscall");
        } else {
            self.emit(format!("  lw   $ra, {}($sp)", self.stack_size - 4));
            self.emit(format!("  lw   $fp, {}($sp)", self.stack_size - 8));
            self.emit(format!("  addiu $sp, $sp, {}", self.stack_size));
            self.emit("  jr   $ra");
            self.emit("  nop");
        }
        self.current_raw_name = None;
        self.in_method_callee = false;
        self.regs.end_function();
        self.pending_args.clear();
    }

    // ---- operand materialization ----

    fn imm(&mut self, value: &str) -> String {
        let r = self.temp_reg();
        self.emit(format!("  li   {}, {}", r, value));
        r.to_string()
    }

    fn is_int_literal(s: &str) -> bool {
        let digits = s.strip_prefix('-').unwrap_or(s);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    fn is_name(s: &str) -> bool {
        let mut chars = s.chars();
        chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
    }

    /// Materialize an operand token into a register. Priority order:
    /// quoted literal, `this`, booleans, integers, `obj.field`, named
    /// variable (with a lazy reload from its spill slot).
    fn mat(&mut self, x: &str) -> String {
        let s = x.trim();

        if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
            let label = self.str_label(&s[1..s.len() - 1]);
            let r = self.temp_reg();
            self.emit(format!("  la   {}, {}", r, label));
            return r.to_string();
        }

        if s == "this" {
            return "$a0".to_string();
        }

        if s == "true" {
            return self.imm("1");
        }
        if s == "false" {
            return self.imm("0");
        }
        if Self::is_int_literal(s) {
            return self.imm(s);
        }
        if s.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-') {
            // no floating-point selection; keep the integer part
            self.comment(&format!("float literal '{}' truncated", s));
            let int_part = s.split('.').next().unwrap_or("0");
            return self.imm(int_part);
        }

        if let Some((left, right)) = s.split_once('.')
            && Self::is_name(left)
            && Self::is_name(right)
        {
            let (base, base_is_temp) = if left == "this" {
                ("$a0".to_string(), false)
            } else {
                let b = self.mat(left);
                let is_temp = b.starts_with("$t");
                (b, is_temp)
            };
            let offset = match self.layouts.slot(right) {
                Some(slot) => slot.offset,
                None => {
                    self.comment(&format!("unknown field '{}', using offset 0", right));
                    0
                }
            };
            let r = self.temp_reg();
            self.emit(format!("  lw   {}, {}({})", r, offset, base));
            if base_is_temp {
                self.regs.temp_release(&base);
            }
            return r.to_string();
        }

        let reg = self.reg_for(s, false);
        self.ensure_loaded(s, reg);
        reg.to_string()
    }

    fn ensure_loaded(&mut self, name: &str, reg: &str) {
        if self.loaded.contains(name) {
            return;
        }
        if let Some(offset) = self.regs.spill_slot_offset(name) {
            self.emit(format!("  lw   {}, {}($fp)", reg, offset));
        }
        self.loaded.insert(name.to_string());
    }

    fn operand_is_stringish(&self, x: &str) -> bool {
        if x.len() >= 2 && x.starts_with('"') && x.ends_with('"') {
            return true;
        }
        if self.stringish.contains(x) {
            return true;
        }
        if let Some((_, field)) = x.split_once('.') {
            return self.layouts.slot(field).is_some_and(|s| s.is_string);
        }
        false
    }

    // ---- straight-line quads ----

    fn emit_label(&mut self, label: &str) {
        self.emit(format!("{}:", label));
    }

    fn emit_goto(&mut self, label: &str) {
        self.emit(format!("  b {}", label));
        self.emit("  nop");
    }

    fn emit_ifz(&mut self, src: &str, label: &str) {
        let r = self.mat(src);
        self.emit(format!("  beq  {}, $zero, {}", r, label));
        self.emit("  nop");
        self.release_if_temp(&r);
    }

    fn emit_assign(&mut self, dst: &str, src: &str) {
        let rs = self.mat(src);
        let rd = self.reg_for(dst, true);
        self.emit(format!("  addu {}, {}, $zero", rd, rs));
        self.release_if_temp(&rs);
        if self.operand_is_stringish(src) {
            self.stringish.insert(dst.to_string());
        }
    }

    fn emit_cmp(&mut self, op: BinKind, rd: &str, ra: &str, rb: &str) {
        match op {
            BinKind::Eq => {
                self.emit(format!("  xor  {}, {}, {}", rd, ra, rb));
                self.emit(format!("  sltiu {}, {}, 1", rd, rd));
            }
            BinKind::Ne => {
                self.emit(format!("  xor  {}, {}, {}", rd, ra, rb));
                self.emit(format!("  sltu {}, $zero, {}", rd, rd));
            }
            BinKind::Lt => self.emit(format!("  slt  {}, {}, {}", rd, ra, rb)),
            BinKind::Le => {
                self.emit(format!("  slt  {}, {}, {}", rd, rb, ra));
                self.emit(format!("  xori {}, {}, 1", rd, rd));
            }
            BinKind::Gt => self.emit(format!("  slt  {}, {}, {}", rd, rb, ra)),
            BinKind::Ge => {
                self.emit(format!("  slt  {}, {}, {}", rd, ra, rb));
                self.emit(format!("  xori {}, {}, 1", rd, rd));
            }
            _ => {}
        }
    }

    fn emit_binary(&mut self, op: BinKind, dst: &str, a: &str, b: &str) {
        // string concatenation lowers to the runtime helper
        if op == BinKind::Add && (self.operand_is_stringish(a) || self.operand_is_stringish(b)) {
            self.emit_param(None, a);
            self.emit_param(None, b);
            self.emit_call(Some(dst), "__strcat_new", 2);
            self.stringish.insert(dst.to_string());
            return;
        }

        let ra = self.mat(a);
        let rb = self.mat(b);
        let rd = self.reg_for(dst, true);
        match op {
            BinKind::Add => self.emit(format!("  addu {}, {}, {}", rd, ra, rb)),
            BinKind::Sub => self.emit(format!("  subu {}, {}, {}", rd, ra, rb)),
            BinKind::Mul => self.emit(format!("  mul  {}, {}, {}", rd, ra, rb)),
            BinKind::Div => {
                self.emit(format!("  div  {}, {}", ra, rb));
                self.emit(format!("  mflo {}", rd));
            }
            BinKind::Mod => {
                self.emit(format!("  div  {}, {}", ra, rb));
                self.emit(format!("  mfhi {}", rd));
            }
            cmp => {
                let rd = rd.to_string();
                self.emit_cmp(cmp, &rd, &ra, &rb);
            }
        }
        self.release_if_temp(&ra);
        self.release_if_temp(&rb);
    }

    fn emit_return(&mut self, src: Option<&str>) {
        if let Some(src) = src {
            let r = self.mat(src);
            self.emit(format!("  addu $v0, {}, $zero", r));
            self.release_if_temp(&r);
        }
        self.end_function();
    }

    // ---- calls ----

    fn caller_save_push(&mut self) {
        self.emit("  addiu $sp, $sp, -40");
        for i in 0..10 {
            self.emit(format!("  sw   $t{}, {}($sp)", i, i * 4));
        }
    }

    fn caller_save_pop(&mut self) {
        for i in 0..10 {
            self.emit(format!("  lw   $t{}, {}($sp)", i, i * 4));
        }
        self.emit("  addiu $sp, $sp, 40");
    }

    /// Freeze an argument value into its own temporary so later `Param`
    /// evaluations cannot clobber it. The register is held until after
    /// the `jal`.
    fn emit_param(&mut self, index: Option<usize>, src: &str) {
        let index = index.unwrap_or(self.pending_args.len());
        let value = self.mat(src);
        let frozen = self.temp_reg();
        self.emit(format!("  addu {}, {}, $zero", frozen, value));
        self.release_if_temp(&value);
        self.pending_args.push((index, frozen));
    }

    /// For `method <name>` targets: the last pending `Param` is the
    /// receiver and moves to slot 0 (`$a0`); the rest renumber from 1.
    /// Returns the bare function name.
    fn maybe_reorder_for_method(&mut self, func: &str) -> String {
        let Some(real) = func.strip_prefix("method ") else {
            return func.to_string();
        };
        if let Some((_, receiver)) = self.pending_args.pop() {
            let others = std::mem::take(&mut self.pending_args);
            self.pending_args.push((0, receiver));
            for (k, (_, reg)) in others.into_iter().enumerate() {
                self.pending_args.push((k + 1, reg));
            }
        }
        real.trim().to_string()
    }

    fn emit_call(&mut self, dst: Option<&str>, func: &str, argc: usize) {
        let _ = argc; // the pending list is authoritative

        let target = self.maybe_reorder_for_method(func);
        if target == "printInteger" {
            self.emit_print_integer(dst);
            return;
        }
        let redirected = match target.as_str() {
            "toString" => "__int_to_str".to_string(),
            "printString" => "print_str".to_string(),
            _ => target,
        };

        self.caller_save_push();

        let mut args = self.pending_args.clone();
        args.sort_by_key(|&(idx, _)| idx);
        let (a_regs, extras): (Vec<_>, Vec<_>) = args.into_iter().partition(|&(idx, _)| idx <= 3);

        // extras beyond the fourth slot ride on the caller's stack
        let extra_size = 4 * extras.len();
        if extra_size > 0 {
            self.emit(format!("  addiu $sp, $sp, -{}", extra_size));
            for (k, (_, reg)) in extras.iter().enumerate() {
                self.emit(format!("  sw   {}, {}($sp)", reg, k * 4));
            }
        }
        for &(idx, reg) in &a_regs {
            self.emit(format!("  addu $a{}, {}, $zero", idx, reg));
        }

        let mangled = self
            .func_mangle
            .get(&redirected)
            .cloned()
            .unwrap_or(redirected.clone());
        self.emit(format!("  jal {}", mangled));
        self.emit("  nop");

        if extra_size > 0 {
            self.emit(format!("  addiu $sp, $sp, {}", extra_size));
        }
        self.caller_save_pop();

        for (_, reg) in a_regs.iter().chain(extras.iter()) {
            self.regs.temp_release(reg);
        }

        if let Some(dst) = dst {
            let rd = self.reg_for(dst, true);
            self.emit(format!("  addu {}, $v0, $zero", rd));
            if matches!(redirected.as_str(), "__int_to_str" | "__strcat_new") {
                self.stringish.insert(dst.to_string());
            }
        }
        self.pending_args.clear();
    }

    /// `printInteger(x)` expands inline: stringify, print, and keep the
    /// original integer as the expression value.
    fn emit_print_integer(&mut self, dst: Option<&str>) {
        self.caller_save_push();
        let arg = self.pending_args.first().map(|&(_, reg)| reg);
        if let Some(arg) = arg {
            self.emit(format!("  addu $a0, {}, $zero", arg));
        }
        self.emit("  jal __int_to_str");
        self.emit("  nop");
        self.emit("  addu $a0, $v0, $zero");
        self.emit("  jal print_str");
        self.emit("  nop");
        self.caller_save_pop();

        // the frozen argument was restored by the pop above
        if let (Some(dst), Some(arg)) = (dst, arg) {
            let rd = self.reg_for(dst, true);
            self.emit(format!("  addu {}, {}, $zero", rd, arg));
        }
        for (_, reg) in std::mem::take(&mut self.pending_args) {
            self.regs.temp_release(reg);
        }
    }

    // ---- parameters, properties, allocation ----

    fn emit_loadparam(&mut self, dst: &str, index: usize) {
        if dst == "this" {
            // the receiver reorder parked it in $a0
            let rd = self.reg_for("this", true);
            self.emit(format!("  addu {}, $a0, $zero", rd));
            return;
        }
        // in a method body slot 0 is the receiver, so formals shift by one
        let adjusted = index + usize::from(self.in_method_callee);
        let rd = self.reg_for(dst, true);
        if adjusted <= 3 {
            self.emit(format!("  addu {}, $a{}, $zero", rd, adjusted));
        } else {
            let offset = self.stack_size + 4 * (adjusted - 4);
            self.emit(format!("  lw   {}, {}($fp)", rd, offset));
        }
    }

    fn emit_getprop(&mut self, dst: &str, obj: &str, field: &str) {
        let (base, base_is_temp) = if obj == "this" {
            ("$a0".to_string(), false)
        } else {
            let b = self.mat(obj);
            let is_temp = b.starts_with("$t");
            (b, is_temp)
        };
        let slot = self.layouts.slot(field);
        let offset = match slot {
            Some(slot) => slot.offset,
            None => {
                self.comment(&format!("unknown field '{}', using offset 0", field));
                0
            }
        };
        let rd = self.reg_for(dst, true);
        self.emit(format!("  lw   {}, {}({})", rd, offset, base));
        if base_is_temp {
            self.regs.temp_release(&base);
        }
        if slot.is_some_and(|s| s.is_string) {
            self.stringish.insert(dst.to_string());
        }
    }

    fn emit_setprop(&mut self, obj: &str, field: &str, src: &str) {
        let (base, base_is_temp) = if obj == "this" {
            ("$a0".to_string(), false)
        } else {
            let b = self.mat(obj);
            let is_temp = b.starts_with("$t");
            (b, is_temp)
        };
        let rsrc = self.mat(src);
        let offset = match self.layouts.slot(field) {
            Some(slot) => slot.offset,
            None => {
                self.comment(&format!("unknown field '{}', using offset 0", field));
                0
            }
        };
        self.emit(format!("  sw   {}, {}({})", rsrc, offset, base));
        if base_is_temp {
            self.regs.temp_release(&base);
        }
        self.release_if_temp(&rsrc);
    }

    /// Heap allocation via the simulator syscall (`$v0 = 9`). `$a0` is
    /// preserved around the syscall since it may hold the receiver.
    fn emit_new(&mut self, dst: &str, class: &str) {
        let size = match self.layouts.object_size(class) {
            Some(size) => size,
            None => {
                self.comment(&format!("unknown class '{}', using size 4", class));
                4
            }
        };
        self.emit("  addiu $sp, $sp, -4");
        self.emit("  sw   $a0, 0($sp)");
        self.emit("  li   $v0, 9");
        self.emit(format!("  li   $a0, {}", size));
        self.emit("  syscall");
        self.emit("  lw   $a0, 0($sp)");
        self.emit("  addiu $sp, $sp, 4");
        let rd = self.reg_for(dst, true);
        self.emit(format!("  addu {}, $v0, $zero", rd));
    }

    // ---- driver ----

    /// Translate a quad sequence. Methods are recognized by their
    /// `this = LoadParam` prologue (or the `constructor` name) so formal
    /// indices can account for the receiver slot.
    pub fn from_quads(&mut self, quads: &[Quad]) {
        for (i, quad) in quads.iter().enumerate() {
            match quad {
                Quad::BeginFunc { name, local_bytes } => {
                    let is_method = quads[i + 1..]
                        .iter()
                        .take_while(|q| !matches!(q, Quad::EndFunc))
                        .any(|q| matches!(q, Quad::LoadParam { dst, .. } if dst == "this"));
                    self.begin_function(name, *local_bytes, is_method);
                }
                Quad::EndFunc => self.end_function(),
                Quad::ActivationRecord { name } => {
                    self.comment(&format!("ActivationRecord {}", name));
                }
                Quad::Label(l) => self.emit_label(l),
                Quad::Goto(l) => self.emit_goto(l),
                Quad::IfZ { src, label } => self.emit_ifz(src, label),
                Quad::Assign { dst, src } => self.emit_assign(dst, src),
                Quad::Bin { op, dst, a, b } => self.emit_binary(*op, dst, a, b),
                Quad::Return { src } => self.emit_return(src.as_deref()),
                Quad::Param { index, src } => self.emit_param(*index, src),
                Quad::Call { dst, func, argc } => self.emit_call(dst.as_deref(), func, *argc),
                Quad::LoadParam { dst, index } => self.emit_loadparam(dst, *index),
                Quad::GetProp { dst, obj, field } => self.emit_getprop(dst, obj, field),
                Quad::SetProp { obj, field, src } => self.emit_setprop(obj, field, src),
                Quad::New { dst, class } => self.emit_new(dst, class),
                Quad::Raw(text) => {
                    if text.starts_with('#') {
                        self.emit(text.clone());
                    } else {
                        self.comment(text);
                    }
                }
            }
        }
    }

    /// Final text: the string pool's `.data` section, then `.text`
    pub fn build(&self) -> String {
        let mut out = self.emit_data();
        if !self.lines.iter().any(|l| l.trim().starts_with(".text")) {
            out.push(".text".to_string());
        }
        out.extend(self.lines.iter().cloned());
        out.join("\n")
    }
}
