//! Per-class field layouts for the MIPS backend
//!
//! Layouts are computed from the semantic pass's class records: base-class
//! fields first, then own fields in declaration order, 4 bytes per field.
//! Each slot remembers whether it holds a string pointer, which feeds the
//! emitter's stringish tracking for concatenation lowering.
//!
//! The flat name-to-slot table exists because TAC operands name objects,
//! not classes (`getprop p, nombre`); when two classes declare the same
//! field name at different offsets, the first declaration wins. A small
//! demo table backs hand-fed TAC text compiled without a semantic pass.

use crate::types::{ClassRegistry, Type};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// Byte offset within the object
    pub offset: u32,
    /// True when the field holds a string pointer
    pub is_string: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FieldLayouts {
    /// field name -> slot, merged across all classes (first wins)
    flat: IndexMap<String, FieldSlot>,
    /// class name -> object size in bytes
    sizes: IndexMap<String, u32>,
}

impl FieldLayouts {
    /// Compute layouts from the class registry
    pub fn from_classes(classes: &ClassRegistry) -> Self {
        let mut layouts = FieldLayouts::default();
        for info in classes.iter() {
            let slots = classes.field_slots(&info.name);
            layouts
                .sizes
                .insert(info.name.clone(), (slots.len() as u32) * 4);
            for (i, (field, ty)) in slots.iter().enumerate() {
                layouts.flat.entry(field.clone()).or_insert(FieldSlot {
                    offset: (i as u32) * 4,
                    is_string: *ty == Type::Str,
                });
            }
        }
        layouts
    }

    /// The demo fallback used when TAC text arrives without class records
    pub fn demo() -> Self {
        let mut layouts = FieldLayouts::default();
        for (name, offset, is_string) in [
            ("nombre", 0, true),
            ("edad", 4, false),
            ("color", 8, true),
            ("grado", 12, false),
        ] {
            layouts
                .flat
                .insert(name.to_string(), FieldSlot { offset, is_string });
        }
        layouts
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn slot(&self, field: &str) -> Option<FieldSlot> {
        self.flat.get(field).copied()
    }

    pub fn is_field(&self, name: &str) -> bool {
        self.flat.contains_key(name)
    }

    /// Heap size for `new <class>`; a class with no fields still occupies
    /// one word so the allocation returns a distinct pointer.
    pub fn object_size(&self, class: &str) -> Option<u32> {
        self.sizes.get(class).map(|&s| s.max(4))
    }
}
