//! Hierarchical symbol table
//!
//! Scopes form a tree owned by an arena (`Vec<Scope>` plus parent indices),
//! avoiding reference-counted back-pointers. Frame offsets are assigned
//! sequentially at insertion time: parameters from 0 upward in their own
//! counter, locals likewise. The concrete byte offset (`(offset+1)*4`,
//! positive for parameters, negative for locals) is a concern of the
//! emitter, not of storage.

use crate::types::Type;
use serde::Serialize;
use std::collections::HashMap;

/// A named, typed entry in a scope
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
    pub line: Option<usize>,
    pub col: Option<usize>,
    /// Sequential slot index within the role counter (param or local)
    pub offset: usize,
    pub is_param: bool,
}

/// Index of a scope in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug)]
pub struct Scope {
    pub label: String,
    pub level: usize,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Symbols in insertion order, keyed by their stored (possibly renamed) name
    pub symbols: indexmap::IndexMap<String, Symbol>,
    /// Same-scope redeclarations: original name -> most recent stored name
    rebound: HashMap<String, String>,
    next_local: usize,
    next_param: usize,
}

impl Scope {
    fn new(label: String, level: usize, parent: Option<ScopeId>) -> Self {
        Scope {
            label,
            level,
            parent,
            children: Vec::new(),
            symbols: indexmap::IndexMap::new(),
            rebound: HashMap::new(),
            next_local: 0,
            next_param: 0,
        }
    }
}

/// JSON shape of one scope, matching the IDE export format
#[derive(Debug, Serialize)]
struct ScopeNode {
    scope: String,
    level: usize,
    symbols: Vec<SymbolNode>,
    children: Vec<ScopeNode>,
}

#[derive(Debug, Serialize)]
struct SymbolNode {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(rename = "const")]
    is_const: bool,
    line: Option<usize>,
    col: Option<usize>,
    offset: usize,
    is_param: bool,
}

/// The scope arena. The root scope is `global` at level 0.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope::new("global".to_string(), 0, None)],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Push a child scope and return its id
    pub fn push(&mut self, parent: ScopeId, label: impl Into<String>) -> ScopeId {
        let level = self.scopes[parent.0].level + 1;
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(label.into(), level, Some(parent)));
        self.scopes[parent.0].children.push(id);
        id
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes[id.0].parent
    }

    /// Insert a symbol, assigning the next slot in the role counter.
    ///
    /// A same-scope redeclaration is silently renamed to `<name>_local`,
    /// `<name>_local2`, ...; the returned string is the stored name, and
    /// later lookups of the original name in this scope resolve to the
    /// most recent binding.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &mut self,
        id: ScopeId,
        name: &str,
        ty: Type,
        is_const: bool,
        line: Option<usize>,
        col: Option<usize>,
        is_param: bool,
    ) -> String {
        let scope = &mut self.scopes[id.0];
        let stored = if scope.symbols.contains_key(name) {
            let mut n = 1usize;
            loop {
                let candidate = if n == 1 {
                    format!("{}_local", name)
                } else {
                    format!("{}_local{}", name, n)
                };
                if !scope.symbols.contains_key(&candidate) {
                    scope.rebound.insert(name.to_string(), candidate.clone());
                    break candidate;
                }
                n += 1;
            }
        } else {
            name.to_string()
        };

        let offset = if is_param {
            let o = scope.next_param;
            scope.next_param += 1;
            o
        } else {
            let o = scope.next_local;
            scope.next_local += 1;
            o
        };
        scope.symbols.insert(
            stored.clone(),
            Symbol {
                name: stored.clone(),
                ty,
                is_const,
                line,
                col,
                offset,
                is_param,
            },
        );
        stored
    }

    /// Resolve a name, walking the parent chain.
    ///
    /// Within each scope the redeclaration map is consulted first, so a
    /// renamed binding shadows the original for subsequent reads.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            let key = scope.rebound.get(name).map(String::as_str).unwrap_or(name);
            if let Some(sym) = scope.symbols.get(key) {
                return Some(sym);
            }
            current = scope.parent;
        }
        None
    }

    /// Resolve a name in one scope only (no parent walk)
    pub fn lookup_local(&self, id: ScopeId, name: &str) -> Option<&Symbol> {
        let scope = &self.scopes[id.0];
        let key = scope.rebound.get(name).map(String::as_str).unwrap_or(name);
        scope.symbols.get(key)
    }

    /// Number of locals declared directly in a scope
    pub fn local_count(&self, id: ScopeId) -> usize {
        self.scopes[id.0].next_local
    }

    /// Export the whole tree as JSON, mirroring the IDE symbol panel shape
    pub fn to_json(&self) -> serde_json::Value {
        fn build(tree: &ScopeTree, id: ScopeId) -> ScopeNode {
            let scope = tree.scope(id);
            ScopeNode {
                scope: scope.label.clone(),
                level: scope.level,
                symbols: scope
                    .symbols
                    .values()
                    .map(|s| SymbolNode {
                        name: s.name.clone(),
                        ty: s.ty.to_string(),
                        is_const: s.is_const,
                        line: s.line,
                        col: s.col,
                        offset: s.offset,
                        is_param: s.is_param,
                    })
                    .collect(),
                children: scope.children.iter().map(|&c| build(tree, c)).collect(),
            }
        }
        serde_json::to_value(build(self, self.root())).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_per_role() {
        let mut tree = ScopeTree::new();
        let f = tree.push(tree.root(), "func:test");
        tree.insert(f, "a", Type::Int, false, Some(1), Some(0), true);
        tree.insert(f, "b", Type::Int, false, Some(1), Some(5), true);
        tree.insert(f, "x", Type::Int, false, Some(2), Some(0), false);
        tree.insert(f, "y", Type::Int, false, Some(3), Some(0), false);

        assert_eq!(tree.lookup(f, "a").unwrap().offset, 0);
        assert_eq!(tree.lookup(f, "b").unwrap().offset, 1);
        assert_eq!(tree.lookup(f, "x").unwrap().offset, 0);
        assert_eq!(tree.lookup(f, "y").unwrap().offset, 1);
        assert!(tree.lookup(f, "a").unwrap().is_param);
        assert!(!tree.lookup(f, "x").unwrap().is_param);
    }

    #[test]
    fn test_lookup_walks_parents() {
        let mut tree = ScopeTree::new();
        tree.insert(tree.root(), "g", Type::Str, false, None, None, false);
        let f = tree.push(tree.root(), "func:f");
        let b = tree.push(f, "block@3");
        assert_eq!(tree.lookup(b, "g").unwrap().ty, Type::Str);
        assert!(tree.lookup(b, "missing").is_none());
    }

    #[test]
    fn test_redeclaration_silent_rename() {
        let mut tree = ScopeTree::new();
        let f = tree.push(tree.root(), "func:f");
        let first = tree.insert(f, "x", Type::Int, false, None, None, false);
        let second = tree.insert(f, "x", Type::Str, false, None, None, false);
        let third = tree.insert(f, "x", Type::Bool, false, None, None, false);

        assert_eq!(first, "x");
        assert_eq!(second, "x_local");
        assert_eq!(third, "x_local2");
        // reads after the redeclaration see the latest binding
        assert_eq!(tree.lookup(f, "x").unwrap().ty, Type::Bool);
    }

    #[test]
    fn test_levels() {
        let mut tree = ScopeTree::new();
        let c = tree.push(tree.root(), "class:Persona");
        let m = tree.push(c, "func:saludar");
        assert_eq!(tree.scope(tree.root()).level, 0);
        assert_eq!(tree.scope(c).level, 1);
        assert_eq!(tree.scope(m).level, 2);
    }

    #[test]
    fn test_json_export_shape() {
        let mut tree = ScopeTree::new();
        tree.insert(tree.root(), "main", Type::function(Type::Void, vec![]), false, Some(1), Some(0), false);
        let v = tree.to_json();
        assert_eq!(v["scope"], "global");
        assert_eq!(v["level"], 0);
        assert_eq!(v["symbols"][0]["name"], "main");
        assert_eq!(v["symbols"][0]["type"], "fn() -> void");
    }
}
