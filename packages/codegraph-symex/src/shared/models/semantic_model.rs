//! Semantic model consumed by the engine
//!
//! Symbols and methods are arena entries addressed by `SymbolId` / `MethodId`. Usage lists
//! (every instruction that reads or writes a symbol) are filled by one resolution pass,
//! `resolve_usages`, and are read-only afterwards.

use rustc_hash::{FxHashMap, FxHashSet};

use super::cfg::{ControlFlowGraph, Instruction};
use super::fold::{CfgFolder, SymbolSubstitution};
use super::ids::{BlockId, MethodId, SymbolId};
use super::signature::MethodSignature;
use crate::errors::Result;

/// Exception types a handler may catch when the thrown type is not resolved
pub const UNKNOWN_EXCEPTION_CATCHERS: &[&str] = &[
    "java.lang.Throwable",
    "java.lang.Exception",
    "java.lang.RuntimeException",
    "java.lang.Error",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Parameter,
    Local,
    Field,
}

/// Declared nullness of a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nullability {
    #[default]
    Unknown,
    Nullable,
    NonNull,
}

/// Identifier occurrence referencing a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Usage {
    pub method: MethodId,
    pub block: BlockId,
    pub index: usize,
    pub is_write: bool,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Fully qualified type or primitive keyword
    pub type_name: String,
    pub nullability: Nullability,
    usages: Vec<Usage>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: type_name.into(),
            nullability: Nullability::Unknown,
            usages: Vec::new(),
        }
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    pub fn usages(&self) -> &[Usage] {
        &self.usages
    }

    pub fn is_parameter(&self) -> bool {
        self.kind == SymbolKind::Parameter
    }
}

/// Dispatch properties that keep a method out of behavior computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodFlags {
    pub overridable: bool,
    pub native: bool,
    pub is_abstract: bool,
    pub varargs: bool,
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub signature: MethodSignature,
    pub parameters: Vec<SymbolId>,
    /// Declared checked exceptions
    pub declared_exceptions: Vec<String>,
    pub flags: MethodFlags,
    pub body: Option<ControlFlowGraph>,
}

impl MethodSymbol {
    pub fn new(signature: &str) -> Result<Self> {
        Ok(Self {
            signature: MethodSignature::parse(signature)?,
            parameters: Vec::new(),
            declared_exceptions: Vec::new(),
            flags: MethodFlags::default(),
            body: None,
        })
    }

    /// A behavior may be computed: a body exists and dispatch is static
    pub fn can_be_modeled(&self) -> bool {
        self.body.is_some()
            && !self.flags.overridable
            && !self.flags.native
            && !self.flags.is_abstract
    }
}

/// Symbol table, method table and type hierarchy of one analyzed file
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    symbols: Vec<Symbol>,
    methods: Vec<MethodSymbol>,
    by_signature: FxHashMap<String, MethodId>,
    supertypes: FxHashMap<String, Vec<String>>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model preloaded with the common `java.lang` exception hierarchy
    pub fn with_java_lang_exceptions() -> Self {
        let mut model = Self::new();
        for (sub, sup) in [
            ("java.lang.Exception", "java.lang.Throwable"),
            ("java.lang.Error", "java.lang.Throwable"),
            ("java.lang.RuntimeException", "java.lang.Exception"),
            ("java.io.IOException", "java.lang.Exception"),
            ("java.lang.NullPointerException", "java.lang.RuntimeException"),
            ("java.lang.IllegalArgumentException", "java.lang.RuntimeException"),
            ("java.lang.IllegalStateException", "java.lang.RuntimeException"),
            ("java.lang.ArithmeticException", "java.lang.RuntimeException"),
        ] {
            model.declare_supertype(sub, sup);
        }
        model
    }

    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::from_index(self.symbols.len());
        self.symbols.push(symbol);
        id
    }

    pub fn add_method(&mut self, method: MethodSymbol) -> MethodId {
        let id = MethodId::from_index(self.methods.len());
        self.by_signature
            .insert(method.signature.as_str().to_string(), id);
        self.methods.push(method);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.methods.get(id.index())
    }

    pub fn method_mut(&mut self, id: MethodId) -> Option<&mut MethodSymbol> {
        self.methods.get_mut(id.index())
    }

    pub fn method_by_signature(&self, signature: &str) -> Option<MethodId> {
        self.by_signature.get(signature).copied()
    }

    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &MethodSymbol)> {
        self.methods
            .iter()
            .enumerate()
            .map(|(i, m)| (MethodId::from_index(i), m))
    }

    pub fn declare_supertype(&mut self, sub: impl Into<String>, sup: impl Into<String>) {
        self.supertypes.entry(sub.into()).or_default().push(sup.into());
    }

    /// Reflexive, transitive subtyping over declared supertypes
    pub fn is_subtype_of(&self, sub: &str, sup: &str) -> bool {
        if sub == sup || sup == "java.lang.Object" {
            return true;
        }
        let mut seen = FxHashSet::default();
        let mut pending = vec![sub];
        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(current) {
                for parent in parents {
                    if parent == sup {
                        return true;
                    }
                    pending.push(parent);
                }
            }
        }
        false
    }

    /// Whether a handler for `caught` receives an exception of type `thrown`
    pub fn catches(&self, caught: &str, thrown: Option<&str>) -> bool {
        match thrown {
            Some(thrown) => self.is_subtype_of(thrown, caught),
            None => UNKNOWN_EXCEPTION_CATCHERS.contains(&caught),
        }
    }

    /// Append the symbols, methods and supertypes of `other`
    ///
    /// Symbols of `other` are renumbered after the existing ones and every body is folded
    /// onto the new handles. A method whose signature is already known shadows the old
    /// entry for lookups. Usage lists are rebuilt.
    pub fn merge(&mut self, other: SemanticModel) -> Vec<MethodId> {
        let offset = self.symbols.len();
        let mut substitution = SymbolSubstitution::new();
        for index in 0..other.symbols.len() {
            substitution = substitution.map(
                SymbolId::from_index(index),
                SymbolId::from_index(offset + index),
            );
        }
        self.symbols.extend(other.symbols);

        let mut added = Vec::with_capacity(other.methods.len());
        for mut method in other.methods {
            method.parameters = method
                .parameters
                .into_iter()
                .map(|p| substitution.fold_symbol(p))
                .collect();
            method.body = method.body.map(|body| substitution.fold_cfg(body));
            added.push(self.add_method(method));
        }
        for (sub, parents) in other.supertypes {
            for parent in parents {
                let known = self.supertypes.get(&sub).is_some_and(|p| p.contains(&parent));
                if !known {
                    self.declare_supertype(sub.clone(), parent);
                }
            }
        }
        self.resolve_usages();
        added
    }

    /// Populate every symbol's usage list from the method bodies
    pub fn resolve_usages(&mut self) {
        for symbol in &mut self.symbols {
            symbol.usages.clear();
        }

        let mut found = Vec::new();
        for (method_id, method) in self.methods.iter().enumerate() {
            let Some(body) = &method.body else { continue };
            for block in body.blocks() {
                for (index, instruction) in block.instructions.iter().enumerate() {
                    let (symbol, is_write) = match instruction {
                        Instruction::Load(s) => (*s, false),
                        Instruction::Store(s) => (*s, true),
                        _ => continue,
                    };
                    found.push((
                        symbol,
                        Usage {
                            method: MethodId::from_index(method_id),
                            block: block.id,
                            index,
                            is_write,
                        },
                    ));
                }
            }
        }

        for (symbol, usage) in found {
            if let Some(entry) = self.symbols.get_mut(symbol.index()) {
                entry.usages.push(usage);
            }
        }
    }
}
