//! Compiled define table consulted while parsing
//!
//! Compiling the table is comparatively expensive and it is consulted for
//! every parsed module, so it is built once per invocation and shared behind
//! an `Arc`. It holds no mutable state and is safe to read from parallel
//! parses.

use std::collections::HashMap;

/// Reference to a symbol in the scope being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    pub source_index: u32,
    pub inner_index: u32,
}

/// Looks up a name in the current scope on behalf of a define
pub trait FindSymbol {
    fn find_symbol(&self, name: &str) -> SymbolRef;
}

impl<F> FindSymbol for F
where
    F: Fn(&str) -> SymbolRef,
{
    fn find_symbol(&self, name: &str) -> SymbolRef {
        self(name)
    }
}

/// Expression spliced in place of a defined name
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(SymbolRef),
    Null,
    Boolean(bool),
    String(String),
    Number(f64),
}

/// What a define expands to, before it is bound to a scope
#[derive(Debug, Clone, PartialEq)]
pub enum DefineValue {
    /// Reference to another identifier, resolved where it is substituted
    Identifier(String),
    Null,
    Boolean(bool),
    String(String),
    Number(f64),
}

impl DefineValue {
    /// Build the replacement expression for one occurrence
    pub fn to_expr(&self, find_symbol: &dyn FindSymbol) -> Expr {
        match self {
            DefineValue::Identifier(name) => Expr::Identifier(find_symbol.find_symbol(name)),
            DefineValue::Null => Expr::Null,
            DefineValue::Boolean(value) => Expr::Boolean(*value),
            DefineValue::String(value) => Expr::String(value.clone()),
            DefineValue::Number(value) => Expr::Number(*value),
        }
    }
}

/// A define on a member expression like `process.env.NODE_ENV`
#[derive(Debug, Clone, PartialEq)]
pub struct DotDefine {
    pub parts: Vec<String>,
    pub value: DefineValue,
}

/// Defines grouped for fast lookup while parsing.
///
/// Single identifiers are keyed directly. Dotted paths are keyed by their
/// last part, which is what the parser sees first when it finishes a member
/// expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedDefines {
    pub identifier_defines: HashMap<String, DefineValue>,
    pub dot_defines: HashMap<String, Vec<DotDefine>>,
}

impl ProcessedDefines {
    pub fn new(raw: impl IntoIterator<Item = (String, DefineValue)>) -> Self {
        let mut processed = Self::default();
        for (key, value) in raw {
            let mut parts: Vec<String> = key.split('.').map(str::to_string).collect();
            if parts.len() == 1 {
                processed
                    .identifier_defines
                    .insert(parts.swap_remove(0), value);
                continue;
            }

            let tail = parts.last().cloned().unwrap_or_default();
            let entries = processed.dot_defines.entry(tail).or_default();
            match entries.iter_mut().find(|define| define.parts == parts) {
                Some(existing) => existing.value = value,
                None => entries.push(DotDefine { parts, value }),
            }
        }
        processed
    }

    /// Find the define for a full identifier path
    pub fn lookup(&self, parts: &[&str]) -> Option<&DefineValue> {
        match parts {
            [] => None,
            [name] => self.identifier_defines.get(*name),
            [.., tail] => self.dot_defines.get(*tail)?.iter().find_map(|define| {
                let matches = define.parts.len() == parts.len()
                    && define.parts.iter().zip(parts).all(|(a, b)| a == b);
                matches.then_some(&define.value)
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.identifier_defines.len() + self.dot_defines.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
