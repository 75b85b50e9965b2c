//! Compile-time constant substitution ("defines")
//!
//! A define maps a dotted identifier path such as `process.env.NODE_ENV` to a
//! replacement. The replacement is either another identifier (looked up in
//! the scope where the substitution happens) or a JSON atom: `null`, a
//! boolean, a string or a number.
//!
//! This module validates the caller's raw entries; the compiled table lives
//! in [`crate::engine::defines`].

use super::validate::is_identifier;
use crate::logging::Log;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use crate::engine::defines::{
    DefineValue, DotDefine, Expr, FindSymbol, ProcessedDefines, SymbolRef,
};

/// Words that can't be used as an identifier replacement
const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with",
];

fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

/// Classify a define's replacement text
fn parse_define_value(value: &str) -> Option<DefineValue> {
    if is_identifier(value) && !is_keyword(value) {
        return Some(DefineValue::Identifier(value.to_string()));
    }

    match serde_json::from_str::<serde_json::Value>(value).ok()? {
        serde_json::Value::Null => Some(DefineValue::Null),
        serde_json::Value::Bool(b) => Some(DefineValue::Boolean(b)),
        serde_json::Value::String(s) => Some(DefineValue::String(s)),
        serde_json::Value::Number(n) => n.as_f64().map(DefineValue::Number),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}

/// Compile the caller's defines.
///
/// An empty map yields `None`, which tells the parser to skip substitution
/// entirely. Invalid entries are reported and left out; the rest are kept.
pub fn validate_defines(
    log: &Log,
    defines: &BTreeMap<String, String>,
) -> Option<Arc<ProcessedDefines>> {
    if defines.is_empty() {
        return None;
    }

    let mut raw = Vec::with_capacity(defines.len());
    for (key, value) in defines {
        if !key.split('.').all(is_identifier) {
            log.add_error(format!("Invalid define key: {:?}", key));
            continue;
        }

        match parse_define_value(value) {
            Some(define) => raw.push((key.clone(), define)),
            None => log.add_error(format!("Invalid define value: {:?}", value)),
        }
    }

    Some(Arc::new(ProcessedDefines::new(raw)))
}
