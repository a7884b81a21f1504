use std::fmt;
use std::str::FromStr;

use ms_core::ModScriptError;
use ms_parser::Grammar;
use ms_runtime::{
    signature_table, FunctionProxy, FunctionSignature, InterpreterContext, ModScriptEngineOptions,
};

/// Extension state of the context a dialect's proxy works with.
pub type DialectContext<D> =
    InterpreterContext<<<D as Dialect>::Proxy as FunctionProxy>::Extension>;

/// Everything that makes one game's scripts differ from another's.
///
/// Lexer, parser and engine stay generic; a new game only supplies a grammar
/// configuration, a proxy (whose `Function` enum is its function table) and
/// the starting context with its extension state.
pub trait Dialect {
    type Proxy: FunctionProxy;

    fn id(&self) -> &'static str;

    fn grammar(&self) -> Grammar;

    fn engine_options(&self) -> ModScriptEngineOptions {
        ModScriptEngineOptions::default()
    }

    fn create_context(&self) -> DialectContext<Self>;

    fn functions(&self) -> Vec<FunctionSignature> {
        signature_table::<<Self::Proxy as FunctionProxy>::Function>()
    }
}

/// Dialects known to the command-line front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectId {
    StateOfDecay,
}

impl DialectId {
    pub const ALL: &'static [DialectId] = &[DialectId::StateOfDecay];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StateOfDecay => "state-of-decay",
        }
    }
}

impl fmt::Display for DialectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectId {
    type Err = ModScriptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                let known = Self::ALL
                    .iter()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                ModScriptError::usage(
                    "DIALECT_UNKNOWN",
                    format!("Unknown dialect \"{}\". Known dialects: {}.", value, known),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_ids_parse_case_insensitively() {
        assert_eq!(
            "State-Of-Decay".parse::<DialectId>(),
            Ok(DialectId::StateOfDecay)
        );
        let error = "skyrim".parse::<DialectId>().expect_err("unknown dialect");
        assert_eq!(error.code, "DIALECT_UNKNOWN");
        assert!(error.message.contains("state-of-decay"));
    }
}
