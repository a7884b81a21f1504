use std::fmt::Debug;

use ms_core::{MsValue, PromptKind, ValueType};

use crate::context::InterpreterContext;

/// What a failed call does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run; no further calls are issued.
    Fatal,
    /// Record a warning and continue with the return type's default value.
    Recoverable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Performed by the function proxy.
    Host,
    /// Answered by the user; the engine suspends instead of calling the proxy.
    Prompt(PromptKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: ValueType,
}

impl Param {
    pub const fn new(name: &'static str, ty: ValueType) -> Self {
        Self { name, ty }
    }
}

/// One row of a dialect's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub params: &'static [Param],
    /// Type of any extra trailing positional arguments.
    pub variadic: Option<ValueType>,
    /// `None` for functions that produce no value.
    pub returns: Option<ValueType>,
    pub kind: FunctionKind,
    pub on_failure: FailurePolicy,
}

impl FunctionSignature {
    pub fn describe_params(&self) -> String {
        let mut parts = self
            .params
            .iter()
            .map(|param| format!("{}: {}", param.name, param.ty.name()))
            .collect::<Vec<_>>();
        if let Some(variadic) = self.variadic {
            parts.push(format!("...{}", variadic.name()));
        }
        parts.join(", ")
    }
}

/// Closed catalog of the functions a dialect exposes. Implemented by a
/// fieldless enum whose `signature` is an exhaustive match, which keeps
/// the arity and fatal/recoverable table total and in one place.
pub trait FunctionSet: Copy + Debug + PartialEq + Send + Sync + 'static {
    fn all() -> &'static [Self];
    fn signature(self) -> FunctionSignature;

    fn name(self) -> &'static str {
        self.signature().name
    }
}

/// `None` is the "unknown function" outcome.
pub fn resolve_function<F: FunctionSet>(name: &str, case_insensitive: bool) -> Option<F> {
    F::all().iter().copied().find(|function| {
        let declared = function.name();
        if case_insensitive {
            declared.eq_ignore_ascii_case(name)
        } else {
            declared == name
        }
    })
}

pub fn signature_table<F: FunctionSet>() -> Vec<FunctionSignature> {
    F::all().iter().map(|function| function.signature()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostFailure {
    /// The operation failed; the signature's policy decides what happens next.
    Failed(String),
    /// The user cancelled while the host was working; always ends the run.
    Cancelled,
}

impl HostFailure {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Host operations a script can reach. Each run owns its own proxy.
pub trait FunctionProxy {
    type Function: FunctionSet;
    /// Dialect-specific state carried by the interpreter context.
    type Extension;

    /// Arguments arrive ordered by the signature and already type-checked.
    /// Prompt functions never reach this method.
    fn invoke(
        &mut self,
        function: Self::Function,
        args: &[MsValue],
        context: &mut InterpreterContext<Self::Extension>,
    ) -> Result<MsValue, HostFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECHO_PARAMS: &[Param] = &[Param::new("text", ValueType::String)];

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Tiny {
        Echo,
        Ask,
    }

    impl FunctionSet for Tiny {
        fn all() -> &'static [Self] {
            &[Tiny::Echo, Tiny::Ask]
        }

        fn signature(self) -> FunctionSignature {
            match self {
                Tiny::Echo => FunctionSignature {
                    name: "Echo",
                    params: ECHO_PARAMS,
                    variadic: Some(ValueType::Any),
                    returns: Some(ValueType::String),
                    kind: FunctionKind::Host,
                    on_failure: FailurePolicy::Recoverable,
                },
                Tiny::Ask => FunctionSignature {
                    name: "Ask",
                    params: &[],
                    variadic: None,
                    returns: Some(ValueType::Bool),
                    kind: FunctionKind::Prompt(PromptKind::YesNo),
                    on_failure: FailurePolicy::Fatal,
                },
            }
        }
    }

    #[test]
    fn resolution_respects_case_mode() {
        assert_eq!(resolve_function::<Tiny>("echo", true), Some(Tiny::Echo));
        assert_eq!(resolve_function::<Tiny>("echo", false), None);
        assert_eq!(resolve_function::<Tiny>("Echo", false), Some(Tiny::Echo));
        assert_eq!(resolve_function::<Tiny>("DoStuff", true), None);
    }

    #[test]
    fn signature_table_lists_every_function() {
        let table = signature_table::<Tiny>();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].describe_params(), "text: string, ...any");
        assert_eq!(table[1].describe_params(), "");
    }
}
