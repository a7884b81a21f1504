pub mod bind;
pub mod context;
pub mod engine;
pub mod proxy;

#[cfg(test)]
mod test_support;

pub use bind::bind_script;
pub use context::{normalize_path, InterpreterContext, ScopeFrame, ScopeKind};
pub use engine::{
    apply_binary, execute, AbortHandle, ModScriptEngine, ModScriptEngineOptions, PromptReply,
    DEFAULT_MAX_STEPS,
};
pub use proxy::{
    resolve_function, signature_table, FailurePolicy, FunctionKind, FunctionProxy, FunctionSet,
    FunctionSignature, HostFailure, Param,
};
