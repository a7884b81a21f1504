mod boundary;
mod eval;
mod frame_stack;
mod lifecycle;
mod step;


pub use eval::apply_binary;
pub use lifecycle::{
    execute, AbortHandle, ModScriptEngine, ModScriptEngineOptions, PromptReply, DEFAULT_MAX_STEPS,
};
