use std::sync::Arc;

use ms_core::ast::Script;
use ms_core::ModScriptError;
use ms_parser::parse_script;
use ms_runtime::{bind_script, FunctionProxy, ModScriptEngine};

pub mod dialect;
pub mod host;
pub mod ini;
pub mod state_of_decay;

pub use dialect::{Dialect, DialectContext, DialectId};
pub use host::{DirectoryHost, InstallHost};
pub use ini::set_ini_value;

/// Lexes, parses and binds `source` for `dialect`. A script that comes back
/// from here can only fail at run time because of its data or its host.
pub fn compile_script<D: Dialect>(dialect: &D, source: &str) -> Result<Arc<Script>, ModScriptError> {
    let script = parse_script(source, &dialect.grammar())?;
    bind_script::<<D::Proxy as FunctionProxy>::Function>(
        &script,
        dialect.engine_options().case_insensitive_names,
    )?;
    tracing::debug!(dialect = dialect.id(), "compiled script");
    Ok(Arc::new(script))
}

/// Starts a run of `script` with a fresh dialect context.
pub fn create_engine<D: Dialect>(
    dialect: &D,
    script: Arc<Script>,
    proxy: D::Proxy,
) -> Result<ModScriptEngine<D::Proxy>, ModScriptError> {
    ModScriptEngine::new(
        script,
        proxy,
        dialect.create_context(),
        dialect.engine_options(),
    )
}
