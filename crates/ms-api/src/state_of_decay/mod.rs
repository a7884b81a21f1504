//! Reference dialect: install scripts shipped with State of Decay mods.

mod context;
mod functions;
mod proxy;

pub use context::{apply_pending_ini_edits, IniEdit, SodContextState};
pub use functions::SodFunction;
pub use proxy::SodFunctionProxy;

use ms_parser::{Grammar, GrammarVersion};
use ms_runtime::{InterpreterContext, ModScriptEngineOptions};

use crate::dialect::{Dialect, DialectContext};
use crate::host::InstallHost;

#[derive(Debug, Clone, Copy, Default)]
pub struct StateOfDecay;

impl StateOfDecay {
    pub fn proxy(&self, host: Box<dyn InstallHost + Send>) -> SodFunctionProxy {
        SodFunctionProxy::new(host)
    }
}

impl Dialect for StateOfDecay {
    type Proxy = SodFunctionProxy;

    fn id(&self) -> &'static str {
        "state-of-decay"
    }

    fn grammar(&self) -> Grammar {
        Grammar {
            version: GrammarVersion::V2,
            case_insensitive_keywords: true,
            retain_comments: true,
        }
    }

    fn engine_options(&self) -> ModScriptEngineOptions {
        ModScriptEngineOptions::default()
    }

    fn create_context(&self) -> DialectContext<Self> {
        InterpreterContext::new(true, SodContextState::default())
    }
}
