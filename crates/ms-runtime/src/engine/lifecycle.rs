use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ms_core::ast::{Script, Statement};
use ms_core::{
    EngineOutput, ExecutionResult, ExecutionStatus, ModScriptError, MsValue, PendingPrompt,
    Truthiness,
};

use crate::bind::bind_script;
use crate::context::InterpreterContext;
use crate::proxy::FunctionProxy;

pub const DEFAULT_MAX_STEPS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModScriptEngineOptions {
    pub truthiness: Truthiness,
    /// Function and parameter names match regardless of ASCII case.
    pub case_insensitive_names: bool,
    /// Statements (including loop-guard checks) a run may execute.
    pub max_steps: usize,
}

impl Default for ModScriptEngineOptions {
    fn default() -> Self {
        Self {
            truthiness: Truthiness::Lenient,
            case_insensitive_names: true,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Cancels a run from any thread. Observed before the next statement.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptReply {
    Answer(MsValue),
    Cancel,
}

#[derive(Debug, Clone)]
pub(super) struct RuntimeFrame {
    pub(super) block: Arc<[Statement]>,
    pub(super) node_index: usize,
}

pub(super) enum Interrupt {
    /// A prompt is pending; the current statement is replayed once answered.
    Suspend,
    Cancelled,
    Error(ModScriptError),
}

impl From<ModScriptError> for Interrupt {
    fn from(error: ModScriptError) -> Self {
        Self::Error(error)
    }
}

/// Executes one bound script against one proxy and one context.
///
/// The engine is driven by [`next_output`](Self::next_output): it runs until
/// the script needs a user answer or finishes. Answers go in through
/// [`respond`](Self::respond). Nothing is shared between engines, so runs on
/// different threads never interfere.
pub struct ModScriptEngine<P: FunctionProxy> {
    pub(super) script: Arc<Script>,
    pub(super) proxy: P,
    pub(super) context: InterpreterContext<P::Extension>,
    pub(super) options: ModScriptEngineOptions,
    pub(super) frames: Vec<RuntimeFrame>,
    pub(super) pending_prompt: Option<PendingPrompt>,
    /// Call results of the statement being evaluated, replayed after a prompt.
    pub(super) journal: Vec<Option<MsValue>>,
    pub(super) journal_cursor: usize,
    pub(super) steps: usize,
    pub(super) abort: AbortHandle,
    pub(super) outcome: Option<ExecutionResult>,
}

impl<P: FunctionProxy> ModScriptEngine<P> {
    pub fn new(
        script: Arc<Script>,
        proxy: P,
        context: InterpreterContext<P::Extension>,
        options: ModScriptEngineOptions,
    ) -> Result<Self, ModScriptError> {
        if context.depth() != 0 {
            return Err(ModScriptError::usage(
                "ENGINE_CONTEXT_IN_USE",
                "Interpreter context must start with an empty scope stack.",
            ));
        }
        bind_script::<P::Function>(&script, options.case_insensitive_names)?;

        let root = RuntimeFrame {
            block: Arc::clone(&script.body.statements),
            node_index: 0,
        };
        Ok(Self {
            script,
            proxy,
            context,
            options,
            frames: vec![root],
            pending_prompt: None,
            journal: Vec::new(),
            journal_cursor: 0,
            steps: 0,
            abort: AbortHandle::default(),
            outcome: None,
        })
    }

    pub fn script(&self) -> &Arc<Script> {
        &self.script
    }

    pub fn options(&self) -> &ModScriptEngineOptions {
        &self.options
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn context(&self) -> &InterpreterContext<P::Extension> {
        &self.context
    }

    pub fn proxy(&self) -> &P {
        &self.proxy
    }

    /// Nested blocks currently entered; zero at top level.
    pub fn block_depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    pub fn pending_prompt(&self) -> Option<&PendingPrompt> {
        self.pending_prompt.as_ref()
    }

    pub fn outcome(&self) -> Option<&ExecutionResult> {
        self.outcome.as_ref()
    }

    pub fn into_parts(self) -> (P, InterpreterContext<P::Extension>) {
        (self.proxy, self.context)
    }

    /// Drives the run to its end, asking `responder` for every prompt.
    pub fn run_with<F>(&mut self, mut responder: F) -> ExecutionResult
    where
        F: FnMut(&PendingPrompt) -> PromptReply,
    {
        loop {
            match self.next_output() {
                EngineOutput::Finished { result } => return result,
                EngineOutput::Prompt { prompt } => match responder(&prompt) {
                    PromptReply::Answer(value) => {
                        if let Err(error) = self.respond(value) {
                            return self.finish(ExecutionStatus::Failed, Some(error));
                        }
                    }
                    PromptReply::Cancel => self.abort(),
                },
            }
        }
    }

    pub(super) fn finish(
        &mut self,
        status: ExecutionStatus,
        error: Option<ModScriptError>,
    ) -> ExecutionResult {
        while self.frames.len() > 1 {
            self.frames.pop();
            self.context.pop_scope();
        }
        self.frames.clear();
        self.pending_prompt = None;
        self.journal.clear();

        match &error {
            Some(error) => tracing::info!(?status, code = %error.code, "script run finished"),
            None => tracing::info!(
                ?status,
                warnings = self.context.warnings().len(),
                "script run finished"
            ),
        }

        let result = ExecutionResult {
            status,
            warnings: self.context.warnings().to_vec(),
            error,
        };
        self.outcome = Some(result.clone());
        result
    }
}

/// One-shot form: bind, run to completion, return the result.
pub fn execute<P, F>(
    script: Arc<Script>,
    context: InterpreterContext<P::Extension>,
    proxy: P,
    options: ModScriptEngineOptions,
    responder: F,
) -> ExecutionResult
where
    P: FunctionProxy,
    F: FnMut(&PendingPrompt) -> PromptReply,
{
    match ModScriptEngine::new(script, proxy, context, options) {
        Ok(mut engine) => engine.run_with(responder),
        Err(error) => ExecutionResult {
            status: ExecutionStatus::Failed,
            warnings: Vec::new(),
            error: Some(error),
        },
    }
}
