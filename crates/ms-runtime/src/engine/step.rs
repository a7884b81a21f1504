use std::sync::Arc;

use ms_core::ast::Statement;
use ms_core::{EngineOutput, ExecutionStatus, ModScriptError, SourceSpan};

use super::lifecycle::Interrupt;
use super::ModScriptEngine;
use crate::context::ScopeKind;
use crate::proxy::FunctionProxy;

pub(super) enum StepFlow {
    Continue,
    Done,
}

impl<P: FunctionProxy> ModScriptEngine<P> {
    /// Runs until the script asks the user something or finishes.
    ///
    /// A pending prompt is returned again until it is answered. Once the run
    /// has finished every further call returns the same result.
    pub fn next_output(&mut self) -> EngineOutput {
        if let Some(result) = &self.outcome {
            return EngineOutput::Finished {
                result: result.clone(),
            };
        }

        loop {
            if self.abort.is_aborted() {
                tracing::info!("abort observed at statement boundary");
                return self.finished(ExecutionStatus::AbortedByUser, None);
            }
            if let Some(prompt) = &self.pending_prompt {
                return EngineOutput::Prompt {
                    prompt: prompt.clone(),
                };
            }

            match self.step() {
                Ok(StepFlow::Continue) | Err(Interrupt::Suspend) => {}
                Ok(StepFlow::Done) => return self.finished(ExecutionStatus::Success, None),
                Err(Interrupt::Cancelled) => {
                    return self.finished(ExecutionStatus::AbortedByUser, None)
                }
                Err(Interrupt::Error(error)) => {
                    return self.finished(ExecutionStatus::Failed, Some(error))
                }
            }
        }
    }

    fn finished(&mut self, status: ExecutionStatus, error: Option<ModScriptError>) -> EngineOutput {
        EngineOutput::Finished {
            result: self.finish(status, error),
        }
    }

    fn step(&mut self) -> Result<StepFlow, Interrupt> {
        let Some(frame) = self.frames.last() else {
            return Ok(StepFlow::Done);
        };
        if frame.node_index >= frame.block.len() {
            if self.frames.len() == 1 {
                return Ok(StepFlow::Done);
            }
            self.leave_block();
            return Ok(StepFlow::Continue);
        }

        let block = Arc::clone(&frame.block);
        let statement = &block[frame.node_index];
        if self.journal.is_empty() {
            self.count_step(statement.span())?;
        }
        self.journal_cursor = 0;
        let flow = self.execute_statement(statement)?;
        self.journal.clear();
        Ok(flow)
    }

    fn count_step(&mut self, span: SourceSpan) -> Result<(), Interrupt> {
        self.steps += 1;
        if self.steps > self.options.max_steps {
            return Err(ModScriptError::runtime(
                "ENGINE_STEP_LIMIT",
                format!(
                    "Script exceeded the limit of {} executed statements.",
                    self.options.max_steps
                ),
                span,
            )
            .into());
        }
        Ok(())
    }

    fn execute_statement(&mut self, statement: &Statement) -> Result<StepFlow, Interrupt> {
        match statement {
            Statement::Call(call) => {
                self.call(call)?;
                self.advance();
            }
            Statement::Assign { name, value, .. } => {
                let value = self.eval(value)?;
                self.context.bind(name, value);
                self.advance();
            }
            Statement::Set { name, value, span } => {
                let value = self.eval(value)?;
                if !self.context.rebind(name, value) {
                    return Err(ModScriptError::runtime(
                        "ENGINE_SET_UNDEFINED",
                        format!("Cannot set \"{}\": variable is not defined.", name),
                        *span,
                    )
                    .into());
                }
                self.advance();
            }
            Statement::If {
                branches,
                otherwise,
                ..
            } => {
                let mut chosen = None;
                for branch in branches {
                    if self.eval_condition(&branch.guard)? {
                        chosen = Some(&branch.body);
                        break;
                    }
                }
                self.advance();
                if let Some(body) = chosen.or(otherwise.as_ref()) {
                    self.enter_block(body, ScopeKind::Conditional);
                }
            }
            Statement::While { guard, body, .. } => {
                // The loop statement stays current, so the guard runs again
                // when the body frame is left.
                if self.eval_condition(guard)? {
                    self.enter_block(body, ScopeKind::Loop);
                } else {
                    self.advance();
                }
            }
            Statement::Block(block) => {
                self.advance();
                self.enter_block(block, ScopeKind::Block);
            }
            Statement::Return { .. } => return Ok(StepFlow::Done),
            Statement::Comment { .. } => self.advance(),
        }
        Ok(StepFlow::Continue)
    }
}
