use ms_core::{ModScriptError, MsValue, PendingPrompt, PromptKind, SourceSpan};

use super::ModScriptEngine;
use crate::proxy::{FunctionProxy, FunctionSignature};

impl<P: FunctionProxy> ModScriptEngine<P> {
    /// Answers the pending prompt. An answer of the wrong shape is rejected
    /// and the prompt stays pending.
    pub fn respond(&mut self, value: MsValue) -> Result<(), ModScriptError> {
        if self.outcome.is_some() {
            return Err(ModScriptError::usage(
                "ENGINE_FINISHED",
                "Script run has already finished.",
            ));
        }
        let Some(prompt) = &self.pending_prompt else {
            return Err(ModScriptError::usage(
                "ENGINE_NO_PENDING_PROMPT",
                "No prompt is waiting for a response.",
            ));
        };

        let recorded = validate_response(prompt, value)?;
        tracing::debug!(function = %prompt.function, "prompt answered");
        self.journal.push(recorded);
        self.pending_prompt = None;
        Ok(())
    }
}

fn validate_response(
    prompt: &PendingPrompt,
    value: MsValue,
) -> Result<Option<MsValue>, ModScriptError> {
    let invalid = |expected: String| {
        ModScriptError::usage(
            "ENGINE_PROMPT_RESPONSE",
            format!("{} expects {}.", prompt.function, expected),
        )
    };

    match prompt.kind {
        PromptKind::Notice => Ok(None),
        PromptKind::YesNo => match value {
            MsValue::Bool(_) => Ok(Some(value)),
            _ => Err(invalid("a yes/no answer".to_string())),
        },
        PromptKind::Text => match value {
            MsValue::String(_) => Ok(Some(value)),
            _ => Err(invalid("a text answer".to_string())),
        },
        PromptKind::Select => {
            let count = prompt.options.len();
            match value {
                MsValue::Number(index)
                    if index.fract() == 0.0 && index >= 0.0 && (index as usize) < count =>
                {
                    Ok(Some(value))
                }
                _ => Err(invalid(format!(
                    "an option index between 0 and {}",
                    count.saturating_sub(1)
                ))),
            }
        }
    }
}

/// The first argument is always the message. Select takes the remaining
/// arguments as options; Text takes the second as the default answer.
pub(super) fn build_prompt(
    signature: &FunctionSignature,
    kind: PromptKind,
    args: &[MsValue],
    span: SourceSpan,
) -> PendingPrompt {
    let message = args.first().map(MsValue::to_string).unwrap_or_default();
    let options = match kind {
        PromptKind::Select => args.iter().skip(1).map(MsValue::to_string).collect(),
        _ => Vec::new(),
    };
    let default_text = match kind {
        PromptKind::Text => args.get(1).map(MsValue::to_string),
        _ => None,
    };

    PendingPrompt {
        function: signature.name.to_string(),
        kind,
        message,
        options,
        default_text,
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(kind: PromptKind, options: &[&str]) -> PendingPrompt {
        PendingPrompt {
            function: "Ask".to_string(),
            kind,
            message: "?".to_string(),
            options: options.iter().map(|option| option.to_string()).collect(),
            default_text: None,
            span: SourceSpan::synthetic(),
        }
    }

    #[test]
    fn select_accepts_only_indices_in_range() {
        let select = prompt(PromptKind::Select, &["a", "b"]);
        assert!(validate_response(&select, MsValue::from(1.0)).is_ok());
        for bad in [MsValue::from(2.0), MsValue::from(-1.0), MsValue::from(0.5), MsValue::from("a")] {
            let error = validate_response(&select, bad).expect_err("should be rejected");
            assert_eq!(error.code, "ENGINE_PROMPT_RESPONSE");
        }
    }

    #[test]
    fn notice_records_no_value() {
        let notice = prompt(PromptKind::Notice, &[]);
        assert_eq!(validate_response(&notice, MsValue::Bool(true)), Ok(None));
    }

    #[test]
    fn yes_no_rejects_text() {
        let ask = prompt(PromptKind::YesNo, &[]);
        assert!(validate_response(&ask, MsValue::from("yes")).is_err());
        assert_eq!(
            validate_response(&ask, MsValue::Bool(false)),
            Ok(Some(MsValue::Bool(false)))
        );
    }
}
