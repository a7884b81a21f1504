use std::collections::VecDeque;
use std::fs;
use std::io::{BufRead, Write};

use ms_core::{ModScriptError, MsValue, PendingPrompt, PromptKind};
use ms_runtime::PromptReply;

use crate::{map_cli_answers_invalid, map_cli_answers_read, map_prompt_io, CANCEL_COMMAND};

pub(crate) fn load_answers(path: Option<&str>) -> Result<VecDeque<MsValue>, ModScriptError> {
    let Some(path) = path else {
        return Ok(VecDeque::new());
    };
    let raw = fs::read_to_string(path).map_err(map_cli_answers_read)?;
    let answers: Vec<MsValue> = serde_json::from_str(&raw).map_err(map_cli_answers_invalid)?;
    Ok(answers.into())
}

/// Answers prompts from, in order: the answers file, `--assume-yes`, and
/// finally the terminal.
pub(crate) struct PromptResponder<'a> {
    queued: VecDeque<MsValue>,
    assume_yes: bool,
    reader: &'a mut dyn BufRead,
    writer: &'a mut dyn Write,
}

impl<'a> PromptResponder<'a> {
    pub(crate) fn new(
        queued: VecDeque<MsValue>,
        assume_yes: bool,
        reader: &'a mut dyn BufRead,
        writer: &'a mut dyn Write,
    ) -> Self {
        Self {
            queued,
            assume_yes,
            reader,
            writer,
        }
    }

    pub(crate) fn reply(&mut self, prompt: &PendingPrompt) -> Result<PromptReply, ModScriptError> {
        if let Some(answer) = self.queued.pop_front() {
            tracing::debug!(function = %prompt.function, %answer, "answered from file");
            return Ok(match answer {
                MsValue::String(text) if text == CANCEL_COMMAND => PromptReply::Cancel,
                answer => PromptReply::Answer(answer),
            });
        }
        if self.assume_yes {
            return Ok(PromptReply::Answer(assumed_answer(prompt)));
        }
        self.ask(prompt)
    }

    fn ask(&mut self, prompt: &PendingPrompt) -> Result<PromptReply, ModScriptError> {
        writeln!(self.writer, "{}", prompt.message).map_err(map_prompt_io)?;
        for (index, option) in prompt.options.iter().enumerate() {
            writeln!(self.writer, "  [{}] {}", index, option).map_err(map_prompt_io)?;
        }

        loop {
            write!(self.writer, "{}", input_hint(prompt)).map_err(map_prompt_io)?;
            self.writer.flush().map_err(map_prompt_io)?;

            let mut line = String::new();
            let read = self.reader.read_line(&mut line).map_err(map_prompt_io)?;
            if read == 0 {
                return Ok(PromptReply::Cancel);
            }
            let line = line.trim();
            if line == CANCEL_COMMAND {
                return Ok(PromptReply::Cancel);
            }
            match parse_answer(prompt, line) {
                Some(answer) => return Ok(PromptReply::Answer(answer)),
                None => {
                    writeln!(self.writer, "Invalid answer: {}", line).map_err(map_prompt_io)?;
                }
            }
        }
    }
}

fn input_hint(prompt: &PendingPrompt) -> String {
    match prompt.kind {
        PromptKind::YesNo => "[y/n] > ".to_string(),
        PromptKind::Select => format!("[0-{}] > ", prompt.options.len().saturating_sub(1)),
        PromptKind::Text => match &prompt.default_text {
            Some(default) => format!("({}) > ", default),
            None => "> ".to_string(),
        },
        PromptKind::Notice => "[enter] ".to_string(),
    }
}

fn assumed_answer(prompt: &PendingPrompt) -> MsValue {
    match prompt.kind {
        PromptKind::YesNo | PromptKind::Notice => MsValue::Bool(true),
        PromptKind::Select => MsValue::Number(0.0),
        PromptKind::Text => MsValue::String(prompt.default_text.clone().unwrap_or_default()),
    }
}

fn parse_answer(prompt: &PendingPrompt, line: &str) -> Option<MsValue> {
    match prompt.kind {
        PromptKind::YesNo => match line.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" => Some(MsValue::Bool(true)),
            "n" | "no" | "false" => Some(MsValue::Bool(false)),
            _ => None,
        },
        PromptKind::Select => line
            .parse::<usize>()
            .ok()
            .filter(|index| *index < prompt.options.len())
            .map(|index| MsValue::Number(index as f64)),
        PromptKind::Text if line.is_empty() => prompt
            .default_text
            .clone()
            .map(MsValue::String)
            .or(Some(MsValue::String(String::new()))),
        PromptKind::Text => Some(MsValue::String(line.to_string())),
        PromptKind::Notice => Some(MsValue::Bool(true)),
    }
}
