use std::collections::BTreeSet;
use std::sync::Arc;

use ms_core::ast::Script;
use ms_core::{MsValue, PromptKind, ValueType};
use ms_parser::{parse_script, Grammar};

use crate::context::InterpreterContext;
use crate::engine::{ModScriptEngine, ModScriptEngineOptions};
use crate::proxy::{
    FailurePolicy, FunctionKind, FunctionProxy, FunctionSet, FunctionSignature, HostFailure, Param,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StubFunction {
    FileExists,
    Copy,
    Warn,
    Fail,
    Flaky,
    Echo,
    Join,
    Cancel,
    BadReturn,
    AskYesNo,
    Select,
    AskText,
    Message,
}

const PATH: &[Param] = &[Param::new("path", ValueType::String)];
const MESSAGE: &[Param] = &[Param::new("message", ValueType::String)];
const COPY: &[Param] = &[
    Param::new("source", ValueType::String),
    Param::new("target", ValueType::String),
];
const VALUE: &[Param] = &[Param::new("value", ValueType::Any)];
const ASK_TEXT: &[Param] = &[
    Param::new("message", ValueType::String),
    Param::new("default", ValueType::String),
];

fn host(
    name: &'static str,
    params: &'static [Param],
    returns: Option<ValueType>,
    on_failure: FailurePolicy,
) -> FunctionSignature {
    FunctionSignature {
        name,
        params,
        variadic: None,
        returns,
        kind: FunctionKind::Host,
        on_failure,
    }
}

fn prompt(
    name: &'static str,
    params: &'static [Param],
    returns: Option<ValueType>,
    kind: PromptKind,
) -> FunctionSignature {
    FunctionSignature {
        name,
        params,
        variadic: None,
        returns,
        kind: FunctionKind::Prompt(kind),
        on_failure: FailurePolicy::Fatal,
    }
}

impl FunctionSet for StubFunction {
    fn all() -> &'static [Self] {
        &[
            Self::FileExists,
            Self::Copy,
            Self::Warn,
            Self::Fail,
            Self::Flaky,
            Self::Echo,
            Self::Join,
            Self::Cancel,
            Self::BadReturn,
            Self::AskYesNo,
            Self::Select,
            Self::AskText,
            Self::Message,
        ]
    }

    fn signature(self) -> FunctionSignature {
        let recoverable = FailurePolicy::Recoverable;
        let fatal = FailurePolicy::Fatal;
        match self {
            Self::FileExists => host("FileExists", PATH, Some(ValueType::Bool), recoverable),
            Self::Copy => host("Copy", COPY, None, fatal),
            Self::Warn => host("Warn", MESSAGE, None, recoverable),
            Self::Fail => host("Fail", MESSAGE, None, fatal),
            Self::Flaky => host("Flaky", PATH, Some(ValueType::Bool), recoverable),
            Self::Echo => host("Echo", VALUE, Some(ValueType::String), recoverable),
            Self::Join => FunctionSignature {
                variadic: Some(ValueType::String),
                ..host("Join", &[], Some(ValueType::String), fatal)
            },
            Self::Cancel => host("Cancel", &[], None, fatal),
            Self::BadReturn => host("BadReturn", &[], Some(ValueType::Number), fatal),
            Self::AskYesNo => prompt("AskYesNo", MESSAGE, Some(ValueType::Bool), PromptKind::YesNo),
            Self::Select => FunctionSignature {
                variadic: Some(ValueType::String),
                ..prompt("Select", MESSAGE, Some(ValueType::Number), PromptKind::Select)
            },
            Self::AskText => prompt("AskText", ASK_TEXT, Some(ValueType::String), PromptKind::Text),
            Self::Message => prompt("Message", MESSAGE, None, PromptKind::Notice),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct StubState {
    pub copies: usize,
}

/// Records every call it receives. `Copy` fails when its source is listed
/// in `failing`.
#[derive(Debug, Default)]
pub(crate) struct StubProxy {
    pub existing: BTreeSet<String>,
    pub failing: BTreeSet<String>,
    pub calls: Vec<(String, Vec<MsValue>)>,
}

impl StubProxy {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            existing: files.iter().map(|file| file.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn call_names(&self) -> Vec<&str> {
        self.calls.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl FunctionProxy for StubProxy {
    type Function = StubFunction;
    type Extension = StubState;

    fn invoke(
        &mut self,
        function: StubFunction,
        args: &[MsValue],
        context: &mut InterpreterContext<StubState>,
    ) -> Result<MsValue, HostFailure> {
        self.calls.push((function.name().to_string(), args.to_vec()));
        let text = |index: usize| {
            args.get(index)
                .and_then(MsValue::as_str)
                .unwrap_or_default()
                .to_string()
        };
        match function {
            StubFunction::FileExists => Ok(MsValue::Bool(self.existing.contains(&text(0)))),
            StubFunction::Copy => {
                if self.failing.contains(&text(0)) {
                    return Err(HostFailure::failed(format!("cannot read {}", text(0))));
                }
                context.extension_mut().copies += 1;
                Ok(MsValue::Bool(true))
            }
            StubFunction::Warn => {
                context.warn(text(0));
                Ok(MsValue::Bool(true))
            }
            StubFunction::Fail => Err(HostFailure::failed(text(0))),
            StubFunction::Flaky => Err(HostFailure::failed(format!("flaky: {}", text(0)))),
            StubFunction::Echo => Ok(MsValue::String(
                args.first().map(MsValue::to_string).unwrap_or_default(),
            )),
            StubFunction::Join => Ok(MsValue::String(
                args.iter().map(MsValue::to_string).collect::<Vec<_>>().join(","),
            )),
            StubFunction::Cancel => Err(HostFailure::Cancelled),
            StubFunction::BadReturn => Ok(MsValue::from("not a number")),
            StubFunction::AskYesNo
            | StubFunction::Select
            | StubFunction::AskText
            | StubFunction::Message => Err(HostFailure::failed("prompt reached the proxy")),
        }
    }
}

pub(crate) fn compile(source: &str) -> Arc<Script> {
    Arc::new(parse_script(source, &Grammar::default()).expect("script should parse"))
}

pub(crate) fn engine_for(source: &str, proxy: StubProxy) -> ModScriptEngine<StubProxy> {
    engine_with_options(source, proxy, ModScriptEngineOptions::default())
}

pub(crate) fn engine_with_options(
    source: &str,
    proxy: StubProxy,
    options: ModScriptEngineOptions,
) -> ModScriptEngine<StubProxy> {
    ModScriptEngine::new(compile(source), proxy, InterpreterContext::default(), options)
        .expect("engine should build")
}
