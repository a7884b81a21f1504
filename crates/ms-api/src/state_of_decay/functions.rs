use ms_core::{PromptKind, ValueType};
use ms_runtime::{FailurePolicy, FunctionKind, FunctionSet, FunctionSignature, Param};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SodFunction {
    FileExists,
    TargetFileExists,
    Copy,
    Move,
    Delete,
    CreateDirectory,
    SetDirectory,
    EditIni,
    GameVersion,
    CompareVersions,
    Warn,
    Fail,
    AskYesNo,
    Select,
    AskText,
    Message,
}

const PATH: &[Param] = &[Param::new("path", ValueType::String)];
const MESSAGE: &[Param] = &[Param::new("message", ValueType::String)];
const TRANSFER: &[Param] = &[
    Param::new("source", ValueType::String),
    Param::new("target", ValueType::String),
];
const EDIT_INI: &[Param] = &[
    Param::new("file", ValueType::String),
    Param::new("section", ValueType::String),
    Param::new("key", ValueType::String),
    Param::new("value", ValueType::String),
];
const VERSIONS: &[Param] = &[
    Param::new("left", ValueType::String),
    Param::new("right", ValueType::String),
];
const ASK_TEXT: &[Param] = &[
    Param::new("message", ValueType::String),
    Param::new("default", ValueType::String),
];

const fn host(
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

const fn prompt(
    name: &'static str,
    params: &'static [Param],
    variadic: Option<ValueType>,
    returns: Option<ValueType>,
    kind: PromptKind,
) -> FunctionSignature {
    FunctionSignature {
        name,
        params,
        variadic,
        returns,
        kind: FunctionKind::Prompt(kind),
        // A prompt that cannot be shown leaves nothing sensible to continue with.
        on_failure: FailurePolicy::Fatal,
    }
}

impl FunctionSet for SodFunction {
    fn all() -> &'static [Self] {
        &[
            Self::FileExists,
            Self::TargetFileExists,
            Self::Copy,
            Self::Move,
            Self::Delete,
            Self::CreateDirectory,
            Self::SetDirectory,
            Self::EditIni,
            Self::GameVersion,
            Self::CompareVersions,
            Self::Warn,
            Self::Fail,
            Self::AskYesNo,
            Self::Select,
            Self::AskText,
            Self::Message,
        ]
    }

    /// The complete classification table of the dialect.
    fn signature(self) -> FunctionSignature {
        use FailurePolicy::{Fatal, Recoverable};
        use ValueType::{Bool, Number, String as Text};

        match self {
            Self::FileExists => host("FileExists", PATH, Some(Bool), Recoverable),
            Self::TargetFileExists => host("TargetFileExists", PATH, Some(Bool), Recoverable),
            Self::Copy => host("Copy", TRANSFER, None, Fatal),
            Self::Move => host("Move", TRANSFER, None, Fatal),
            Self::Delete => host("Delete", PATH, None, Recoverable),
            Self::CreateDirectory => host("CreateDirectory", PATH, None, Recoverable),
            Self::SetDirectory => host("SetDirectory", PATH, None, Fatal),
            Self::EditIni => host("EditIni", EDIT_INI, None, Recoverable),
            Self::GameVersion => host("GameVersion", &[], Some(Text), Recoverable),
            Self::CompareVersions => host("CompareVersions", VERSIONS, Some(Number), Fatal),
            Self::Warn => host("Warn", MESSAGE, None, Recoverable),
            Self::Fail => host("Fail", MESSAGE, None, Fatal),
            Self::AskYesNo => prompt("AskYesNo", MESSAGE, None, Some(Bool), PromptKind::YesNo),
            Self::Select => prompt(
                "Select",
                MESSAGE,
                Some(Text),
                Some(Number),
                PromptKind::Select,
            ),
            Self::AskText => prompt("AskText", ASK_TEXT, None, Some(Text), PromptKind::Text),
            Self::Message => prompt("Message", MESSAGE, None, None, PromptKind::Notice),
        }
    }
}
