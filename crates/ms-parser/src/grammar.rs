use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrammarVersion {
    /// Conditionals, assignments and calls.
    V1,
    /// Adds loops, explicit blocks, `set` and `return`.
    V2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    If,
    Then,
    ElseIf,
    Else,
    EndIf,
    And,
    Or,
    Not,
    True,
    False,
    While,
    Do,
    EndWhile,
    Begin,
    End,
    Set,
    Return,
}

const V1_KEYWORDS: &[Keyword] = &[
    Keyword::If,
    Keyword::Then,
    Keyword::ElseIf,
    Keyword::Else,
    Keyword::EndIf,
    Keyword::And,
    Keyword::Or,
    Keyword::Not,
    Keyword::True,
    Keyword::False,
];

const V2_KEYWORDS: &[Keyword] = &[
    Keyword::While,
    Keyword::Do,
    Keyword::EndWhile,
    Keyword::Begin,
    Keyword::End,
    Keyword::Set,
    Keyword::Return,
];

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Then => "then",
            Self::ElseIf => "elseif",
            Self::Else => "else",
            Self::EndIf => "endif",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::True => "true",
            Self::False => "false",
            Self::While => "while",
            Self::Do => "do",
            Self::EndWhile => "endwhile",
            Self::Begin => "begin",
            Self::End => "end",
            Self::Set => "set",
            Self::Return => "return",
        }
    }

    /// Oldest grammar version in which the keyword is reserved.
    pub fn introduced_in(self) -> GrammarVersion {
        if V1_KEYWORDS.contains(&self) {
            GrammarVersion::V1
        } else {
            GrammarVersion::V2
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_str())
    }
}

/// Lexical and syntactic rules of one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub version: GrammarVersion,
    pub case_insensitive_keywords: bool,
    /// Keep `#` comments as statements instead of discarding them.
    pub retain_comments: bool,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            version: GrammarVersion::V2,
            case_insensitive_keywords: true,
            retain_comments: false,
        }
    }
}

impl Grammar {
    pub fn new(version: GrammarVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn keywords(&self) -> impl Iterator<Item = Keyword> + '_ {
        V1_KEYWORDS
            .iter()
            .chain(V2_KEYWORDS.iter())
            .copied()
            .filter(|keyword| keyword.introduced_in() <= self.version)
    }

    pub fn keyword(&self, word: &str) -> Option<Keyword> {
        self.keywords().find(|keyword| {
            if self.case_insensitive_keywords {
                keyword.as_str().eq_ignore_ascii_case(word)
            } else {
                keyword.as_str() == word
            }
        })
    }
}
