pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod printer;

pub use grammar::{Grammar, GrammarVersion, Keyword};
pub use lexer::{tokenize, Lexer, Operator, Punct, Token, TokenKind};
pub use parser::{parse_script, Parser};
pub use printer::{print_expr, print_script};
