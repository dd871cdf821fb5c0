//! Lexer for Go source files using logos
//!
//! Only the tokens the declaration parser cares about get their own variant;
//! every other keyword lexes as an identifier and every other operator as
//! [`Token::Punct`]. Newlines are turned into semicolons following Go's
//! automatic semicolon insertion rule.

use std::ops::Range;

use logos::Logos;

/// Token types for Go syntax
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token<'src> {
    // Keywords
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("type")]
    Type,
    #[token("interface")]
    Interface,
    #[token("struct")]
    Struct,
    #[token("func")]
    Func,
    #[token("map")]
    Map,
    #[token("chan")]
    Chan,

    // Identifiers and literals
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice())]
    String(&'src str),

    #[regex(r"`[^`]*`", |lex| lex.slice())]
    RawString(&'src str),

    #[regex(r"'([^'\\\n]|\\.)*'", |lex| lex.slice())]
    Rune(&'src str),

    #[regex(r"[0-9][0-9a-zA-Z_.]*", |lex| lex.slice())]
    Number(&'src str),

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("...")]
    Ellipsis,
    #[token(".")]
    Dot,
    #[token("*")]
    Star,
    #[token("<-")]
    Arrow,
    #[regex(r"[+\-/%&|^<>=!:~?]", |lex| lex.slice())]
    Punct(&'src str),

    #[token("\n")]
    Newline,

    // Comments
    #[regex(r"//[^\n]*", |lex| lex.slice())]
    LineComment(&'src str),

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", |lex| lex.slice())]
    BlockComment(&'src str),
}

impl Token<'_> {
    /// Whether a line break after this token ends the statement.
    fn ends_line(&self) -> bool {
        matches!(
            self,
            Token::Ident(_)
                | Token::String(_)
                | Token::RawString(_)
                | Token::Rune(_)
                | Token::Number(_)
                | Token::RParen
                | Token::RBracket
                | Token::RBrace
        )
    }
}

/// A token with its byte range in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: Range<usize>,
}

/// A character sequence the lexer could not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub span: Range<usize>,
}

/// Lex source code into significant tokens, inserting semicolons at line ends.
///
/// Comments and newlines never appear in the output.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken<'_>>, LexError> {
    let mut tokens: Vec<SpannedToken<'_>> = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        let token = result.map_err(|_| LexError { span: span.clone() })?;
        let line_break = match token {
            Token::Newline => true,
            Token::BlockComment(text) => text.contains('\n'),
            Token::LineComment(_) => false,
            _ => {
                tokens.push(SpannedToken { token, span });
                continue;
            }
        };

        if line_break && needs_semicolon(&tokens) {
            tokens.push(SpannedToken {
                token: Token::Semi,
                span: span.start..span.start,
            });
        }
    }

    if needs_semicolon(&tokens) {
        tokens.push(SpannedToken {
            token: Token::Semi,
            span: source.len()..source.len(),
        });
    }

    Ok(tokens)
}

fn needs_semicolon(tokens: &[SpannedToken<'_>]) -> bool {
    tokens.last().is_some_and(|t| t.token.ends_line())
}
