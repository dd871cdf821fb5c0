//! Recursive descent parser for Go declarations.
//!
//! The parser reads the package clause, import declarations, and every
//! top-level type declaration. Interface bodies are parsed in full; all other
//! declarations (functions, variables, constants, non-interface types) are
//! skipped with delimiter balancing, which still catches unbalanced or
//! truncated files.

use tracegen_core::{collapse_whitespace, unquote};

use crate::{
    ast::{Field, ImportDecl, InterfaceDecl, InterfaceElem, MethodDecl, SourceFile, Span, TypeExpr},
    error::{ParseError, ParseResult},
    lexer::{SpannedToken, Token, tokenize},
};

/// Parse a Go source file.
pub fn parse(source: &str, filename: &str) -> ParseResult<SourceFile> {
    let mut parser = Parser::new(source, filename)?;
    parser.parse_file()
}

/// One entry of a parameter list before names and types are paired up.
enum ParamEntry {
    /// A lone identifier: either a parameter name or a type name.
    Bare { name: String, span: Span },
    /// `name Type`
    Named { name: String, ty: TypeExpr },
    /// A type that cannot be a name.
    Type { ty: TypeExpr, span: Span },
}

/// Parser for Go declarations
pub struct Parser<'src> {
    source: &'src str,
    filename: &'src str,
    tokens: Vec<SpannedToken<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, filename: &'src str) -> ParseResult<Self> {
        let tokens = tokenize(source).map_err(|e| {
            ParseError::new(
                source,
                filename,
                e.span,
                "invalid or unterminated token",
                "cannot tokenize this",
            )
        })?;

        Ok(Self {
            source,
            filename,
            tokens,
            pos: 0,
        })
    }

    /// Parse a complete file
    pub fn parse_file(&mut self) -> ParseResult<SourceFile> {
        self.skip_semis();
        self.expect(Token::Package, "'package' clause")?;
        let package = self.expect_ident()?;
        self.expect_terminator()?;

        let mut imports = Vec::new();
        let mut interfaces = Vec::new();

        loop {
            self.skip_semis();
            match self.peek() {
                None => break,
                Some(Token::Import) => imports.extend(self.parse_import_decl()?),
                Some(Token::Type) => interfaces.extend(self.parse_type_decl()?),
                Some(_) => self.skip_decl()?,
            }
        }

        tracing::trace!(
            file = self.filename,
            imports = imports.len(),
            interfaces = interfaces.len(),
            "parsed source file"
        );

        Ok(SourceFile {
            package,
            imports,
            interfaces,
        })
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// `import spec` or `import ( spec; spec )`
    fn parse_import_decl(&mut self) -> ParseResult<Vec<ImportDecl>> {
        self.expect(Token::Import, "'import'")?;

        let mut specs = Vec::new();
        if self.match_token(Token::LParen) {
            loop {
                self.skip_semis();
                if self.match_token(Token::RParen) {
                    break;
                }
                specs.push(self.parse_import_spec()?);
                if !self.check(Token::RParen) {
                    self.expect(Token::Semi, "';' or ')'")?;
                }
            }
        } else {
            specs.push(self.parse_import_spec()?);
        }

        self.expect_terminator()?;
        Ok(specs)
    }

    fn parse_import_spec(&mut self) -> ParseResult<ImportDecl> {
        let start = self.peek_span().start;
        let alias = match self.peek() {
            Some(Token::Ident(name)) => {
                self.advance();
                Some(name.to_string())
            }
            Some(Token::Dot) => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };

        match self.peek() {
            Some(Token::String(lit)) | Some(Token::RawString(lit)) => {
                let path = unquote(lit).to_string();
                let end = self.peek_span().end;
                self.advance();
                Ok(ImportDecl {
                    alias,
                    path,
                    span: start..end,
                })
            }
            _ => Err(self.error_here("expected import path", "import path expected here")),
        }
    }

    /// `type spec` or `type ( spec; spec )`; returns the interfaces declared.
    fn parse_type_decl(&mut self) -> ParseResult<Vec<InterfaceDecl>> {
        self.expect(Token::Type, "'type'")?;

        let mut interfaces = Vec::new();
        if self.match_token(Token::LParen) {
            loop {
                self.skip_semis();
                if self.match_token(Token::RParen) {
                    break;
                }
                interfaces.extend(self.parse_type_spec()?);
                if !self.check(Token::RParen) {
                    self.expect(Token::Semi, "';' or ')'")?;
                }
            }
        } else {
            interfaces.extend(self.parse_type_spec()?);
        }

        self.expect_terminator()?;
        Ok(interfaces)
    }

    fn parse_type_spec(&mut self) -> ParseResult<Option<InterfaceDecl>> {
        let start = self.peek_span().start;
        let name = self.expect_ident()?;

        let mut type_params = None;
        if self.check_punct("=") {
            self.advance();
        } else if self.check(Token::LBracket) && self.looks_like_type_params() {
            let span = self.skip_balanced()?;
            type_params = Some(self.raw(span));
        }

        if !self.check(Token::Interface) {
            self.parse_type()?;
            return Ok(None);
        }

        let elements = self.parse_interface_body()?;
        Ok(Some(InterfaceDecl {
            name,
            type_params,
            elements,
            span: start..self.prev_end(),
        }))
    }

    /// `interface { elem; elem }`
    fn parse_interface_body(&mut self) -> ParseResult<Vec<InterfaceElem>> {
        self.expect(Token::Interface, "'interface'")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut elements = Vec::new();
        loop {
            self.skip_semis();
            if self.match_token(Token::RBrace) {
                break;
            }
            if self.peek().is_none() {
                return Err(self.error_here(
                    "expected '}', found end of file",
                    "interface body is never closed",
                ));
            }

            let elem = match (self.peek(), self.peek_at(1)) {
                (Some(Token::Ident(_)), Some(Token::LParen)) => {
                    InterfaceElem::Method(self.parse_method()?)
                }
                _ => {
                    let span = self.skip_until_elem_end()?;
                    InterfaceElem::Embedded {
                        raw: self.raw(span.clone()),
                        span,
                    }
                }
            };
            elements.push(elem);

            if !self.check(Token::RBrace) {
                self.expect(Token::Semi, "';' or '}'")?;
            }
        }

        Ok(elements)
    }

    fn parse_method(&mut self) -> ParseResult<MethodDecl> {
        let start = self.peek_span().start;
        let name = self.expect_ident()?;
        let params = self.parse_parameters()?;
        let results = self.parse_results()?;

        Ok(MethodDecl {
            name,
            params,
            results,
            span: start..self.prev_end(),
        })
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// `( [entry {, entry} [,]] )`
    fn parse_parameters(&mut self) -> ParseResult<Vec<Field>> {
        self.expect(Token::LParen, "'('")?;

        let mut entries = Vec::new();
        loop {
            if self.check(Token::RParen) {
                break;
            }
            entries.push(self.parse_param_entry()?);
            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, "',' or ')'")?;

        self.group_params(entries)
    }

    fn parse_param_entry(&mut self) -> ParseResult<ParamEntry> {
        if let Some(Token::Ident(name)) = self.peek() {
            let span = self.peek_span();
            match self.peek_at(1) {
                Some(Token::Comma) | Some(Token::RParen) => {
                    self.advance();
                    return Ok(ParamEntry::Bare {
                        name: name.to_string(),
                        span,
                    });
                }
                Some(next) if next != Token::Dot && starts_param_type(next) => {
                    self.advance();
                    let ty = self.parse_param_type()?;
                    return Ok(ParamEntry::Named {
                        name: name.to_string(),
                        ty,
                    });
                }
                _ => {}
            }
        }

        let start = self.peek_span().start;
        let ty = self.parse_param_type()?;
        Ok(ParamEntry::Type {
            ty,
            span: start..self.prev_end(),
        })
    }

    fn parse_param_type(&mut self) -> ParseResult<TypeExpr> {
        if self.match_token(Token::Ellipsis) {
            Ok(TypeExpr::variadic(self.parse_type()?))
        } else {
            self.parse_type()
        }
    }

    /// Pair names with types: in `a, b int, c string` the bare `a` takes `int`.
    ///
    /// A list is either all named or all anonymous.
    fn group_params(&self, entries: Vec<ParamEntry>) -> ParseResult<Vec<Field>> {
        let named = entries
            .iter()
            .any(|e| matches!(e, ParamEntry::Named { .. }));

        if !named {
            return Ok(entries
                .into_iter()
                .map(|e| match e {
                    ParamEntry::Bare { name, .. } => Field::anonymous(TypeExpr::Identifier(name)),
                    ParamEntry::Type { ty, .. } | ParamEntry::Named { ty, .. } => {
                        Field::anonymous(ty)
                    }
                })
                .collect());
        }

        let mut fields = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        let mut pending_span = None;
        for entry in entries {
            match entry {
                ParamEntry::Bare { name, span } => {
                    pending_span.get_or_insert(span);
                    pending.push(name);
                }
                ParamEntry::Named { name, ty } => {
                    pending.push(name);
                    fields.push(Field::named(std::mem::take(&mut pending), ty));
                    pending_span = None;
                }
                ParamEntry::Type { span, .. } => {
                    return Err(self.error_at(
                        span,
                        "mixed named and unnamed parameters",
                        "this parameter has no name",
                    ));
                }
            }
        }

        if let Some(span) = pending_span {
            return Err(self.error_at(span, "missing parameter type", "no type follows this name"));
        }

        Ok(fields)
    }

    /// Result list: nothing, a single type, or a parenthesized list.
    fn parse_results(&mut self) -> ParseResult<Vec<Field>> {
        match self.peek() {
            Some(Token::LParen) => self.parse_parameters(),
            Some(token) if starts_type(token) => Ok(vec![Field::anonymous(self.parse_type()?)]),
            _ => Ok(Vec::new()),
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Parse one type expression.
    fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek_span().start;

        match self.peek() {
            Some(Token::Ident(name)) => {
                self.advance();
                let ty = if self.match_token(Token::Dot) {
                    let sel = self.expect_ident()?;
                    TypeExpr::qualified(name, sel)
                } else {
                    TypeExpr::ident(name)
                };

                // Generic instantiation, e.g. `List[int]`
                if self.check(Token::LBracket) {
                    self.skip_balanced()?;
                    return Ok(self.unsupported(start));
                }
                Ok(ty)
            }
            Some(Token::Star) => {
                self.advance();
                Ok(TypeExpr::pointer(self.parse_type()?))
            }
            Some(Token::LBracket) => {
                if self.peek_at(1) == Some(Token::RBracket) {
                    self.advance();
                    self.advance();
                    return Ok(TypeExpr::slice(self.parse_type()?));
                }
                // Array with a length
                self.skip_balanced()?;
                self.parse_type()?;
                Ok(self.unsupported(start))
            }
            Some(Token::Map) => {
                self.advance();
                self.expect(Token::LBracket, "'['")?;
                let key = self.parse_type()?;
                self.expect(Token::RBracket, "']'")?;
                let value = self.parse_type()?;
                Ok(TypeExpr::map(key, value))
            }
            Some(Token::Chan) => {
                self.advance();
                self.match_token(Token::Arrow);
                self.parse_type()?;
                Ok(self.unsupported(start))
            }
            Some(Token::Arrow) => {
                self.advance();
                self.expect(Token::Chan, "'chan'")?;
                self.parse_type()?;
                Ok(self.unsupported(start))
            }
            Some(Token::Func) => {
                self.advance();
                self.parse_parameters()?;
                self.parse_results()?;
                Ok(self.unsupported(start))
            }
            Some(Token::Interface) => {
                let elements = self.parse_interface_body()?;
                if elements.is_empty() {
                    Ok(TypeExpr::InterfaceAny)
                } else {
                    Ok(self.unsupported(start))
                }
            }
            Some(Token::Struct) => {
                self.advance();
                if !self.check(Token::LBrace) {
                    return Err(self.error_here("expected '{' after 'struct'", "expected '{'"));
                }
                self.skip_balanced()?;
                Ok(self.unsupported(start))
            }
            Some(Token::LParen) => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(Token::RParen, "')'")?;
                Ok(ty)
            }
            _ => Err(self.error_here("expected type", "type expected here")),
        }
    }

    fn unsupported(&self, start: usize) -> TypeExpr {
        let raw = self.raw(start..self.prev_end());
        tracing::trace!(file = self.filename, raw = %raw, "unsupported type expression");
        TypeExpr::Unsupported(raw)
    }

    /// Distinguish `type List[T any]` from `type Buf [4]byte`.
    fn looks_like_type_params(&self) -> bool {
        matches!(self.peek_at(1), Some(Token::Ident(_)))
            && !matches!(self.peek_at(2), Some(Token::RBracket) | None)
    }

    // =========================================================================
    // Skipping
    // =========================================================================

    /// Skip a declaration the generator does not care about.
    fn skip_decl(&mut self) -> ParseResult<()> {
        let mut stack: Vec<Span> = Vec::new();
        while let Some(token) = self.peek() {
            if stack.is_empty() && token == Token::Semi {
                self.advance();
                return Ok(());
            }
            self.track_delimiter(token, &mut stack)?;
            self.advance();
        }
        self.check_unclosed(&stack)
    }

    /// Skip an embedded interface element up to `;` or the closing `}`.
    fn skip_until_elem_end(&mut self) -> ParseResult<Span> {
        let start = self.peek_span().start;
        let mut stack: Vec<Span> = Vec::new();
        while let Some(token) = self.peek() {
            if stack.is_empty() && matches!(token, Token::Semi | Token::RBrace) {
                break;
            }
            self.track_delimiter(token, &mut stack)?;
            self.advance();
        }
        self.check_unclosed(&stack)?;
        Ok(start..self.prev_end())
    }

    /// Skip from an opening delimiter to its matching closer, inclusive.
    fn skip_balanced(&mut self) -> ParseResult<Span> {
        let start = self.peek_span().start;
        let mut stack: Vec<Span> = Vec::new();
        while let Some(token) = self.peek() {
            self.track_delimiter(token, &mut stack)?;
            self.advance();
            if stack.is_empty() {
                return Ok(start..self.prev_end());
            }
        }
        self.check_unclosed(&stack)?;
        Ok(start..self.prev_end())
    }

    fn track_delimiter(&self, token: Token<'src>, stack: &mut Vec<Span>) -> ParseResult<()> {
        match token {
            Token::LParen | Token::LBracket | Token::LBrace => stack.push(self.peek_span()),
            Token::RParen | Token::RBracket | Token::RBrace => {
                let Some(open) = stack.pop() else {
                    return Err(self.error_here(
                        "unexpected closing delimiter",
                        "nothing to close here",
                    ));
                };
                let expected = match &self.source[open.clone()] {
                    "(" => Token::RParen,
                    "[" => Token::RBracket,
                    _ => Token::RBrace,
                };
                if token != expected {
                    return Err(self.error_here(
                        "mismatched closing delimiter",
                        "does not match the open delimiter",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn check_unclosed(&self, stack: &[Span]) -> ParseResult<()> {
        match stack.last() {
            Some(open) => Err(self.error_at(
                open.clone(),
                "unexpected end of file",
                "this delimiter is never closed",
            )),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).map(|t| t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<Token<'src>> {
        self.tokens.get(self.pos + offset).map(|t| t.token)
    }

    fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(t) => t.span.clone(),
            None => self.source.len()..self.source.len(),
        }
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, token: Token<'src>) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(&t) == std::mem::discriminant(&token))
    }

    fn check_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token::Punct(p)) if p == punct)
    }

    fn match_token(&mut self, token: Token<'src>) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_semis(&mut self) {
        while self.match_token(Token::Semi) {}
    }

    fn expect(&mut self, token: Token<'src>, expected: &str) -> ParseResult<()> {
        if self.match_token(token) {
            Ok(())
        } else {
            Err(self.error_here(
                format!("expected {}, found {}", expected, self.describe_current()),
                format!("expected {}", expected),
            ))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.advance();
                Ok(name.to_string())
            }
            _ => Err(self.error_here(
                format!("expected identifier, found {}", self.describe_current()),
                "identifier expected here",
            )),
        }
    }

    /// A declaration ends at `;` or end of file.
    fn expect_terminator(&mut self) -> ParseResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(Token::Semi) => {
                self.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here(
                format!(
                    "expected end of declaration, found {}",
                    self.describe_current()
                ),
                "unexpected token",
            )),
        }
    }

    fn describe_current(&self) -> String {
        match self.tokens.get(self.pos) {
            None => "end of file".to_string(),
            Some(t) if t.span.is_empty() => "newline".to_string(),
            Some(t) => format!("'{}'", &self.source[t.span.clone()]),
        }
    }

    fn raw(&self, span: Span) -> String {
        collapse_whitespace(&self.source[span])
    }

    fn error_here(&self, message: impl Into<String>, label: impl Into<String>) -> ParseError {
        self.error_at(self.peek_span(), message, label)
    }

    fn error_at(
        &self,
        span: Span,
        message: impl Into<String>,
        label: impl Into<String>,
    ) -> ParseError {
        ParseError::new(self.source, self.filename, span, message, label)
    }
}

/// Tokens that can begin a type.
fn starts_type(token: Token<'_>) -> bool {
    matches!(
        token,
        Token::Ident(_)
            | Token::Star
            | Token::LBracket
            | Token::Map
            | Token::Chan
            | Token::Arrow
            | Token::Func
            | Token::Interface
            | Token::Struct
    )
}

/// Tokens that can begin a parameter's type, after its name.
fn starts_param_type(token: Token<'_>) -> bool {
    starts_type(token) || matches!(token, Token::Ellipsis | Token::LParen)
}
