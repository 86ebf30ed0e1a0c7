//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing
//! infrastructure: the error taxonomy, token-stream helpers, the nesting
//! guard, and the public query interface over the parsed function.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following
//! organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: Parsing the function signature and parameter list
//! - `statements`: Parsing statements and linearizing control flow
//! - `expressions`: Lowering expressions into three-address statements
//!
//! Parsing methods are split across multiple files using `impl Parser`
//! blocks, allowing each module to extend the Parser with related
//! functionality while maintaining access to the shared parser state.
//!
//! Parsing stops at the first error; there is no recovery or diagnostic
//! aggregation. Every error carries the 1-based source line active when it
//! was detected.

use crate::ir::builder::CfgBuilder;
use crate::ir::{BasicBlock, Function, Parameter, ReturnKind, Statement};
use crate::parser::lexer::{LexError, Lexer, Token};
use crate::parser::symbols::{SymbolTable, VarKind};
use std::fmt;

/// Maximum statement/expression nesting depth before parsing is aborted
/// with a syntax error instead of risking stack exhaustion.
pub(crate) const MAX_NESTING: usize = 128;

/// Classification of parse failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Character outside the supported alphabet.
    Lex,
    /// Unexpected token relative to the grammar.
    Syntax,
    /// Identifier declared twice in the same function scope.
    DuplicateDeclaration,
    /// Use of an identifier that was never declared.
    UndeclaredVariable,
    /// An `int` function whose final block never returns.
    MissingReturn,
    /// Indexing a non-array, array used without an index, or a return
    /// value that disagrees with the declared return kind.
    TypeMismatch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::Lex => "Lexer error",
            ErrorKind::Syntax => "Syntax error",
            ErrorKind::DuplicateDeclaration => "Duplicate declaration",
            ErrorKind::UndeclaredVariable => "Undeclared variable",
            ErrorKind::MissingReturn => "Missing return",
            ErrorKind::TypeMismatch => "Type mismatch",
        };
        write!(f, "{}", text)
    }
}

/// Parser error type
#[derive(Debug, Clone)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}: {}", self.kind, self.line, self.message)
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError {
            kind: ErrorKind::Lex,
            message: err.message,
            line: err.line,
        }
    }
}

/// Recursive descent parser for a single C-subset function.
///
/// [`Parser::new`] tokenizes the source; [`Parser::parse`] runs the whole
/// pipeline and stores the lowered [`Function`], after which the query
/// methods expose it read-only. Each instance owns its token stream,
/// symbol table and block builder exclusively, so independent instances
/// can run on separate threads without synchronization.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) depth: usize,
    pub(crate) symbols: SymbolTable,
    pub(crate) builder: CfgBuilder,
    pub(crate) return_kind: ReturnKind,
    pub(crate) function: Option<Function>,
}

impl Parser {
    /// Tokenizes `source`. Lexical errors surface here, before any grammar
    /// work starts.
    pub fn new(source: &str) -> Result<Self, CompileError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            depth: 0,
            symbols: SymbolTable::new(),
            builder: CfgBuilder::new(),
            return_kind: ReturnKind::Void,
            function: None,
        })
    }

    /// Parses the function and builds its basic-block IR.
    ///
    /// All per-parse state is reset first, so calling this again re-runs
    /// the pipeline from scratch and produces identical IR.
    pub fn parse(&mut self) -> Result<(), CompileError> {
        self.position = 0;
        self.depth = 0;
        self.symbols = SymbolTable::new();
        self.builder = CfgBuilder::new();
        self.return_kind = ReturnKind::Void;
        self.function = None;

        let function = self.parse_function()?;
        self.function = Some(function);
        Ok(())
    }

    // ===== Query interface (valid after a successful parse) =====

    /// The parsed function.
    ///
    /// # Panics
    /// Panics if [`Parser::parse`] has not completed successfully.
    pub fn function(&self) -> &Function {
        self.function
            .as_ref()
            .expect("query before a successful parse()")
    }

    /// Name of the parsed function.
    pub fn function_name(&self) -> &str {
        self.function().name()
    }

    /// Declared return kind of the parsed function.
    pub fn return_kind(&self) -> ReturnKind {
        self.function().return_kind()
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        self.function().parameters()
    }

    /// Basic blocks in creation order; the entry block is index 0.
    pub fn basic_blocks(&self) -> &[BasicBlock] {
        self.function().basic_blocks()
    }

    // ===== Error helpers =====

    pub(crate) fn error_at(&self, line: usize, kind: ErrorKind, message: String) -> CompileError {
        CompileError {
            kind,
            message,
            line,
        }
    }

    pub(crate) fn syntax_error(&self, message: String) -> CompileError {
        self.error_at(self.current_line(), ErrorKind::Syntax, message)
    }

    /// Declares `name`, attaching `line` to a duplicate-declaration error.
    pub(crate) fn declare(
        &mut self,
        name: &str,
        kind: VarKind,
        line: usize,
    ) -> Result<(), CompileError> {
        if self.symbols.declare(name, kind).is_none() {
            return Err(self.error_at(
                line,
                ErrorKind::DuplicateDeclaration,
                format!("'{}' is already declared in this function", name),
            ));
        }
        Ok(())
    }

    /// Looks up `name` and returns its kind, attaching `line` to an
    /// undeclared-variable error.
    pub(crate) fn lookup_kind(&self, name: &str, line: usize) -> Result<VarKind, CompileError> {
        match self.symbols.lookup(name) {
            Some(var) => Ok(var.kind()),
            None => Err(self.error_at(
                line,
                ErrorKind::UndeclaredVariable,
                format!("'{}' is not declared", name),
            )),
        }
    }

    // ===== Nesting guard =====

    pub(crate) fn descend(&mut self) -> Result<(), CompileError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.syntax_error("Nesting too deep".to_string()));
        }
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth -= 1;
    }

    // ===== Statement emission =====

    /// Appends a statement to the open block, opening a fresh one first if
    /// the previous statement was a terminator (unreachable trailing code
    /// lands in that fresh, never-targeted block).
    pub(crate) fn emit(&mut self, stmt: Statement) {
        if self.builder.current_terminated() {
            let label = self.builder.new_label();
            self.builder.start_block(label);
        }
        self.builder.append(stmt);
    }

    // ===== Token helpers =====

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if std::mem::discriminant(self.peek()) == std::mem::discriminant(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position - 1]
    }

    pub(crate) fn previous_line(&self) -> usize {
        self.previous().line()
    }

    pub(crate) fn current_line(&self) -> usize {
        self.peek().line()
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), CompileError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(format!("{}, found {}", message, self.peek())))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::LParen(self.current_line()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::RParen(self.current_line()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::RBrace(self.current_line()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_rbracket(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::RBracket(self.current_line()),
            &format!("Expected ']' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), CompileError> {
        self.expect_token(
            &Token::Semicolon(self.current_line()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, CompileError> {
        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.syntax_error(format!("Expected identifier, found {}", self.peek())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Opcode;

    #[test]
    fn test_parse_simple_function() {
        let mut parser = Parser::new("int f(int a) { return a; }").unwrap();
        parser.parse().unwrap();

        assert_eq!(parser.function_name(), "f");
        assert_eq!(parser.return_kind(), ReturnKind::Int);
        assert_eq!(parser.parameters().len(), 1);
        assert_eq!(parser.parameters()[0].name(), "a");
        assert!(!parser.parameters()[0].is_array());
        assert_eq!(parser.basic_blocks().len(), 1);
        assert_eq!(
            parser.basic_blocks()[0].statements()[0].opcode(),
            Opcode::Ret
        );
    }

    #[test]
    fn test_first_error_wins() {
        // The undeclared `y` on line 2 is reported, not the one on line 3.
        let mut parser = Parser::new("int f() {\n x = y;\n z = 1;\n return 0; }").unwrap();
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndeclaredVariable);
        assert_eq!(err.line, 2);
    }

    #[test]
    #[should_panic(expected = "query before a successful parse")]
    fn test_query_before_parse_panics() {
        let parser = Parser::new("int f() { return 0; }").unwrap();
        let _ = parser.function_name();
    }

    #[test]
    fn test_reparse_resets_state() {
        let mut parser = Parser::new("int f(int a) { return a + a; }").unwrap();
        parser.parse().unwrap();
        let first = parser.function().clone();
        parser.parse().unwrap();
        assert_eq!(&first, parser.function());
    }

    #[test]
    fn test_error_display() {
        let err = CompileError {
            kind: ErrorKind::TypeMismatch,
            message: "'a' is not an array".to_string(),
            line: 4,
        };
        assert_eq!(err.to_string(), "Type mismatch at line 4: 'a' is not an array");
    }
}
