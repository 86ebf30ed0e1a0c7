//! Function signature parsing
//!
//! Recognizes `('int' | 'void') name '(' params ')' '{' body '}'` for
//! exactly one function per source, declares the parameters, opens the
//! entry block, drives the statement parser over the body, and performs
//! the implicit close: a `void` function that falls off the end gets a
//! return statement, an `int` function that does so is an error.

use crate::ir::{Function, Opcode, Parameter, ReturnKind, Statement};
use crate::parser::lexer::Token;
use crate::parser::parse::{CompileError, ErrorKind, Parser};
use crate::parser::symbols::VarKind;

impl Parser {
    /// Parse the whole function: signature, body, implicit close.
    pub(crate) fn parse_function(&mut self) -> Result<Function, CompileError> {
        let return_kind = if self.match_token(&Token::Int(self.current_line())) {
            ReturnKind::Int
        } else if self.match_token(&Token::Void(self.current_line())) {
            ReturnKind::Void
        } else {
            return Err(self.syntax_error(format!(
                "Expected 'int' or 'void' return type, found {}",
                self.peek()
            )));
        };
        self.return_kind = return_kind;

        let name = self.expect_identifier()?;

        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        self.expect_token(
            &Token::LBrace(self.current_line()),
            "Expected '{' before function body",
        )?;

        let entry = self.builder.new_label();
        self.builder.start_block(entry);

        while !self.check(&Token::RBrace(self.current_line())) && !self.is_at_end() {
            self.parse_statement()?;
        }

        let close_line = self.current_line();
        self.expect_rbrace("after function body")?;

        if self.builder.has_open_unterminated() {
            match return_kind {
                ReturnKind::Void => self.emit(Statement::new(Opcode::Ret, None, Vec::new())),
                ReturnKind::Int => {
                    return Err(self.error_at(
                        close_line,
                        ErrorKind::MissingReturn,
                        format!("Function '{}' must return a value on every path", name),
                    ));
                }
            }
        }

        if !self.is_at_end() {
            return Err(
                self.syntax_error(format!("Unexpected {} after function body", self.peek()))
            );
        }

        Ok(Function::new(
            name,
            return_kind,
            params,
            self.builder.take_blocks(),
        ))
    }

    /// Parse parameter list: empty, `(void)`, or `int name[[N]]`, comma
    /// separated. Array sizes are accepted but only the array kind is kept.
    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, CompileError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_line())) {
            return Ok(params);
        }

        // (void) means no parameters in C
        if self.check(&Token::Void(self.current_line())) {
            self.advance();
            return Ok(params);
        }

        loop {
            self.expect_token(
                &Token::Int(self.current_line()),
                "Expected parameter type 'int'",
            )?;

            let line = self.current_line();
            let name = self.expect_identifier()?;

            let mut kind = VarKind::Scalar;
            if self.match_token(&Token::LBracket(self.current_line())) {
                if matches!(self.peek(), Token::IntLit(_, _)) {
                    self.advance();
                }
                self.expect_rbracket("after array parameter")?;
                kind = VarKind::Array;
            }

            self.declare(&name, kind, line)?;
            params.push(Parameter::new(name, kind == VarKind::Array));

            if !self.match_token(&Token::Comma(self.current_line())) {
                break;
            }
        }

        Ok(params)
    }
}
