//! Statement parsing and control-flow linearization
//!
//! Recognizes the statement forms of the subset and drives the block
//! builder so that nested control flow comes out as a flat list of labeled
//! basic blocks wired together by explicit branch statements:
//!
//! - Declarations: `int x;`, `int x = expr;`, `int a[N];`
//! - Assignment: `name = expr;`, `name[index] = expr;`
//! - Jump: `return;`, `return expr;`
//! - Control flow: `if`/`else`, `while`, with braced or single-statement
//!   bodies
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::ir::{Opcode, Operand, ReturnKind, Statement};
use crate::parser::lexer::Token;
use crate::parser::parse::{CompileError, ErrorKind, Parser};
use crate::parser::symbols::VarKind;

impl Parser {
    /// Parse a statement (depth-guarded against pathological nesting).
    pub(crate) fn parse_statement(&mut self) -> Result<(), CompileError> {
        self.descend()?;
        let result = self.parse_statement_inner();
        self.ascend();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<(), CompileError> {
        let line = self.current_line();

        if self.match_token(&Token::Return(line)) {
            return self.parse_return_statement();
        }

        if self.match_token(&Token::If(line)) {
            return self.parse_if_statement();
        }

        if self.match_token(&Token::While(line)) {
            return self.parse_while_statement();
        }

        if self.match_token(&Token::Int(line)) {
            return self.parse_local_declaration();
        }

        if matches!(self.peek(), Token::Ident(_, _)) {
            return self.parse_assignment();
        }

        Err(self.syntax_error(format!("Expected statement, found {}", self.peek())))
    }

    /// Parse a branch body: a braced block or a single statement.
    fn parse_branch_body(&mut self) -> Result<(), CompileError> {
        if self.match_token(&Token::LBrace(self.current_line())) {
            while !self.check(&Token::RBrace(self.current_line())) && !self.is_at_end() {
                self.parse_statement()?;
            }
            self.expect_rbrace("after block")
        } else {
            self.parse_statement()
        }
    }

    /// Parse local declaration: `int name;`, `int name = expr;` or
    /// `int name[N];`. A scalar initializer lowers to a store.
    fn parse_local_declaration(&mut self) -> Result<(), CompileError> {
        let line = self.current_line();
        let name = self.expect_identifier()?;

        if self.match_token(&Token::LBracket(self.current_line())) {
            if !matches!(self.peek(), Token::IntLit(_, _)) {
                return Err(self.syntax_error(format!(
                    "Expected constant array size, found {}",
                    self.peek()
                )));
            }
            self.advance();
            self.expect_rbracket("after array size")?;
            self.declare(&name, VarKind::Array, line)?;
            self.expect_semicolon("after array declaration")?;
            return Ok(());
        }

        self.declare(&name, VarKind::Scalar, line)?;

        if self.match_token(&Token::Eq(self.current_line())) {
            let value = self.lower_expression()?;
            self.emit(Statement::new(
                Opcode::Store,
                Some(Operand::Var(name)),
                vec![value],
            ));
        }

        self.expect_semicolon("after variable declaration")
    }

    /// Parse assignment: `name = expr;` or `name[index] = expr;`.
    fn parse_assignment(&mut self) -> Result<(), CompileError> {
        let line = self.current_line();
        let name = self.expect_identifier()?;
        let kind = self.lookup_kind(&name, line)?;

        if self.match_token(&Token::LBracket(line)) {
            if kind != VarKind::Array {
                return Err(self.error_at(
                    line,
                    ErrorKind::TypeMismatch,
                    format!("'{}' is not an array", name),
                ));
            }
            let index = self.lower_expression()?;
            self.expect_rbracket("after array index")?;
            self.expect_token(
                &Token::Eq(self.current_line()),
                "Expected '=' after array element",
            )?;
            let value = self.lower_expression()?;
            self.expect_semicolon("after assignment")?;
            self.emit(Statement::new(
                Opcode::Store,
                Some(Operand::Var(name)),
                vec![value, index],
            ));
            return Ok(());
        }

        if kind == VarKind::Array {
            return Err(self.error_at(
                line,
                ErrorKind::TypeMismatch,
                format!("Array '{}' cannot be assigned without an index", name),
            ));
        }

        self.expect_token(&Token::Eq(self.current_line()), "Expected '=' in assignment")?;
        let value = self.lower_expression()?;
        self.expect_semicolon("after assignment")?;
        self.emit(Statement::new(
            Opcode::Store,
            Some(Operand::Var(name)),
            vec![value],
        ));
        Ok(())
    }

    /// Parse return statement; the `return` keyword is already consumed.
    fn parse_return_statement(&mut self) -> Result<(), CompileError> {
        let line = self.previous_line();

        if self.match_token(&Token::Semicolon(line)) {
            if self.return_kind == ReturnKind::Int {
                return Err(self.error_at(
                    line,
                    ErrorKind::TypeMismatch,
                    "Return without a value in a function returning 'int'".to_string(),
                ));
            }
            self.emit(Statement::new(Opcode::Ret, None, Vec::new()));
            return Ok(());
        }

        if self.return_kind == ReturnKind::Void {
            return Err(self.error_at(
                line,
                ErrorKind::TypeMismatch,
                "Return with a value in a function returning 'void'".to_string(),
            ));
        }

        let value = self.lower_expression()?;
        self.expect_semicolon("after return value")?;
        self.emit(Statement::new(Opcode::Ret, None, vec![value]));
        Ok(())
    }

    /// Parse if statement; the `if` keyword is already consumed.
    ///
    /// The condition is lowered into the current block, which then ends in
    /// a conditional branch to the then label and the else-or-join label.
    /// A branch body that falls off its end branches to a join label that
    /// is allocated on first use, so an `if`/`else` whose branches both
    /// return produces no join block at all.
    fn parse_if_statement(&mut self) -> Result<(), CompileError> {
        self.expect_lparen("after 'if'")?;
        let cond = self.lower_expression()?;
        self.expect_rparen("after if condition")?;

        let then_label = self.builder.new_label();
        let merge_label = self.builder.new_label();
        self.emit(Statement::new(
            Opcode::Cbr,
            None,
            vec![
                cond,
                Operand::Label(then_label.clone()),
                Operand::Label(merge_label.clone()),
            ],
        ));

        self.builder.start_block(then_label);
        self.parse_branch_body()?;

        if self.match_token(&Token::Else(self.current_line())) {
            let mut join_label = None;
            if self.builder.has_open_unterminated() {
                let join = self.builder.new_label();
                self.emit(Statement::new(
                    Opcode::Br,
                    None,
                    vec![Operand::Label(join.clone())],
                ));
                join_label = Some(join);
            }

            self.builder.start_block(merge_label);
            self.parse_branch_body()?;

            if self.builder.has_open_unterminated() {
                let join = join_label
                    .get_or_insert_with(|| self.builder.new_label())
                    .clone();
                self.emit(Statement::new(Opcode::Br, None, vec![Operand::Label(join)]));
            }

            if let Some(join) = join_label {
                self.builder.start_block(join);
            }
        } else {
            if self.builder.has_open_unterminated() {
                self.emit(Statement::new(
                    Opcode::Br,
                    None,
                    vec![Operand::Label(merge_label.clone())],
                ));
            }
            self.builder.start_block(merge_label);
        }

        Ok(())
    }

    /// Parse while statement; the `while` keyword is already consumed.
    ///
    /// Header, body and after labels are allocated up front. The current
    /// block branches to the header, which re-evaluates the condition on
    /// every iteration and conditionally branches to the body or past the
    /// loop; the body branches back to the header.
    fn parse_while_statement(&mut self) -> Result<(), CompileError> {
        let header_label = self.builder.new_label();
        let body_label = self.builder.new_label();
        let after_label = self.builder.new_label();

        self.emit(Statement::new(
            Opcode::Br,
            None,
            vec![Operand::Label(header_label.clone())],
        ));

        self.builder.start_block(header_label.clone());
        self.expect_lparen("after 'while'")?;
        let cond = self.lower_expression()?;
        self.expect_rparen("after while condition")?;
        self.emit(Statement::new(
            Opcode::Cbr,
            None,
            vec![
                cond,
                Operand::Label(body_label.clone()),
                Operand::Label(after_label.clone()),
            ],
        ));

        self.builder.start_block(body_label);
        self.parse_branch_body()?;
        if self.builder.has_open_unterminated() {
            self.emit(Statement::new(
                Opcode::Br,
                None,
                vec![Operand::Label(header_label)],
            ));
        }

        self.builder.start_block(after_label);
        Ok(())
    }
}
