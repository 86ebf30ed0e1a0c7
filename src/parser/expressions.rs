//! Expression lowering
//!
//! Recursive descent over the expression grammar, emitting three-address
//! statements into the current block as it goes. Every method returns the
//! [`Operand`] holding its value; binary operations allocate a fresh
//! temporary per result, and array indexing becomes a load into a
//! temporary.
//!
//! Precedence, lowest to highest:
//!
//! ```text
//! comparison ::= additive (('<' | '<=' | '>' | '>=' | '==' | '!=') additive)*
//! additive   ::= multiplicative (('+' | '-') multiplicative)*
//! multiplicative ::= unary (('*' | '/') unary)*
//! unary      ::= ('-' | '+') unary | primary
//! primary    ::= literal | name | name '[' expression ']' | '(' expression ')'
//! ```
//!
//! Division by a literal zero is a runtime concern and is not rejected
//! here. All parsing methods are implemented as `pub(crate)` methods on
//! the [`Parser`] struct.

use crate::ir::{Opcode, Operand, Statement};
use crate::parser::lexer::Token;
use crate::parser::parse::{CompileError, ErrorKind, Parser};
use crate::parser::symbols::VarKind;

impl Parser {
    /// Lower an expression (top-level entry point, depth-guarded).
    pub(crate) fn lower_expression(&mut self) -> Result<Operand, CompileError> {
        self.descend()?;
        let result = self.lower_comparison();
        self.ascend();
        result
    }

    /// Lower comparisons (< <= > >= == !=), left-associative.
    fn lower_comparison(&mut self) -> Result<Operand, CompileError> {
        let mut lhs = self.lower_additive()?;

        loop {
            let line = self.current_line();
            let opcode = if self.match_token(&Token::Lt(line)) {
                Opcode::CmpLt
            } else if self.match_token(&Token::Le(line)) {
                Opcode::CmpLe
            } else if self.match_token(&Token::Gt(line)) {
                Opcode::CmpGt
            } else if self.match_token(&Token::Ge(line)) {
                Opcode::CmpGe
            } else if self.match_token(&Token::EqEq(line)) {
                Opcode::CmpEq
            } else if self.match_token(&Token::NotEq(line)) {
                Opcode::CmpNe
            } else {
                break;
            };

            let rhs = self.lower_additive()?;
            lhs = self.emit_binary(opcode, lhs, rhs);
        }

        Ok(lhs)
    }

    /// Lower additive (+ -)
    fn lower_additive(&mut self) -> Result<Operand, CompileError> {
        let mut lhs = self.lower_multiplicative()?;

        loop {
            let line = self.current_line();
            let opcode = if self.match_token(&Token::Plus(line)) {
                Opcode::Add
            } else if self.match_token(&Token::Minus(line)) {
                Opcode::Sub
            } else {
                break;
            };

            let rhs = self.lower_multiplicative()?;
            lhs = self.emit_binary(opcode, lhs, rhs);
        }

        Ok(lhs)
    }

    /// Lower multiplicative (* /)
    fn lower_multiplicative(&mut self) -> Result<Operand, CompileError> {
        let mut lhs = self.lower_unary()?;

        loop {
            let line = self.current_line();
            let opcode = if self.match_token(&Token::Star(line)) {
                Opcode::Mul
            } else if self.match_token(&Token::Slash(line)) {
                Opcode::Div
            } else {
                break;
            };

            let rhs = self.lower_unary()?;
            lhs = self.emit_binary(opcode, lhs, rhs);
        }

        Ok(lhs)
    }

    /// Lower unary (- +). Negation has no opcode of its own; it lowers as
    /// a subtraction from zero.
    fn lower_unary(&mut self) -> Result<Operand, CompileError> {
        let line = self.current_line();

        if self.match_token(&Token::Minus(line)) {
            self.descend()?;
            let operand = self.lower_unary();
            self.ascend();
            return Ok(self.emit_binary(Opcode::Sub, Operand::Const(0), operand?));
        }

        if self.match_token(&Token::Plus(line)) {
            self.descend()?;
            let operand = self.lower_unary();
            self.ascend();
            return operand;
        }

        self.lower_primary()
    }

    /// Lower primary: literal, variable, array index, parenthesized
    /// expression.
    fn lower_primary(&mut self) -> Result<Operand, CompileError> {
        let line = self.current_line();

        if let Token::IntLit(value, _) = self.peek() {
            let value = *value;
            self.advance();
            return Ok(Operand::Const(value));
        }

        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
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
                let dest = self.builder.new_temp();
                self.emit(Statement::new(
                    Opcode::Load,
                    Some(dest.clone()),
                    vec![Operand::Var(name), index],
                ));
                return Ok(dest);
            }

            if kind == VarKind::Array {
                return Err(self.error_at(
                    line,
                    ErrorKind::TypeMismatch,
                    format!("Array '{}' used without an index", name),
                ));
            }
            return Ok(Operand::Var(name));
        }

        if self.match_token(&Token::LParen(line)) {
            let value = self.lower_expression()?;
            self.expect_rparen("after expression")?;
            return Ok(value);
        }

        Err(self.syntax_error(format!("Expected expression, found {}", self.peek())))
    }

    /// Emit one binary three-address statement into a fresh temporary and
    /// return that temporary.
    fn emit_binary(&mut self, opcode: Opcode, lhs: Operand, rhs: Operand) -> Operand {
        let dest = self.builder.new_temp();
        self.emit(Statement::new(opcode, Some(dest.clone()), vec![lhs, rhs]));
        dest
    }
}
