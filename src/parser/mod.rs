//! C-subset source parser
//!
//! This module transforms the source text of a single function directly
//! into basic-block IR:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`symbols`]: Per-function symbol table
//! - [`parse`]: Parser struct, error types, and the query interface
//! - `declarations` / `statements` / `expressions`: the recursive descent
//!   grammar, split into `impl Parser` blocks
//!
//! # Supported subset
//!
//! - Functions: one per source, returning `int` or `void`, with scalar and
//!   array parameters
//! - Statements: local declarations, assignments (scalar and array
//!   element), `if`/`else`, `while`, `return`
//! - Expressions: integer arithmetic (`+ - * /`), comparisons
//!   (`< <= > >= == !=`), unary `-`/`+`, parentheses, array indexing
//! - No preprocessor, pointers, calls, or nested scopes
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent over the token stream. There is no
//! separate syntax tree: expressions lower to three-address statements as
//! they are recognized, and control flow is linearized into labeled basic
//! blocks on the fly.

pub mod lexer;
pub mod parse;
pub mod symbols;

mod declarations;
mod expressions;
mod statements;
