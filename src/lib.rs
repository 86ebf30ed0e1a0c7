//! # Introduction
//!
//! cflow is the front end of a miniature compiler: it parses the source
//! text of a single function written in a restricted C subset and lowers
//! it into an intermediate representation of function metadata plus
//! labeled basic blocks of linear, three-address statements. Later stages
//! (printing, scheduling, code generation) consume the IR through the
//! query interface on [`parser::parse::Parser`].
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser (lowering + CFG construction) → Function IR
//! ```
//!
//! 1. [`parser`] — tokenizes the source and runs a recursive-descent parse
//!    that lowers expressions into temporaries and linearizes control flow
//!    into branch-wired basic blocks, in a single pass.
//! 2. [`ir`] — the resulting data model: [`ir::Function`],
//!    [`ir::BasicBlock`], [`ir::Statement`], [`ir::Operand`].
//!
//! Parsing stops at the first error and reports its kind together with the
//! 1-based source line. On success the IR is immutable and reproducible:
//! independent parses of the same text yield identical labels and
//! temporary numbering.
//!
//! ## Example
//!
//! ```
//! use cflow::parser::parse::Parser;
//!
//! let mut parser = Parser::new("int f(int a) { return a; }").unwrap();
//! parser.parse().unwrap();
//! assert_eq!(parser.function_name(), "f");
//! assert_eq!(parser.basic_blocks().len(), 1);
//! ```

pub mod ir;
pub mod parser;
