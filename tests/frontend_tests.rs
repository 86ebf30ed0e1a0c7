// End-to-end tests for the C-subset front end: parse a function, then
// inspect the result through the query interface.

use cflow::ir::{Opcode, Operand, ReturnKind, TerminatorKind};
use cflow::parser::parse::{ErrorKind, Parser};

fn parsed(source: &str) -> Parser {
    let mut parser = Parser::new(source).expect("lexing failed");
    parser.parse().expect("parsing failed");
    parser
}

fn parse_err(source: &str) -> cflow::parser::parse::CompileError {
    match Parser::new(source) {
        Ok(mut parser) => parser.parse().expect_err("expected a parse failure"),
        Err(err) => err,
    }
}

#[test]
fn test_identity_function() {
    let parser = parsed("int f(int a){ return a; }");

    assert_eq!(parser.function_name(), "f");
    assert_eq!(parser.return_kind(), ReturnKind::Int);

    let params = parser.parameters();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name(), "a");
    assert!(!params[0].is_array());

    let blocks = parser.basic_blocks();
    assert_eq!(blocks.len(), 1);
    let stmts = blocks[0].statements();
    assert_eq!(stmts.len(), 1);
    assert_eq!(stmts[0].opcode(), Opcode::Ret);
    assert_eq!(stmts[0].operand_count(), 1);
    assert_eq!(stmts[0].operand(0), &Operand::Var("a".to_string()));
}

#[test]
fn test_array_element_store() {
    let parser = parsed("void f(int a[]){ a[0] = 1; }");

    let params = parser.parameters();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name(), "a");
    assert!(params[0].is_array());

    let blocks = parser.basic_blocks();
    assert_eq!(blocks.len(), 1);

    let store = &blocks[0].statements()[0];
    assert_eq!(store.opcode(), Opcode::Store);
    assert_eq!(store.destination(), Some(&Operand::Var("a".to_string())));
    assert_eq!(store.operand(0), &Operand::Const(1));
    assert_eq!(store.operand(1), &Operand::Const(0));

    // The void function is closed with an implicit return.
    assert_eq!(blocks[0].terminator(), TerminatorKind::Return);
}

#[test]
fn test_if_produces_three_blocks() {
    let parser = parsed("int f(int a){ if(a) return 1; return 0; }");

    let blocks = parser.basic_blocks();
    assert_eq!(blocks.len(), 3);

    let entry = &blocks[0];
    assert_eq!(entry.terminator(), TerminatorKind::CondBranch);
    let cbr = entry.statements().last().unwrap();
    assert_eq!(cbr.opcode(), Opcode::Cbr);
    assert_eq!(cbr.operand(0), &Operand::Var("a".to_string()));
    assert_eq!(cbr.operand(1), &Operand::Label(blocks[1].label().to_string()));
    assert_eq!(cbr.operand(2), &Operand::Label(blocks[2].label().to_string()));

    let then_ret = blocks[1].statements().last().unwrap();
    assert_eq!(then_ret.opcode(), Opcode::Ret);
    assert_eq!(then_ret.operand(0), &Operand::Const(1));

    let join_ret = blocks[2].statements().last().unwrap();
    assert_eq!(join_ret.opcode(), Opcode::Ret);
    assert_eq!(join_ret.operand(0), &Operand::Const(0));
}

#[test]
fn test_missing_semicolon_is_a_syntax_error() {
    let err = parse_err("int f(int a) { return }");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.line, 1);
}

#[test]
fn test_queries_unavailable_after_failure() {
    let mut parser = Parser::new("int f(int a) { return }").unwrap();
    assert!(parser.parse().is_err());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        parser.basic_blocks().len()
    }));
    assert!(result.is_err());
}

#[test]
fn test_int_function_without_return() {
    let err = parse_err("int f(){ }");
    assert_eq!(err.kind, ErrorKind::MissingReturn);
}

#[test]
fn test_void_function_without_return_is_fine() {
    let parser = parsed("void f(){ }");
    let blocks = parser.basic_blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].statements().len(), 1);
    assert_eq!(blocks[0].statements()[0].opcode(), Opcode::Ret);
    assert_eq!(blocks[0].statements()[0].operand_count(), 0);
}

#[test]
fn test_if_with_fallthrough_needs_return_after() {
    // The false path reaches the end of the body without returning.
    let err = parse_err("int f(int a){ if(a) return 1; }");
    assert_eq!(err.kind, ErrorKind::MissingReturn);
}

#[test]
fn test_dotprod_style_function() {
    let source = r#"
        int dotprod(int a[], int b[], int n) {
            int sum;
            int i;
            sum = 0;
            i = 0;
            while (i < n) {
                sum = sum + a[i] * b[i];
                i = i + 1;
            }
            return sum;
        }
    "#;
    let parser = parsed(source);

    assert_eq!(parser.function_name(), "dotprod");
    assert_eq!(parser.return_kind(), ReturnKind::Int);

    let params = parser.parameters();
    assert_eq!(params.len(), 3);
    assert!(params[0].is_array());
    assert!(params[1].is_array());
    assert!(!params[2].is_array());

    // entry, loop header, loop body, after
    let blocks = parser.basic_blocks();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[1].terminator(), TerminatorKind::CondBranch);
    assert_eq!(blocks[2].terminator(), TerminatorKind::Branch);
    assert_eq!(blocks[3].terminator(), TerminatorKind::Return);

    // The body loads both arrays and multiplies them.
    let body_opcodes: Vec<Opcode> = blocks[2]
        .statements()
        .iter()
        .map(|stmt| stmt.opcode())
        .collect();
    assert!(body_opcodes.contains(&Opcode::Load));
    assert!(body_opcodes.contains(&Opcode::Mul));
}

#[test]
fn test_error_lines_point_at_the_offense() {
    let err = parse_err("int f(int a) {\n    a = 1;\n    b = 2;\n    return a;\n}");
    assert_eq!(err.kind, ErrorKind::UndeclaredVariable);
    assert_eq!(err.line, 3);

    let err = parse_err("void f() {\n    int x;\n    int x;\n}");
    assert_eq!(err.kind, ErrorKind::DuplicateDeclaration);
    assert_eq!(err.line, 3);

    let err = parse_err("void f() {\n    int x;\n    x = $;\n}");
    assert_eq!(err.kind, ErrorKind::Lex);
    assert_eq!(err.line, 3);
}

#[test]
fn test_comments_are_ignored() {
    let parser = parsed(
        "int f(int a) { // add one\n    /* then\n       return */ return a + 1;\n}",
    );
    let stmts = parser.basic_blocks()[0].statements();
    assert_eq!(stmts[0].opcode(), Opcode::Add);
    assert_eq!(stmts[1].opcode(), Opcode::Ret);
}

#[test]
fn test_local_array_declaration_and_use() {
    let source = r#"
        void f(int n) {
            int buf[8];
            buf[n] = n * 2;
            n = buf[n];
        }
    "#;
    let parser = parsed(source);
    let stmts = parser.basic_blocks()[0].statements();

    assert_eq!(stmts[0].opcode(), Opcode::Mul);
    assert_eq!(stmts[1].opcode(), Opcode::Store);
    assert_eq!(stmts[1].destination(), Some(&Operand::Var("buf".to_string())));
    assert_eq!(stmts[1].operand_count(), 2);
    assert_eq!(stmts[2].opcode(), Opcode::Load);
    assert_eq!(stmts[3].opcode(), Opcode::Store);
}
