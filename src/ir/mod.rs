//! Basic-block IR produced by the parser
//!
//! A parsed function is a [`Function`]: metadata (name, return kind,
//! parameters) plus an ordered list of labeled [`BasicBlock`]s holding
//! linear three-address [`Statement`]s. Blocks reference each other only
//! through [`Operand::Label`] operands of branch statements, so loop back
//! edges are plain label lookups rather than ownership cycles.
//!
//! Everything here is immutable once the parse that built it succeeds;
//! consumers (printer, scheduler, code generator) read it through the
//! accessor methods.

pub(crate) mod builder;

/// Return kind of a parsed function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    Int,
    Void,
}

/// Statement opcodes.
///
/// The set covers what the front end emits today; consumers should treat it
/// as open to extension rather than exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Comparison
    CmpLt,
    CmpLe,
    CmpGt,
    CmpGe,
    CmpEq,
    CmpNe,
    // Memory
    Load,
    Store,
    // Control transfer
    Br,
    Cbr,
    Ret,
}

impl Opcode {
    /// Whether a statement with this opcode ends its basic block.
    pub fn is_terminator(self) -> bool {
        matches!(self, Opcode::Br | Opcode::Cbr | Opcode::Ret)
    }
}

/// A statement operand.
///
/// Compiler-generated temporaries are a separate variant rather than a
/// naming convention, so they can never collide with source identifiers.
/// Branch targets appear as [`Operand::Label`] so that edges are visible
/// through the ordinary operand accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A source-declared variable, referenced by name.
    Var(String),
    /// An integer literal.
    Const(i32),
    /// A compiler-generated temporary, numbered per function.
    Temp(usize),
    /// A basic-block label (branch target).
    Label(String),
}

/// A three-address statement: opcode, optional destination, source operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    opcode: Opcode,
    dest: Option<Operand>,
    operands: Vec<Operand>,
}

impl Statement {
    pub(crate) fn new(opcode: Opcode, dest: Option<Operand>, operands: Vec<Operand>) -> Self {
        Self {
            opcode,
            dest,
            operands,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn destination(&self) -> Option<&Operand> {
        self.dest.as_ref()
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Returns the `i`-th source operand. Panics if `i` is out of range.
    pub fn operand(&self, i: usize) -> &Operand {
        &self.operands[i]
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }
}

/// How a basic block ends, implied by its last statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorKind {
    /// No terminator yet; the block falls through to the next one in
    /// creation order.
    None,
    /// Unconditional branch.
    Branch,
    /// Conditional branch with two targets.
    CondBranch,
    /// Function return.
    Return,
}

/// A maximal straight-line statement sequence with one entry (its label)
/// and one exit (its terminator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicBlock {
    label: String,
    statements: Vec<Statement>,
}

impl BasicBlock {
    pub(crate) fn new(label: String) -> Self {
        Self {
            label,
            statements: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, stmt: Statement) {
        self.statements.push(stmt);
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.statements
            .last()
            .is_some_and(|stmt| stmt.opcode().is_terminator())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn terminator(&self) -> TerminatorKind {
        match self.statements.last().map(Statement::opcode) {
            Some(Opcode::Br) => TerminatorKind::Branch,
            Some(Opcode::Cbr) => TerminatorKind::CondBranch,
            Some(Opcode::Ret) => TerminatorKind::Return,
            _ => TerminatorKind::None,
        }
    }
}

/// A function parameter: name plus whether it was declared as an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    is_array: bool,
}

impl Parameter {
    pub(crate) fn new(name: String, is_array: bool) -> Self {
        Self { name, is_array }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }
}

/// A fully lowered function: metadata plus its basic blocks.
///
/// The entry block is always index 0; the rest follow in creation order,
/// which is the order consumers observe (not a reverse postorder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
    return_kind: ReturnKind,
    params: Vec<Parameter>,
    blocks: Vec<BasicBlock>,
}

impl Function {
    pub(crate) fn new(
        name: String,
        return_kind: ReturnKind,
        params: Vec<Parameter>,
        blocks: Vec<BasicBlock>,
    ) -> Self {
        Self {
            name,
            return_kind,
            params,
            blocks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_kind(&self) -> ReturnKind {
        self.return_kind
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub fn basic_blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Looks up a block by label.
    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|block| block.label() == label)
    }
}
