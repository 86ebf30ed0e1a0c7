//! Control-flow-graph construction
//!
//! [`CfgBuilder`] owns the growing block list while a function body is being
//! parsed. Blocks are kept in creation order and the open block is always
//! the most recently created one; a block that is closed without an explicit
//! terminator falls through to the next block in creation order.
//!
//! Label and temporary counters live here so that every parser instance
//! numbers its labels and temporaries independently, making output
//! reproducible across runs.

use crate::ir::{BasicBlock, Operand, Statement};

/// Builds the ordered basic-block list for one function.
#[derive(Debug, Default)]
pub(crate) struct CfgBuilder {
    blocks: Vec<BasicBlock>,
    next_label: usize,
    next_temp: usize,
}

impl CfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh block label (`L0`, `L1`, ...).
    pub fn new_label(&mut self) -> String {
        let label = format!("L{}", self.next_label);
        self.next_label += 1;
        label
    }

    /// Allocates a fresh temporary, numbered per function.
    pub fn new_temp(&mut self) -> Operand {
        let temp = Operand::Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    /// Opens a new block under `label`. The previously open block is closed
    /// as-is; without a terminator it falls through to this one.
    pub fn start_block(&mut self, label: String) {
        self.blocks.push(BasicBlock::new(label));
    }

    /// Whether the open block already ends in a branch or return.
    ///
    /// Reports true when no block exists yet, so callers that lazily open
    /// blocks treat both states the same way.
    pub fn current_terminated(&self) -> bool {
        self.blocks.last().map_or(true, BasicBlock::is_terminated)
    }

    /// True if a block is open and still accepts statements.
    pub fn has_open_unterminated(&self) -> bool {
        !self.current_terminated()
    }

    /// Appends a statement to the open block.
    ///
    /// Appending after a terminator (or before any block is open) is an
    /// internal invariant violation; the statement parser's state machine
    /// never does it, so it fails fast rather than returning an error.
    pub fn append(&mut self, stmt: Statement) {
        assert!(
            !self.current_terminated(),
            "statement appended after a block terminator"
        );
        self.blocks
            .last_mut()
            .expect("no open block to append to")
            .push(stmt);
    }

    /// Hands the finished blocks over, in creation order.
    pub fn take_blocks(&mut self) -> Vec<BasicBlock> {
        std::mem::take(&mut self.blocks)
    }
}
