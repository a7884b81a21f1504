use std::sync::Arc;

use ms_core::ast::Block;

use super::lifecycle::RuntimeFrame;
use super::ModScriptEngine;
use crate::context::ScopeKind;
use crate::proxy::FunctionProxy;

impl<P: FunctionProxy> ModScriptEngine<P> {
    pub(super) fn advance(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.node_index += 1;
        }
    }

    /// Every frame above the root owns exactly one context scope.
    pub(super) fn enter_block(&mut self, block: &Block, kind: ScopeKind) {
        self.context.push_scope(kind);
        self.frames.push(RuntimeFrame {
            block: Arc::clone(&block.statements),
            node_index: 0,
        });
        tracing::trace!(depth = self.block_depth(), ?kind, "entered block");
    }

    pub(super) fn leave_block(&mut self) {
        if self.frames.len() <= 1 {
            return;
        }
        self.frames.pop();
        self.context.pop_scope();
        tracing::trace!(depth = self.block_depth(), "left block");
    }
}
