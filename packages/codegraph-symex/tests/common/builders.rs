//! Test data builders
//!
//! Builders for method symbols and their bodies.

use codegraph_symex::shared::models::{
    BlockId, CatchHandler, CfgBuilder, Instruction, Invocation, MethodFlags, MethodId,
    MethodSymbol, Nullability, SemanticModel, Symbol, SymbolId, SymbolKind, Terminator,
};

/// Builder for a method and its control flow graph
///
/// The first block allocated is the entry block.
pub struct MethodBuilder<'m> {
    model: &'m mut SemanticModel,
    method: MethodSymbol,
    cfg: CfgBuilder,
    entry: Option<BlockId>,
}

impl<'m> MethodBuilder<'m> {
    pub fn new(model: &'m mut SemanticModel, signature: &str) -> Self {
        Self {
            model,
            method: MethodSymbol::new(signature).expect("valid signature"),
            cfg: CfgBuilder::new(),
            entry: None,
        }
    }

    /// Add a parameter symbol
    pub fn param(&mut self, name: &str, type_name: &str) -> SymbolId {
        self.param_with(name, type_name, Nullability::Unknown)
    }

    pub fn param_with(&mut self, name: &str, type_name: &str, nullability: Nullability) -> SymbolId {
        let id = self.model.add_symbol(
            Symbol::new(name, SymbolKind::Parameter, type_name).with_nullability(nullability),
        );
        self.method.parameters.push(id);
        id
    }

    pub fn local(&mut self, name: &str, type_name: &str) -> SymbolId {
        self.model
            .add_symbol(Symbol::new(name, SymbolKind::Local, type_name))
    }

    pub fn flags(&mut self, flags: MethodFlags) -> &mut Self {
        self.method.flags = flags;
        self
    }

    pub fn declared_exception(&mut self, exception_type: &str) -> &mut Self {
        self.method.declared_exceptions.push(exception_type.to_string());
        self
    }

    pub fn exit(&self) -> BlockId {
        self.cfg.exit()
    }

    pub fn block(&mut self) -> BlockId {
        let id = self.cfg.block();
        self.entry.get_or_insert(id);
        id
    }

    /// Block holding `instructions`, ended by `terminator`
    pub fn block_with(&mut self, instructions: Vec<Instruction>, terminator: Terminator) -> BlockId {
        let id = self.block();
        self.fill(id, instructions, terminator);
        id
    }

    /// Populate a block allocated earlier
    pub fn fill(&mut self, block: BlockId, instructions: Vec<Instruction>, terminator: Terminator) {
        for instruction in instructions {
            self.cfg.push(block, instruction);
        }
        self.cfg.terminate(block, terminator);
    }

    pub fn handler(&mut self, block: BlockId, exception_type: &str, target: BlockId, parameter: Option<SymbolId>) {
        self.cfg.handler(
            block,
            CatchHandler {
                exception_type: exception_type.to_string(),
                target,
                parameter,
            },
        );
    }

    /// Register the method with its body
    pub fn build(self) -> MethodId {
        let MethodBuilder {
            model,
            mut method,
            cfg,
            entry,
        } = self;
        let entry = entry.unwrap_or_else(|| cfg.exit());
        method.body = Some(cfg.build(entry));
        model.add_method(method)
    }

    /// Register the method without a body
    pub fn build_without_body(self) -> MethodId {
        self.model.add_method(self.method)
    }
}

/// Static call
pub fn call(signature: &str, arguments: usize) -> Instruction {
    Instruction::Invoke(Invocation {
        signature: signature.to_string(),
        arguments,
        receiver: false,
    })
}

/// Instance call; the receiver is pushed before the arguments
pub fn call_on(signature: &str, arguments: usize) -> Instruction {
    Instruction::Invoke(Invocation {
        signature: signature.to_string(),
        arguments,
        receiver: true,
    })
}
