//! Exploded graph walker
//!
//! Explores one method body path by path and records a yield for every path reaching the
//! exit block.
//!
//! # Features
//!
//! - **Worklist**: FIFO (breadth-first) or LIFO (depth-first) over exploded graph nodes;
//!   a node equal to a known one is never enqueued twice
//! - **Bounds**: step budget, per-path visits of a program point, starting states and the
//!   exploded-graph-too-big guard; crossing one leaves the behavior incomplete
//! - **Calls**: complete callee behaviors are applied yield by yield; unknown or incomplete
//!   ones return a fresh value and may throw their declared exceptions
//! - **Exceptions**: routed to the innermost matching handler, or out of the method
//! - **Cleanup**: bindings of dead symbols and constraints of unreachable values are dropped
//!   at block exits so equivalent states merge
//!
//! ## Architecture
//!
//! ```text
//! explore(method)
//!   ├── in-progress behavior stored in the cache
//!   ├── starting states (parameter nullness splits)
//!   ├── loop: pop node
//!   │     ├── instruction: pre checks -> execute -> post checks -> enqueue next point
//!   │     └── terminator:  cleanup -> goto / branch (assume_dual) / return / throw / exit
//!   └── behavior completed (or left incomplete) and stored in the cache
//! ```

use petgraph::graph::NodeIndex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::config::{EngineConfig, WorklistOrder};
use crate::errors::{Result, SymexError};
use crate::features::checks::{CheckScope, CheckerDispatcher};
use crate::features::constraints::Constraint;
use crate::features::exploded_graph::domain::{
    ExplodedGraph, ExplorationOutcome, Interruption, Node, ProgramPoint,
};
use crate::features::program_state::{ConstraintManager, ProgramState};
use crate::features::symbolic_values::{RelationKind, SymbolicValue};
use crate::features::xproc::{BehaviorCache, MethodBehavior, YieldKind};
use crate::shared::models::{
    Block, BlockId, CatchHandler, ControlFlowGraph, Instruction, Invocation, LiveVariables,
    Literal, MethodId, MethodSignature, MethodSymbol, Nullability, SemanticModel, SymbolKind,
    Terminator,
};

/// Method being explored and what its exploration accumulates
struct Exploration<'m> {
    method: &'m MethodSymbol,
    cfg: &'m ControlFlowGraph,
    liveness: LiveVariables,
    behavior: MethodBehavior,
    end_of_paths: usize,
}

pub struct ExplodedGraphWalker<'a> {
    cache: &'a mut BehaviorCache,
    dispatcher: &'a mut CheckerDispatcher,
    model: &'a SemanticModel,
    config: Arc<EngineConfig>,
    manager: ConstraintManager,
    graph: ExplodedGraph,
    worklist: VecDeque<NodeIndex>,
    steps: usize,
}

impl<'a> ExplodedGraphWalker<'a> {
    pub fn new(
        cache: &'a mut BehaviorCache,
        dispatcher: &'a mut CheckerDispatcher,
        model: &'a SemanticModel,
    ) -> Self {
        let config = cache.shared_config();
        let manager = ConstraintManager::new(&config);
        Self {
            cache,
            dispatcher,
            model,
            config,
            manager,
            graph: ExplodedGraph::new(),
            worklist: VecDeque::new(),
            steps: 0,
        }
    }

    /// Explore `method_id` and store its behavior in the cache
    ///
    /// Exploration bounds are not errors: they are reported in the outcome and leave the
    /// stored behavior incomplete.
    pub fn explore(mut self, method_id: MethodId) -> Result<ExplorationOutcome> {
        let model = self.model;
        let method = model
            .method(method_id)
            .ok_or_else(|| SymexError::malformed(method_id.to_string(), "unknown method handle"))?;
        let cfg = method
            .body
            .as_ref()
            .ok_or_else(|| SymexError::malformed(method.signature.as_str(), "no body"))?;
        let signature = &method.signature;

        self.cache.method_behavior_for_symbol(method);
        self.dispatcher.init(signature);
        debug!("Exploring {} ({} blocks)", signature, cfg.len());

        let mut ex = Exploration {
            method,
            cfg,
            liveness: LiveVariables::analyze(cfg),
            behavior: MethodBehavior::for_method(method),
            end_of_paths: 0,
        };

        let interruption = match self.run(&mut ex) {
            Ok(()) => None,
            Err(error) => match Interruption::from_error(&error) {
                Some(Interruption::TooManyNestedBooleanStates) => {
                    debug!("Exploration of {} abandoned: {}", signature, error);
                    Some(Interruption::TooManyNestedBooleanStates)
                }
                Some(interruption) => {
                    warn!("{}", error);
                    Some(interruption)
                }
                None => {
                    ex.behavior.visited();
                    self.cache.store(ex.behavior);
                    return Err(error);
                }
            },
        };

        let completed = interruption.is_none();
        if completed {
            ex.behavior.completed();
            self.dispatcher.execute_check_end_of_execution(signature);
        } else {
            ex.behavior.visited();
        }
        debug!(
            "Explored {} in {} steps: {} end of path(s), {} yield(s)",
            signature,
            self.steps,
            ex.end_of_paths,
            ex.behavior.yields().len()
        );

        let outcome = ExplorationOutcome {
            steps: self.steps,
            completed,
            interruption,
            end_of_paths: ex.end_of_paths,
            nodes: self.graph.node_count(),
        };
        self.cache.store(ex.behavior);
        Ok(outcome)
    }

    // ========================================================================
    // Worklist
    // ========================================================================

    fn run(&mut self, ex: &mut Exploration<'a>) -> Result<()> {
        let cfg = ex.cfg;
        for state in self.starting_states(ex)? {
            self.enqueue(ProgramPoint::block_entry(cfg.entry()), state, None);
        }

        while let Some(idx) = self.next_node() {
            self.steps += 1;
            if self.steps > self.config.max_steps {
                return Err(SymexError::MaxStepsReached {
                    method: ex.method.signature.to_string(),
                    steps: self.config.max_steps,
                });
            }
            let Some(node) = self.graph.get(idx).cloned() else {
                continue;
            };
            trace!(
                "Step {} at {}: {} constrained value(s)",
                self.steps,
                node.point,
                node.state.constraints_size()
            );
            if self.steps + self.worklist.len() > self.config.max_steps / 2
                && node.state.constraints_size() > self.config.graph_too_big_constraints
            {
                return Err(SymexError::ExplodedGraphTooBig {
                    method: ex.method.signature.to_string(),
                    steps: self.steps,
                });
            }

            let block = cfg.block(node.point.block).ok_or_else(|| {
                SymexError::malformed(
                    ex.method.signature.as_str(),
                    format!("dangling block {}", node.point.block),
                )
            })?;
            match block.instructions.get(node.point.index) {
                Some(instruction) => self.execute_instruction(ex, idx, node, instruction)?,
                None => self.execute_terminator(ex, idx, node, block)?,
            }
        }
        Ok(())
    }

    fn next_node(&mut self) -> Option<NodeIndex> {
        match self.config.worklist_order {
            WorklistOrder::Fifo => self.worklist.pop_front(),
            WorklistOrder::Lifo => self.worklist.pop_back(),
        }
    }

    fn enqueue(&mut self, point: ProgramPoint, state: ProgramState, from: Option<NodeIndex>) {
        if state.number_of_time_visited(point) as usize >= self.config.max_exec_program_point {
            trace!("Dropping path: {} visited too often", point);
            return;
        }
        let (to, created) = self.graph.node(point, state.visited_point(point));
        if let Some(from) = from {
            self.graph.add_edge(from, to);
        }
        if created {
            self.worklist.push_back(to);
        }
    }

    /// One fresh value per parameter, split on declared nullness
    fn starting_states(&mut self, ex: &mut Exploration<'a>) -> Result<Vec<ProgramState>> {
        let method = ex.method;
        let mut states = vec![ProgramState::empty_state()];
        for &parameter in &method.parameters {
            let value = self.manager.create_symbolic_value();
            ex.behavior.add_parameter(value.clone());
            let nullability = self
                .model
                .symbol(parameter)
                .map(|s| s.nullability)
                .unwrap_or_default();

            let mut next = Vec::new();
            for state in states {
                let state = state.put(parameter, value.clone());
                match nullability {
                    Nullability::Nullable => {
                        next.extend(self.manager.set_constraint(&state, &value, Constraint::Null)?);
                        next.extend(self.manager.set_constraint(
                            &state,
                            &value,
                            Constraint::NotNull,
                        )?);
                    }
                    Nullability::NonNull => {
                        next.extend(self.manager.set_constraint(
                            &state,
                            &value,
                            Constraint::NotNull,
                        )?);
                    }
                    Nullability::Unknown => next.push(state),
                }
            }
            states = next;

            if states.len() > self.config.max_starting_states {
                return Err(SymexError::MaxStartingStates {
                    method: method.signature.to_string(),
                    count: states.len(),
                    limit: self.config.max_starting_states,
                });
            }
        }
        Ok(states)
    }

    // ========================================================================
    // Instructions
    // ========================================================================

    fn execute_instruction(
        &mut self,
        ex: &mut Exploration<'a>,
        idx: NodeIndex,
        node: Node,
        instruction: &'a Instruction,
    ) -> Result<()> {
        let method = ex.method;
        let point = node.point;
        let checked = {
            let mut scope = CheckScope {
                method: &method.signature,
                manager: &mut self.manager,
                behavior: &mut ex.behavior,
                cache: &*self.cache,
            };
            self.dispatcher
                .execute_check_pre_statement(&mut scope, point, node.state, instruction)?
        };

        for state in checked {
            for executed in self.execute(ex, idx, point, state, instruction)? {
                let mut scope = CheckScope {
                    method: &method.signature,
                    manager: &mut self.manager,
                    behavior: &mut ex.behavior,
                    cache: &*self.cache,
                };
                let post = self.dispatcher.execute_check_post_statement(
                    &mut scope,
                    point,
                    executed,
                    instruction,
                )?;
                for state in post {
                    self.enqueue(point.next(), state, Some(idx));
                }
            }
        }
        Ok(())
    }

    /// States right after `instruction`; exceptional successors are enqueued directly
    fn execute(
        &mut self,
        ex: &mut Exploration<'a>,
        idx: NodeIndex,
        point: ProgramPoint,
        state: ProgramState,
        instruction: &Instruction,
    ) -> Result<Vec<ProgramState>> {
        let method = ex.method;
        let signature = &method.signature;
        let next = match instruction {
            Instruction::Literal(Literal::Null) => state.stack_value(SymbolicValue::null_literal()),
            Instruction::Literal(Literal::Bool(true)) => {
                state.stack_value(SymbolicValue::true_literal())
            }
            Instruction::Literal(Literal::Bool(false)) => {
                state.stack_value(SymbolicValue::false_literal())
            }
            Instruction::Literal(Literal::Int(_)) => {
                state.stack_value(self.manager.create_symbolic_value())
            }
            Instruction::Literal(Literal::Str(_)) | Instruction::New { .. } => {
                let value = self.manager.create_symbolic_value();
                state
                    .add_constraint(&value, Constraint::NotNull)
                    .stack_value(value)
            }
            Instruction::Load(symbol) => match state.get_value(*symbol).cloned() {
                Some(value) => state.stack_value(value),
                None => {
                    // Fields and unassigned locals start unknown
                    let value = self.manager.create_symbolic_value();
                    state.put(*symbol, value.clone()).stack_value(value)
                }
            },
            Instruction::Store(symbol) => {
                let (state, value) = pop(&state, signature)?;
                state.put(*symbol, value)
            }
            Instruction::Compare(kind) => {
                let (state, left, right) = pop2(&state, signature)?;
                let relation = self.manager.create_relational_value(*kind, left, right);
                state.stack_value(relation)
            }
            Instruction::Not => {
                let (state, operand) = pop(&state, signature)?;
                state.stack_value(self.manager.create_not_value(operand))
            }
            Instruction::Logical(op) => {
                let (state, left, right) = pop2(&state, signature)?;
                state.stack_value(self.manager.create_logical_value(*op, left, right))
            }
            Instruction::Arithmetic(_) => {
                let (state, _, _) = pop2(&state, signature)?;
                state.stack_value(self.manager.create_symbolic_value())
            }
            Instruction::InstanceOf { type_name } => {
                let (state, operand) = pop(&state, signature)?;
                let value = self
                    .manager
                    .create_instance_of_value(operand, type_name.clone());
                state.stack_value(value)
            }
            Instruction::Pop => pop(&state, signature)?.0,
            Instruction::Invoke(invocation) => {
                return self.invoke(ex, idx, point, state, invocation);
            }
        };
        Ok(vec![next])
    }

    fn invoke(
        &mut self,
        ex: &mut Exploration<'a>,
        idx: NodeIndex,
        point: ProgramPoint,
        state: ProgramState,
        invocation: &Invocation,
    ) -> Result<Vec<ProgramState>> {
        let method = ex.method;
        let callee = MethodSignature::parse(&invocation.signature).map_err(|_| {
            SymexError::malformed(
                method.signature.as_str(),
                format!("invalid call signature {}", invocation.signature),
            )
        })?;
        let count = invocation.arguments + usize::from(invocation.receiver);
        let (state, mut arguments) = state
            .unstack_value(count)
            .ok_or_else(|| underflow(&method.signature))?;
        arguments.reverse();
        let receiver = if invocation.receiver {
            Some(arguments.remove(0))
        } else {
            None
        };

        // Any call may raise an unchecked exception
        self.route_unchecked(ex.cfg, idx, point, &state);

        if let (Some(receiver), [argument]) = (&receiver, arguments.as_slice()) {
            if callee.is_equals_method() {
                let value = self.manager.create_relational_value(
                    RelationKind::MethodEquals,
                    receiver.clone(),
                    argument.clone(),
                );
                return Ok(vec![state.stack_value(value)]);
            }
        }

        let behavior = self
            .cache
            .get(&invocation.signature, self.model, self.dispatcher);
        match behavior {
            Some(behavior) if behavior.is_complete() => {
                self.apply_behavior(ex, idx, point, &state, &callee, &behavior, &arguments)
            }
            other => {
                let declared = match &other {
                    Some(behavior) => behavior.declared_exceptions().to_vec(),
                    None => self
                        .model
                        .method_by_signature(&invocation.signature)
                        .and_then(|id| self.model.method(id))
                        .map(|m| m.declared_exceptions.clone())
                        .unwrap_or_default(),
                };
                for exception_type in declared {
                    let exception = self.manager.create_exceptional_value(Some(exception_type));
                    self.route_exception(ex.cfg, idx, point, &state, exception);
                }
                let next = if callee.expects_return_value() {
                    state.stack_value(self.manager.create_symbolic_value())
                } else {
                    state
                };
                Ok(vec![next])
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_behavior(
        &mut self,
        ex: &mut Exploration<'a>,
        idx: NodeIndex,
        point: ProgramPoint,
        state: &ProgramState,
        callee: &MethodSignature,
        behavior: &MethodBehavior,
        arguments: &[SymbolicValue],
    ) -> Result<Vec<ProgramState>> {
        let method = ex.method;
        let mut successors = Vec::new();
        for method_yield in behavior.yields() {
            let applied = method_yield.parameters_applied(
                &mut self.manager,
                state,
                arguments,
                behavior.is_varargs(),
            )?;
            for yielded in applied {
                match &method_yield.kind {
                    YieldKind::Happy {
                        result_constraint, ..
                    } => {
                        let fresh = self.manager.create_symbolic_value();
                        let result = method_yield.result_value(arguments, fresh);
                        let mut states = vec![yielded];
                        for constraint in result_constraint.iter().flat_map(|c| c.iter()) {
                            let mut next = Vec::new();
                            for s in &states {
                                next.extend(self.manager.set_constraint(
                                    s,
                                    &result,
                                    constraint.clone(),
                                )?);
                            }
                            states = next;
                        }
                        if callee.expects_return_value() {
                            successors.extend(states.into_iter().map(|s| s.stack_value(result.clone())));
                        } else {
                            successors.extend(states);
                        }
                    }
                    YieldKind::Exceptional { exception_type, .. } => {
                        // Reported only when the caller already passes the faulty arguments
                        let known = method_yield.check().is_some()
                            && method_yield.parameters_known(state, arguments, behavior.is_varargs());
                        if known {
                            let mut scope = CheckScope {
                                method: &method.signature,
                                manager: &mut self.manager,
                                behavior: &mut ex.behavior,
                                cache: &*self.cache,
                            };
                            self.dispatcher.execute_on_exceptional_yield(
                                &mut scope,
                                point,
                                &yielded,
                                method_yield,
                                callee,
                            );
                        }
                        let exception = self.manager.create_exceptional_value(exception_type.clone());
                        self.route_exception(ex.cfg, idx, point, &yielded, exception);
                    }
                }
            }
        }
        Ok(successors)
    }

    // ========================================================================
    // Terminators
    // ========================================================================

    fn execute_terminator(
        &mut self,
        ex: &mut Exploration<'a>,
        idx: NodeIndex,
        node: Node,
        block: &'a Block,
    ) -> Result<()> {
        let cfg = ex.cfg;
        let method = ex.method;
        let point = node.point;
        let state = self.cleanup(ex, block.id, node.state);

        match &block.terminator {
            Terminator::Goto(target) => {
                self.enqueue(ProgramPoint::block_entry(*target), state, Some(idx));
            }
            Terminator::Branch {
                when_true,
                when_false,
            } => {
                let (state, condition) = pop(&state, &method.signature)?;
                let dual = self.manager.assume_dual(&state, &condition)?;
                for s in dual.when_false {
                    self.enqueue(ProgramPoint::block_entry(*when_false), s, Some(idx));
                }
                for s in dual.when_true {
                    self.enqueue(ProgramPoint::block_entry(*when_true), s, Some(idx));
                }
            }
            Terminator::Return => {
                let (state, value) = pop(&state, &method.signature)?;
                self.enqueue(
                    ProgramPoint::block_entry(cfg.exit()),
                    state.store_exit_value(value),
                    Some(idx),
                );
            }
            Terminator::ReturnVoid => {
                self.enqueue(ProgramPoint::block_entry(cfg.exit()), state, Some(idx));
            }
            Terminator::Throw { exception_type } => {
                let state = match state.unstack_value(1) {
                    Some((popped, _)) => popped,
                    None => state,
                };
                let exception = self.manager.create_exceptional_value(exception_type.clone());
                self.route_exception(cfg, idx, point, &state, exception);
            }
            Terminator::Exit => self.end_of_path(ex, point, state),
        }
        Ok(())
    }

    fn end_of_path(&mut self, ex: &mut Exploration<'a>, point: ProgramPoint, state: ProgramState) {
        ex.end_of_paths += 1;
        let method = ex.method;
        let mut scope = CheckScope {
            method: &method.signature,
            manager: &mut self.manager,
            behavior: &mut ex.behavior,
            cache: &*self.cache,
        };
        self.dispatcher
            .execute_check_end_of_execution_path(&mut scope, point, &state);
        ex.behavior.create_yield(&state);
    }

    /// Drop dead bindings, then constraints nothing refers to any more
    fn cleanup(&self, ex: &Exploration<'a>, block: BlockId, state: ProgramState) -> ProgramState {
        let model = self.model;
        let liveness = &ex.liveness;
        state
            .cleanup_dead_symbols(|symbol| {
                liveness.is_live_out(block, symbol)
                    || model
                        .symbol(symbol)
                        .is_some_and(|s| s.kind == SymbolKind::Field)
            })
            .cleanup_constraints(ex.behavior.parameters())
    }

    // ========================================================================
    // Exceptions
    // ========================================================================

    /// Send `exception` to the innermost handler catching it, or out of the method
    fn route_exception(
        &mut self,
        cfg: &ControlFlowGraph,
        idx: NodeIndex,
        point: ProgramPoint,
        state: &ProgramState,
        exception: SymbolicValue,
    ) {
        let thrown = exception.exception_type().map(str::to_string);
        let handler = cfg.block(point.block).and_then(|block| {
            block
                .handlers
                .iter()
                .find(|h| self.model.catches(&h.exception_type, thrown.as_deref()))
        });
        match handler {
            Some(handler) => self.enter_handler(handler, idx, state, exception),
            None => self.enqueue(
                ProgramPoint::block_entry(cfg.exit()),
                state.clear_stack().store_exit_value(exception),
                Some(idx),
            ),
        }
    }

    /// Unchecked exceptions only reach handlers: they are not part of the method's yields
    fn route_unchecked(
        &mut self,
        cfg: &ControlFlowGraph,
        idx: NodeIndex,
        point: ProgramPoint,
        state: &ProgramState,
    ) {
        let handler = cfg.block(point.block).and_then(|block| {
            block
                .handlers
                .iter()
                .find(|h| self.model.catches(&h.exception_type, None))
        });
        if let Some(handler) = handler {
            let exception = self.manager.create_exceptional_value(None);
            self.enter_handler(handler, idx, state, exception);
        }
    }

    fn enter_handler(
        &mut self,
        handler: &CatchHandler,
        idx: NodeIndex,
        state: &ProgramState,
        exception: SymbolicValue,
    ) {
        let mut caught = state.clear_stack();
        if let Some(parameter) = handler.parameter {
            caught = caught
                .put(parameter, exception.clone())
                .add_constraint(&exception, Constraint::NotNull);
        }
        self.enqueue(ProgramPoint::block_entry(handler.target), caught, Some(idx));
    }
}

fn underflow(method: &MethodSignature) -> SymexError {
    SymexError::malformed(method.as_str(), "stack underflow")
}

fn pop(state: &ProgramState, method: &MethodSignature) -> Result<(ProgramState, SymbolicValue)> {
    let (state, mut values) = state.unstack_value(1).ok_or_else(|| underflow(method))?;
    let value = values.pop().ok_or_else(|| underflow(method))?;
    Ok((state, value))
}

/// Pop the right operand, then the left one
fn pop2(
    state: &ProgramState,
    method: &MethodSignature,
) -> Result<(ProgramState, SymbolicValue, SymbolicValue)> {
    let (state, values) = state.unstack_value(2).ok_or_else(|| underflow(method))?;
    let mut values = values.into_iter();
    match (values.next(), values.next()) {
        (Some(right), Some(left)) => Ok((state, left, right)),
        _ => Err(underflow(method)),
    }
}
