//! Generic worklist-based data-flow solver.

use crate::cfg::Cfg;
use crate::dfa::lattice::Lattice;
use bril::{Function, Instruction};
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashSet, VecDeque};

/// Analysis direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Information flows with control flow, entry to exit.
    Forward,
    /// Information flows against control flow, exit to entry.
    Backward,
}

/// A data-flow analysis: a fact lattice, a direction, a block transfer
/// function and a merge over incoming facts.
pub trait Analysis {
    type Fact: Lattice;

    fn direction(&self) -> Direction;

    /// Fact seeded at the boundary: the entry block for a forward analysis,
    /// the exit blocks for a backward one. Defaults to bottom.
    fn boundary_fact(&self, _function: &Function) -> Self::Fact {
        Self::Fact::bottom()
    }

    /// Push a fact through one block. `label` identifies the block for
    /// analyses that precompute per-block metadata.
    fn transfer(&self, block: &[Instruction], fact: &Self::Fact, label: &str) -> Self::Fact;

    /// Combine facts flowing in from several edges. Defaults to the lattice
    /// join folded over the inputs.
    fn merge<'a, I>(&self, facts: I) -> Self::Fact
    where
        I: Iterator<Item = &'a Self::Fact>,
        Self::Fact: 'a,
    {
        facts.fold(Self::Fact::bottom(), |acc, fact| acc.join(fact))
    }
}

/// Facts at block entry and exit once the fixed point is reached.
#[derive(Debug, Clone)]
pub struct DataflowResult<F> {
    pub input: IndexMap<String, F>,
    pub output: IndexMap<String, F>,
    pub iterations: usize,
}

/// FIFO worklist engine. The queue is paired with a membership set so that
/// a block is never enqueued twice, and it is seeded in reverse postorder
/// (forward) or postorder (backward) to speed convergence; correctness does
/// not depend on that order. The fixed point is declared when the worklist
/// empties.
pub struct WorklistSolver<A: Analysis> {
    analysis: A,
}

impl<A: Analysis> WorklistSolver<A> {
    pub fn new(analysis: A) -> Self {
        WorklistSolver { analysis }
    }

    pub fn solve(&self, cfg: &Cfg, function: &Function) -> DataflowResult<A::Fact> {
        match self.analysis.direction() {
            Direction::Forward => self.solve_forward(cfg, function),
            Direction::Backward => self.solve_backward(cfg, function),
        }
    }

    fn seed_worklist(&self, cfg: &Cfg) -> (VecDeque<String>, HashSet<String>) {
        let mut order = match self.analysis.direction() {
            Direction::Forward => cfg.reverse_postorder(),
            Direction::Backward => cfg.postorder(),
        };
        // Unreachable blocks still get their facts computed; append them in
        // source order.
        let seen: HashSet<String> = order.iter().cloned().collect();
        order.extend(cfg.labels().filter(|label| !seen.contains(*label)).cloned());

        let queued: HashSet<String> = order.iter().cloned().collect();
        (order.into(), queued)
    }

    fn solve_forward(&self, cfg: &Cfg, function: &Function) -> DataflowResult<A::Fact> {
        let entry = cfg.entry().to_string();
        let boundary = self.analysis.boundary_fact(function);

        let mut input: IndexMap<String, A::Fact> =
            cfg.labels().map(|label| (label.clone(), A::Fact::bottom())).collect();
        let mut output: IndexMap<String, A::Fact> = input.clone();
        input.insert(entry.clone(), boundary.clone());

        let (mut queue, mut queued) = self.seed_worklist(cfg);
        let mut iterations = 0;

        while let Some(label) = queue.pop_front() {
            queued.remove(&label);
            iterations += 1;

            let merged = self.analysis.merge(cfg.predecessors[&label].iter().map(|p| &output[p]));
            // The boundary fact stays part of the entry's input even when a
            // back edge re-queues the entry block.
            let fact =
                if label == entry { boundary.join(&merged) } else { merged };
            let new = self.analysis.transfer(&cfg.blocks[&label], &fact, &label);
            input.insert(label.clone(), fact);

            if new != output[&label] {
                output.insert(label.clone(), new);
                for succ in &cfg.successors[&label] {
                    if queued.insert(succ.clone()) {
                        queue.push_back(succ.clone());
                    }
                }
            }
        }

        debug!("forward analysis of @{} reached a fixed point after {iterations} iterations", cfg.function_name);
        DataflowResult { input, output, iterations }
    }

    fn solve_backward(&self, cfg: &Cfg, function: &Function) -> DataflowResult<A::Fact> {
        let boundary = self.analysis.boundary_fact(function);

        let mut input: IndexMap<String, A::Fact> =
            cfg.labels().map(|label| (label.clone(), A::Fact::bottom())).collect();
        let mut output: IndexMap<String, A::Fact> = input.clone();

        let (mut queue, mut queued) = self.seed_worklist(cfg);
        let mut iterations = 0;

        while let Some(label) = queue.pop_front() {
            queued.remove(&label);
            iterations += 1;

            let succs = &cfg.successors[&label];
            let merged = self.analysis.merge(succs.iter().map(|s| &input[s]));
            let fact = if succs.is_empty() { boundary.join(&merged) } else { merged };
            let new = self.analysis.transfer(&cfg.blocks[&label], &fact, &label);
            output.insert(label.clone(), fact);

            if new != input[&label] {
                input.insert(label.clone(), new);
                for pred in &cfg.predecessors[&label] {
                    if queued.insert(pred.clone()) {
                        queue.push_back(pred.clone());
                    }
                }
            }
        }

        debug!("backward analysis of @{} reached a fixed point after {iterations} iterations", cfg.function_name);
        DataflowResult { input, output, iterations }
    }
}
