//! Dominators: dominator sets, immediate dominators, the dominator tree
//! and the dominance frontier.

use crate::cfg::Cfg;
use indexmap::IndexMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Dominators {
    /// `dom[v]` is every block that dominates `v`, itself included.
    pub dom: IndexMap<String, BTreeSet<String>>,
    /// The unique closest strict dominator; `None` for the entry and for
    /// unreachable blocks.
    pub idom: IndexMap<String, Option<String>>,
    /// Immediate children in the dominator tree, in source order.
    pub tree: IndexMap<String, Vec<String>>,
    /// Cytron dominance frontier.
    pub frontier: IndexMap<String, BTreeSet<String>>,
}

impl Dominators {
    pub fn new(cfg: &Cfg) -> Self {
        let dom = compute_dom_sets(cfg);
        let idom = compute_idom(&dom);

        let mut tree: IndexMap<String, Vec<String>> =
            cfg.labels().map(|label| (label.clone(), Vec::new())).collect();
        for (label, parent) in &idom {
            if let Some(parent) = parent {
                tree[parent].push(label.clone());
            }
        }

        let frontier = compute_frontier(cfg, &dom, &idom);
        Dominators { dom, idom, tree, frontier }
    }

    /// `a` strictly dominates `b`.
    pub fn strictly_dominates(&self, a: &str, b: &str) -> bool {
        a != b && self.dom[b].contains(a)
    }
}

/// Classic iterative formulation: the entry dominates only itself, every
/// other vertex starts at the full vertex set, and each step intersects
/// over predecessors until nothing changes. A vertex with no predecessors
/// degenerates to `{v}`.
fn compute_dom_sets(cfg: &Cfg) -> IndexMap<String, BTreeSet<String>> {
    let entry = cfg.entry().to_string();
    let all: BTreeSet<String> = cfg.labels().cloned().collect();

    let mut dom: IndexMap<String, BTreeSet<String>> =
        cfg.labels().map(|label| (label.clone(), all.clone())).collect();
    dom.insert(entry.clone(), BTreeSet::from([entry.clone()]));

    let mut changed = true;
    while changed {
        changed = false;
        for label in cfg.labels() {
            if *label == entry {
                continue;
            }
            let intersection = cfg.predecessors[label]
                .iter()
                .map(|pred| dom[pred].clone())
                .reduce(|acc, set| acc.intersection(&set).cloned().collect())
                .unwrap_or_default();

            let mut new = intersection;
            new.insert(label.clone());
            if new != dom[label] {
                dom.insert(label.clone(), new);
                changed = true;
            }
        }
    }
    dom
}

/// The immediate dominator is the strict dominator not dominated by any
/// other strict dominator; by the dominator lattice it is the one with the
/// largest dominator set.
fn compute_idom(dom: &IndexMap<String, BTreeSet<String>>) -> IndexMap<String, Option<String>> {
    dom.iter()
        .map(|(label, dominators)| {
            let parent = dominators
                .iter()
                .filter(|candidate| *candidate != label)
                .max_by_key(|candidate| dom[*candidate].len())
                .cloned();
            (label.clone(), parent)
        })
        .collect()
}

/// For every CFG edge `a → b`, walk from `a` up the dominator tree until a
/// strict dominator of `b` is reached, adding `b` to the frontier of every
/// vertex on the way.
fn compute_frontier(
    cfg: &Cfg,
    dom: &IndexMap<String, BTreeSet<String>>,
    idom: &IndexMap<String, Option<String>>,
) -> IndexMap<String, BTreeSet<String>> {
    let mut frontier: IndexMap<String, BTreeSet<String>> =
        cfg.labels().map(|label| (label.clone(), BTreeSet::new())).collect();

    for (a, succs) in &cfg.successors {
        for b in succs {
            let mut runner = Some(a.clone());
            while let Some(x) = runner {
                if x != *b && dom[b].contains(&x) {
                    break;
                }
                frontier[&x].insert(b.clone());
                runner = idom[&x].clone();
            }
        }
    }
    frontier
}
