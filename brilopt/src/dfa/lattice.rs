//! Fact domains for data-flow analysis.

use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display};

/// A join-semilattice of data-flow facts.
///
/// Every fact type must be finite-height and every transfer function
/// monotone over it; the worklist solver relies on the analysis upholding
/// both.
pub trait Lattice: Clone + Eq + Debug {
    /// Least element: no information.
    fn bottom() -> Self;

    /// Least upper bound of two facts.
    fn join(&self, other: &Self) -> Self;
}

/// Power-set lattice ordered by inclusion, with union as join. Backed by a
/// `BTreeSet` so facts iterate in stable sorted order for dumps.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct SetLattice<T: Ord + Clone + Debug> {
    pub elements: BTreeSet<T>,
}

impl<T: Ord + Clone + Debug> SetLattice<T> {
    pub fn new() -> Self {
        SetLattice { elements: BTreeSet::new() }
    }

    pub fn from_iter<I: IntoIterator<Item = T>>(elements: I) -> Self {
        SetLattice { elements: elements.into_iter().collect() }
    }

    pub fn insert(&mut self, element: T) {
        self.elements.insert(element);
    }

    pub fn contains(&self, element: &T) -> bool {
        self.elements.contains(element)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.elements.iter()
    }
}

impl<T: Ord + Clone + Debug> Lattice for SetLattice<T> {
    fn bottom() -> Self {
        SetLattice::new()
    }

    fn join(&self, other: &Self) -> Self {
        SetLattice { elements: self.elements.union(&other.elements).cloned().collect() }
    }
}

impl<T: Ord + Clone + Debug + Display> Display for SetLattice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.elements.iter().map(|element| element.to_string()).join(", "))
    }
}
