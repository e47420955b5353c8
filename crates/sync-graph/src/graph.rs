//! Directed dependency graph with deterministic import ordering

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;

use sync_model::{ObjectHandle, PersistentId, TypeTag};

use crate::error::{CircularDependencyError, Result};
use crate::node::{DependencyKind, DependencyNode};

/// Visit state during cycle detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// Directed graph of object identifiers with typed edges
///
/// Edges point from dependent to dependency: `add_dependency(a, b, ..)`
/// declares that `a` depends on `b`, so `b` appears before `a` in the
/// import order.
///
/// The computed order is memoized behind an [`Arc`] and invalidated by any
/// mutation, so repeated calls on an unmodified graph return the same
/// allocation.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<PersistentId, DependencyNode>,
    order_cache: Option<Arc<Vec<(PersistentId, TypeTag)>>>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a node
    ///
    /// Re-adding an existing id updates its type and payload without
    /// duplicating the node or disturbing its edges.
    pub fn add_object(&mut self, id: PersistentId, ty: TypeTag, payload: Option<ObjectHandle>) {
        self.order_cache = None;
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.ty = ty;
                if payload.is_some() {
                    node.payload = payload;
                }
            }
            None => {
                self.nodes.insert(id, DependencyNode::new(id, ty, payload));
            }
        }
    }

    /// Declare that `from` depends on `to`
    ///
    /// Missing endpoints are created defensively with a placeholder type;
    /// that indicates an upstream resolver defect, so it is logged as a
    /// warning rather than failing the run.
    pub fn add_dependency(&mut self, from: PersistentId, to: PersistentId, kind: DependencyKind) {
        self.order_cache = None;
        for endpoint in [from, to] {
            if !self.nodes.contains_key(&endpoint) {
                tracing::warn!(
                    node = %endpoint,
                    edge_from = %from,
                    edge_to = %to,
                    "edge endpoint missing from graph, creating placeholder node"
                );
                self.nodes
                    .insert(endpoint, DependencyNode::new(endpoint, TypeTag::from("unknown"), None));
            }
        }

        // Both directions are recorded together to keep the edge invariant.
        if let Some(node) = self.nodes.get_mut(&from) {
            node.dependencies.insert(to);
            node.edge_kinds.insert(to, kind);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.dependents.insert(from);
        }
    }

    /// Remove the edge `from -> to` if present
    ///
    /// Used only to break cycles; removal is symmetric like insertion.
    pub fn remove_dependency(&mut self, from: PersistentId, to: PersistentId) {
        self.order_cache = None;
        if let Some(node) = self.nodes.get_mut(&from) {
            node.dependencies.remove(&to);
            node.edge_kinds.remove(&to);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.dependents.remove(&from);
        }
    }

    /// Kind of the edge `from -> to`, if that edge exists
    pub fn edge_kind(&self, from: PersistentId, to: PersistentId) -> Option<DependencyKind> {
        self.nodes
            .get(&from)
            .and_then(|node| node.edge_kinds.get(&to))
            .copied()
    }

    /// Look up a node
    pub fn node(&self, id: PersistentId) -> Option<&DependencyNode> {
        self.nodes.get(&id)
    }

    /// Whether the graph contains a node for `id`
    pub fn contains(&self, id: PersistentId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All node identifiers, sorted
    pub fn node_ids(&self) -> Vec<PersistentId> {
        self.nodes.keys().copied().collect()
    }

    /// Iterate over all nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.dependencies.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that depend on nothing
    pub fn get_roots(&self) -> Vec<PersistentId> {
        self.nodes
            .values()
            .filter(|n| n.dependencies.is_empty())
            .map(|n| n.id)
            .collect()
    }

    /// Nodes nothing depends on
    pub fn get_leaves(&self) -> Vec<PersistentId> {
        self.nodes
            .values()
            .filter(|n| n.dependents.is_empty())
            .map(|n| n.id)
            .collect()
    }

    /// Direct dependencies of `id`, or its transitive closure when
    /// `recursive` is set. The id itself is never included. Unknown ids
    /// yield an empty set.
    pub fn get_dependencies(&self, id: PersistentId, recursive: bool) -> BTreeSet<PersistentId> {
        self.collect_edges(id, recursive, |node| &node.dependencies)
    }

    /// Direct dependents of `id`, or the transitive closure when
    /// `recursive` is set
    pub fn get_dependents(&self, id: PersistentId, recursive: bool) -> BTreeSet<PersistentId> {
        self.collect_edges(id, recursive, |node| &node.dependents)
    }

    fn collect_edges(
        &self,
        id: PersistentId,
        recursive: bool,
        edges: impl Fn(&DependencyNode) -> &BTreeSet<PersistentId>,
    ) -> BTreeSet<PersistentId> {
        let Some(start) = self.nodes.get(&id) else {
            return BTreeSet::new();
        };

        if !recursive {
            return edges(start).clone();
        }

        // Breadth-first closure, excluding the starting id.
        let mut seen: BTreeSet<PersistentId> = BTreeSet::new();
        let mut queue: VecDeque<PersistentId> = edges(start).iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            if next == id || !seen.insert(next) {
                continue;
            }
            if let Some(node) = self.nodes.get(&next) {
                queue.extend(edges(node).iter().copied());
            }
        }
        seen
    }

    /// Extract the closure of `ids` and everything they transitively depend
    /// on (dependents are not followed), preserving edge kinds
    ///
    /// Returns a new graph, not a view.
    pub fn get_subgraph(&self, ids: &[PersistentId]) -> DependencyGraph {
        let mut members: BTreeSet<PersistentId> = BTreeSet::new();
        let mut queue: VecDeque<PersistentId> = ids.iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            if !self.nodes.contains_key(&next) || !members.insert(next) {
                continue;
            }
            if let Some(node) = self.nodes.get(&next) {
                queue.extend(node.dependencies.iter().copied());
            }
        }

        let mut subgraph = DependencyGraph::new();
        for id in &members {
            if let Some(node) = self.nodes.get(id) {
                subgraph.add_object(*id, node.ty.clone(), node.payload.clone());
            }
        }
        for id in &members {
            if let Some(node) = self.nodes.get(id) {
                for dep in &node.dependencies {
                    if members.contains(dep) {
                        let kind = node
                            .edge_kinds
                            .get(dep)
                            .copied()
                            .unwrap_or(DependencyKind::Reference);
                        subgraph.add_dependency(*id, *dep, kind);
                    }
                }
            }
        }
        subgraph
    }

    /// Fold another graph into this one
    ///
    /// Nodes already present keep their payload unless the other graph has
    /// one to contribute; edges are unioned.
    pub fn merge(&mut self, other: &DependencyGraph) {
        self.order_cache = None;
        for node in other.nodes.values() {
            if !self.nodes.contains_key(&node.id) {
                self.nodes
                    .insert(node.id, DependencyNode::new(node.id, node.ty.clone(), node.payload.clone()));
            } else if node.payload.is_some() {
                self.add_object(node.id, node.ty.clone(), node.payload.clone());
            }
        }
        for node in other.nodes.values() {
            for dep in &node.dependencies {
                let kind = node
                    .edge_kinds
                    .get(dep)
                    .copied()
                    .unwrap_or(DependencyKind::Reference);
                self.add_dependency(node.id, *dep, kind);
            }
        }
    }

    /// Compute the creation order via Kahn's algorithm
    ///
    /// Ties are broken by picking the lexicographically smallest identifier,
    /// which makes the order reproducible across runs. The result is cached
    /// until the next mutation.
    ///
    /// # Errors
    ///
    /// Returns [`CircularDependencyError`] carrying the first discovered
    /// cycle if the graph is not acyclic. Callers intending to tolerate
    /// cycles must run [`DependencyGraph::detect_cycles`] first.
    pub fn get_import_order(&mut self) -> Result<Arc<Vec<(PersistentId, TypeTag)>>> {
        if let Some(cached) = &self.order_cache {
            return Ok(Arc::clone(cached));
        }

        let mut in_degree: BTreeMap<PersistentId, usize> = self
            .nodes
            .values()
            .map(|n| (n.id, n.in_degree()))
            .collect();

        // Min-heap on the id keeps the order deterministic.
        let mut ready: BinaryHeap<Reverse<PersistentId>> = in_degree
            .iter()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(&id, _)| Reverse(id))
            .collect();

        let mut order: Vec<(PersistentId, TypeTag)> = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(id)) = ready.pop() {
            if let Some(node) = self.nodes.get(&id) {
                order.push((id, node.ty.clone()));
                for dependent in &node.dependents {
                    if let Some(deg) = in_degree.get_mut(dependent) {
                        *deg -= 1;
                        if *deg == 0 {
                            ready.push(Reverse(*dependent));
                        }
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let cycle = self
                .detect_cycles()
                .into_iter()
                .next()
                .unwrap_or_default();
            return Err(CircularDependencyError { cycle });
        }

        let order = Arc::new(order);
        self.order_cache = Some(Arc::clone(&order));
        Ok(order)
    }

    /// Find all cycles reachable in the graph
    ///
    /// Iterative depth-first search from every unvisited node. When the
    /// walk reaches a node already on the current path, the path suffix
    /// from that node, closed by the node itself, is reported as a cycle.
    /// Consecutive pairs in a reported cycle are dependency edges.
    pub fn detect_cycles(&self) -> Vec<Vec<PersistentId>> {
        let mut cycles: Vec<Vec<PersistentId>> = Vec::new();
        let mut states: HashMap<PersistentId, VisitState> = HashMap::new();

        for &start in self.nodes.keys() {
            if states.contains_key(&start) {
                continue;
            }

            // Frame: (node, sorted dependency list, next index to visit)
            let mut stack: Vec<(PersistentId, Vec<PersistentId>, usize)> = Vec::new();
            let mut path: Vec<PersistentId> = Vec::new();

            states.insert(start, VisitState::InProgress);
            path.push(start);
            stack.push((start, self.sorted_dependencies(start), 0));

            while let Some(frame) = stack.last_mut() {
                if frame.2 < frame.1.len() {
                    let next = frame.1[frame.2];
                    frame.2 += 1;

                    match states.get(&next) {
                        None => {
                            states.insert(next, VisitState::InProgress);
                            path.push(next);
                            stack.push((next, self.sorted_dependencies(next), 0));
                        }
                        Some(VisitState::InProgress) => {
                            if let Some(pos) = path.iter().position(|&id| id == next) {
                                let mut cycle: Vec<PersistentId> = path[pos..].to_vec();
                                cycle.push(next);
                                cycles.push(cycle);
                            }
                        }
                        Some(VisitState::Done) => {}
                    }
                } else {
                    if let Some((done, _, _)) = stack.pop() {
                        states.insert(done, VisitState::Done);
                    }
                    path.pop();
                }
            }
        }

        cycles
    }

    fn sorted_dependencies(&self, id: PersistentId) -> Vec<PersistentId> {
        self.nodes
            .get(&id)
            .map(|n| n.dependencies.iter().copied().collect())
            .unwrap_or_default()
    }
}
