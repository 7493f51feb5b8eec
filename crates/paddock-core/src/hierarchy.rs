//! # Hierarchy Index
//!
//! Era tree traversal for the catalog.
//!
//! Eras arrive as a flat list of parent-linked nodes. This module computes
//! the descendant closure of a root era and uses it to select the items
//! filed anywhere beneath that era.
//!
//! ## Traversal Contract
//!
//! - Depth-first, pre-order; siblings are visited in input order
//! - The root itself comes first when it exists
//! - A missing root is not an error: traversal still starts from its id
//! - Cycles terminate at the first revisit, each node is emitted at most once
//!
//! The traversal uses an explicit stack, so deep chains cannot exhaust the
//! call stack.

use crate::{CategoryId, CategoryNode, Item, ItemId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// =============================================================================
// HIERARCHY INDEX
// =============================================================================

/// A borrowed, pre-indexed view over a set of category nodes.
///
/// Building the index is `O(n)`; every traversal afterwards only touches
/// the nodes it emits.
#[derive(Debug, Clone)]
pub struct HierarchyIndex<'a> {
    nodes: &'a [CategoryNode],
    /// parent id (None = top level) -> child positions in input order
    children: BTreeMap<Option<&'a CategoryId>, Vec<usize>>,
    /// id -> first position in input order
    by_id: BTreeMap<&'a CategoryId, usize>,
}

impl<'a> HierarchyIndex<'a> {
    /// Index a slice of nodes.
    #[must_use]
    pub fn new(nodes: &'a [CategoryNode]) -> Self {
        let mut children: BTreeMap<Option<&'a CategoryId>, Vec<usize>> = BTreeMap::new();
        let mut by_id = BTreeMap::new();

        for (pos, node) in nodes.iter().enumerate() {
            children.entry(node.parent.as_ref()).or_default().push(pos);
            by_id.entry(&node.id).or_insert(pos);
        }

        Self {
            nodes,
            children,
            by_id,
        }
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &CategoryId) -> Option<&'a CategoryNode> {
        let nodes = self.nodes;
        self.by_id.get(id).map(|&pos| &nodes[pos])
    }

    /// Direct children of `parent` (None = top level), in input order.
    #[must_use]
    pub fn children(&self, parent: Option<&CategoryId>) -> Vec<&'a CategoryNode> {
        let nodes = self.nodes;
        self.children
            .get(&parent)
            .map(|positions| positions.iter().map(|&pos| &nodes[pos]).collect())
            .unwrap_or_default()
    }

    /// Top-level nodes, in input order.
    #[must_use]
    pub fn roots(&self) -> Vec<&'a CategoryNode> {
        self.children(None)
    }

    /// Compute the descendant closure of `root`.
    ///
    /// See the module docs for ordering and edge-case rules.
    #[must_use]
    pub fn flatten(&self, root: Option<&CategoryId>) -> Vec<&'a CategoryNode> {
        let mut output = Vec::new();
        let mut emitted: BTreeSet<&CategoryId> = BTreeSet::new();

        if let Some(root_node) = root.and_then(|id| self.get(id)) {
            emitted.insert(&root_node.id);
            output.push(root_node);
        }

        // Positions still to emit. Children are pushed in reverse so they
        // pop in input order.
        let mut stack: Vec<usize> = Vec::new();
        self.push_children(&mut stack, root);

        let nodes = self.nodes;
        while let Some(pos) = stack.pop() {
            let node = &nodes[pos];
            if !emitted.insert(&node.id) {
                continue;
            }
            output.push(node);
            self.push_children(&mut stack, Some(&node.id));
        }

        output
    }

    /// Ids of the closure of `root`.
    #[must_use]
    pub fn closure_ids(&self, root: Option<&CategoryId>) -> BTreeSet<&'a CategoryId> {
        self.flatten(root).into_iter().map(|n| &n.id).collect()
    }

    /// Select the items whose category lies in the closure of `root`.
    ///
    /// Items keep their input order. Items pointing at unknown categories
    /// never match.
    #[must_use]
    pub fn collect_items<'i>(&self, items: &'i [Item], root: &CategoryId) -> Vec<&'i Item> {
        let ids = self.closure_ids(Some(root));
        items
            .iter()
            .filter(|item| ids.contains(&item.category_id))
            .collect()
    }

    /// Report structural problems without failing.
    ///
    /// Traversal tolerates all of these; strict loaders turn a non-empty
    /// report into an error.
    #[must_use]
    pub fn validate(&self, items: &[Item]) -> Vec<HierarchyIssue> {
        let mut issues = Vec::new();
        let mut seen = BTreeSet::new();

        for node in self.nodes {
            if !seen.insert(&node.id) {
                issues.push(HierarchyIssue::DuplicateCategory(node.id.clone()));
            }
            if let Some(parent) = &node.parent
                && self.get(parent).is_none()
            {
                issues.push(HierarchyIssue::DanglingParent {
                    node: node.id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        for node in self.nodes {
            if self.on_cycle(node) {
                issues.push(HierarchyIssue::Cycle(node.id.clone()));
            }
        }

        for item in items {
            if self.get(&item.category_id).is_none() {
                issues.push(HierarchyIssue::DanglingCategory {
                    item: item.id.clone(),
                    category: item.category_id.clone(),
                });
            }
        }

        issues
    }

    fn push_children(&self, stack: &mut Vec<usize>, parent: Option<&CategoryId>) {
        if let Some(positions) = self.children.get(&parent) {
            stack.extend(positions.iter().rev().copied());
        }
    }

    /// Whether following parent links from `node` leads back to it.
    fn on_cycle(&self, node: &CategoryNode) -> bool {
        let mut visited = BTreeSet::new();
        let mut current = node.parent.as_ref();

        while let Some(id) = current {
            if *id == node.id {
                return true;
            }
            if !visited.insert(id) {
                // Entered a cycle that does not include `node`.
                return false;
            }
            current = self.get(id).and_then(|n| n.parent.as_ref());
        }
        false
    }
}

// =============================================================================
// VALIDATION REPORT
// =============================================================================

/// A structural problem found by [`HierarchyIndex::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyIssue {
    /// Two nodes share an id.
    DuplicateCategory(CategoryId),
    /// A node points at a parent that does not exist.
    DanglingParent {
        node: CategoryId,
        parent: CategoryId,
    },
    /// An item is filed under a category that does not exist.
    DanglingCategory { item: ItemId, category: CategoryId },
    /// A node's parent chain loops back to itself.
    Cycle(CategoryId),
}

impl fmt::Display for HierarchyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCategory(id) => write!(f, "duplicate era id '{}'", id),
            Self::DanglingParent { node, parent } => {
                write!(f, "era '{}' points at missing parent '{}'", node, parent)
            }
            Self::DanglingCategory { item, category } => {
                write!(f, "item '{}' is filed under missing era '{}'", item, category)
            }
            Self::Cycle(id) => write!(f, "era '{}' is part of a parent cycle", id),
        }
    }
}

// =============================================================================
// FREE FUNCTIONS
// =============================================================================

/// Flatten the closure of `root` into owned records.
#[must_use]
pub fn flatten(nodes: &[CategoryNode], root: Option<&CategoryId>) -> Vec<CategoryNode> {
    HierarchyIndex::new(nodes)
        .flatten(root)
        .into_iter()
        .cloned()
        .collect()
}

/// Collect the items filed anywhere under `root`, as owned records.
#[must_use]
pub fn collect_items(nodes: &[CategoryNode], items: &[Item], root: &CategoryId) -> Vec<Item> {
    HierarchyIndex::new(nodes)
        .collect_items(items, root)
        .into_iter()
        .cloned()
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
