//! Keyed enter/update/exit reconciliation.
//!
//! [`diff`] classifies keys of a freshly computed element set against the set
//! that is currently bound. [`reconcile_tree`] applies the same
//! classification level by level to a nested element tree and emits the
//! minimal list of [`Mutation`]s turning the old tree into the new one.
//! Neither function knows anything about a drawing backend.

use std::hash::Hash;

use indexmap::IndexMap;
use smallvec::SmallVec;

/// Three disjoint key partitions produced by [`diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedDiff<K> {
    /// Keys only in the new set, in new-set order.
    pub entering: Vec<K>,
    /// Keys in both sets, in new-set order.
    pub updating: Vec<K>,
    /// Keys only in the old set, in old-set order.
    pub exiting: Vec<K>,
}

impl<K> KeyedDiff<K> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entering.is_empty() && self.updating.is_empty() && self.exiting.is_empty()
    }
}

/// Binds data to keys. When two items share a key, the later one wins.
pub fn bind<K: Hash + Eq, D>(items: impl IntoIterator<Item = (K, D)>) -> IndexMap<K, D> {
    let mut bound = IndexMap::new();
    for (key, datum) in items {
        bound.insert(key, datum);
    }
    bound
}

/// Classifies every key of `old` and `new` as entering, updating or exiting.
#[must_use]
pub fn diff<K, O, N>(old: &IndexMap<K, O>, new: &IndexMap<K, N>) -> KeyedDiff<K>
where
    K: Hash + Eq + Clone,
{
    let mut entering = Vec::new();
    let mut updating = Vec::new();
    for key in new.keys() {
        if old.contains_key(key) {
            updating.push(key.clone());
        } else {
            entering.push(key.clone());
        }
    }
    let exiting = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .cloned()
        .collect();

    KeyedDiff {
        entering,
        updating,
        exiting,
    }
}

/// One bound element plus its keyed children.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundNode<K: Hash + Eq, E> {
    pub element: E,
    pub children: IndexMap<K, BoundNode<K, E>>,
}

impl<K: Hash + Eq, E> BoundNode<K, E> {
    #[must_use]
    pub fn leaf(element: E) -> Self {
        Self {
            element,
            children: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_children(element: E, children: IndexMap<K, BoundNode<K, E>>) -> Self {
        Self { element, children }
    }

    /// Number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(BoundNode::node_count)
            .sum::<usize>()
    }
}

/// Keyed forest; the root level of a scene.
pub type BoundTree<K, E> = IndexMap<K, BoundNode<K, E>>;

/// Key path from the root of a tree down to one node.
pub type NodePath<K> = SmallVec<[K; 4]>;

/// A single change to apply to a retained element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<K, E> {
    /// Create the element at `path`; its parent already exists.
    Insert { path: NodePath<K>, element: E },
    /// Replace the attributes of the existing element at `path`.
    Update { path: NodePath<K>, element: E },
    /// Remove the element at `path` together with its subtree.
    Remove { path: NodePath<K> },
}

impl<K, E> Mutation<K, E> {
    #[must_use]
    pub fn path(&self) -> &NodePath<K> {
        match self {
            Self::Insert { path, .. } | Self::Update { path, .. } | Self::Remove { path } => path,
        }
    }
}

/// Diffs two trees and returns the mutations turning `old` into `new`.
///
/// At every level entering nodes are inserted first (with their whole
/// subtree), then persisting nodes are updated and their children reconciled
/// recursively. A persisting node whose element is unchanged emits no update
/// but its children are still reconciled. Removals of exiting nodes come last
/// in the returned list. Removing a node implies removing its subtree, so
/// children of an exiting node produce no mutations of their own.
#[must_use]
pub fn reconcile_tree<K, E>(old: &BoundTree<K, E>, new: &BoundTree<K, E>) -> Vec<Mutation<K, E>>
where
    K: Hash + Eq + Clone,
    E: Clone + PartialEq,
{
    let mut mutations = Vec::new();
    let mut removals = Vec::new();
    reconcile_level(
        old,
        new,
        &NodePath::new(),
        &mut mutations,
        &mut removals,
    );
    mutations.extend(removals);
    mutations
}

fn reconcile_level<K, E>(
    old: &BoundTree<K, E>,
    new: &BoundTree<K, E>,
    parent: &NodePath<K>,
    mutations: &mut Vec<Mutation<K, E>>,
    removals: &mut Vec<Mutation<K, E>>,
) where
    K: Hash + Eq + Clone,
    E: Clone + PartialEq,
{
    let keyed = diff(old, new);

    for key in &keyed.entering {
        if let Some(node) = new.get(key) {
            insert_subtree(node, child_path(parent, key), mutations);
        }
    }

    for key in &keyed.updating {
        let (Some(previous), Some(next)) = (old.get(key), new.get(key)) else {
            continue;
        };
        let path = child_path(parent, key);
        if previous.element != next.element {
            mutations.push(Mutation::Update {
                path: path.clone(),
                element: next.element.clone(),
            });
        }
        reconcile_level(&previous.children, &next.children, &path, mutations, removals);
    }

    for key in keyed.exiting {
        removals.push(Mutation::Remove {
            path: child_path(parent, &key),
        });
    }
}

fn insert_subtree<K, E>(node: &BoundNode<K, E>, path: NodePath<K>, mutations: &mut Vec<Mutation<K, E>>)
where
    K: Hash + Eq + Clone,
    E: Clone,
{
    mutations.push(Mutation::Insert {
        path: path.clone(),
        element: node.element.clone(),
    });
    for (key, child) in &node.children {
        insert_subtree(child, child_path(&path, key), mutations);
    }
}

/// Mutations that undo `applied`, a prefix of `reconcile_tree(old, _)`.
///
/// Applied to the partially updated tree, the result restores `old`. Each
/// path appears at most once in a reconciled list and nothing below a removed
/// node is touched, so every undo only needs the node as stored in `old`.
#[must_use]
pub fn revert<K, E>(old: &BoundTree<K, E>, applied: &[Mutation<K, E>]) -> Vec<Mutation<K, E>>
where
    K: Hash + Eq + Clone,
    E: Clone,
{
    let mut undo = Vec::with_capacity(applied.len());
    for mutation in applied.iter().rev() {
        match mutation {
            Mutation::Insert { path, .. } => undo.push(Mutation::Remove { path: path.clone() }),
            Mutation::Update { path, .. } => {
                if let Some(node) = node_at(old, path) {
                    undo.push(Mutation::Update {
                        path: path.clone(),
                        element: node.element.clone(),
                    });
                }
            }
            Mutation::Remove { path } => {
                if let Some(node) = node_at(old, path) {
                    insert_subtree(node, path.clone(), &mut undo);
                }
            }
        }
    }
    undo
}

/// Node stored at `path`, if any.
#[must_use]
pub fn node_at<'a, K, E>(tree: &'a BoundTree<K, E>, path: &[K]) -> Option<&'a BoundNode<K, E>>
where
    K: Hash + Eq,
{
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(tree.get(first)?, |node, key| node.children.get(key))
}

fn child_path<K: Clone>(parent: &NodePath<K>, key: &K) -> NodePath<K> {
    let mut path = parent.clone();
    path.push(key.clone());
    path
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::{BoundNode, BoundTree, Mutation, bind, diff, node_at, reconcile_tree, revert};

    fn tree(entries: &[(&'static str, i32, &[(&'static str, i32)])]) -> BoundTree<&'static str, i32> {
        entries
            .iter()
            .map(|(key, value, children)| {
                let children: IndexMap<_, _> = children
                    .iter()
                    .map(|(child, child_value)| (*child, BoundNode::leaf(*child_value)))
                    .collect();
                (*key, BoundNode::with_children(*value, children))
            })
            .collect()
    }

    #[test]
    fn diff_partitions_are_disjoint() {
        let old = bind([("a", 1), ("b", 2)]);
        let new = bind([("b", 3), ("c", 4)]);
        let keyed = diff(&old, &new);
        assert_eq!(keyed.entering, vec!["c"]);
        assert_eq!(keyed.updating, vec!["b"]);
        assert_eq!(keyed.exiting, vec!["a"]);
    }

    #[test]
    fn later_duplicate_key_overwrites_binding() {
        let bound = bind([("a", 1), ("a", 2)]);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound["a"], 2);
    }

    #[test]
    fn removals_are_emitted_last() {
        let old = tree(&[("q1", 0, &[("a", 1)]), ("q2", 0, &[("a", 1)])]);
        let new = tree(&[("q2", 0, &[("a", 5), ("b", 6)]), ("q3", 0, &[("a", 7)])]);
        let mutations = reconcile_tree(&old, &new);

        let last = mutations.last().expect("mutations");
        assert!(matches!(last, Mutation::Remove { path } if path.as_slice() == ["q1"]));

        let inserts: Vec<_> = mutations
            .iter()
            .filter(|m| matches!(m, Mutation::Insert { .. }))
            .map(|m| m.path().to_vec())
            .collect();
        assert_eq!(inserts, vec![vec!["q3"], vec!["q3", "a"], vec!["q2", "b"]]);
    }

    #[test]
    fn persisting_group_updates_children_in_place() {
        let old = tree(&[("q1", 0, &[("a", 1), ("b", 2)])]);
        let new = tree(&[("q1", 0, &[("a", 3)])]);
        let mutations = reconcile_tree(&old, &new);
        assert_eq!(mutations.len(), 2);
        assert!(matches!(&mutations[0], Mutation::Update { path, element: 3 } if path.as_slice() == ["q1", "a"]));
        assert!(matches!(&mutations[1], Mutation::Remove { path } if path.as_slice() == ["q1", "b"]));
    }

    #[test]
    fn identical_trees_produce_no_mutations() {
        let old = tree(&[("q1", 0, &[("a", 1)])]);
        assert!(reconcile_tree(&old, &old.clone()).is_empty());
    }

    #[test]
    fn revert_undoes_updates_inserts_and_removals() {
        let old = tree(&[("q1", 0, &[("a", 1), ("b", 2)]), ("q2", 0, &[("a", 3)])]);
        let new = tree(&[("q1", 0, &[("a", 9)]), ("q3", 0, &[])]);
        let applied = reconcile_tree(&old, &new);
        let undo = revert(&old, &applied);

        assert!(matches!(&undo[0], Mutation::Insert { path, element: 0 } if path.as_slice() == ["q2"]));
        assert!(matches!(&undo[1], Mutation::Insert { path, element: 3 } if path.as_slice() == ["q2", "a"]));
        assert!(undo.iter().any(|m| matches!(m, Mutation::Update { path, element: 1 } if path.as_slice() == ["q1", "a"])));
        assert!(undo.iter().any(|m| matches!(m, Mutation::Remove { path } if path.as_slice() == ["q3"])));
        assert_eq!(undo.len(), applied.len() + 1);
    }

    #[test]
    fn node_at_walks_nested_paths() {
        let old = tree(&[("q1", 0, &[("a", 1)])]);
        assert_eq!(node_at(&old, &["q1", "a"]).map(|node| node.element), Some(1));
        assert!(node_at(&old, &["q1", "b"]).is_none());
        assert!(node_at(&old, &[]).is_none());
    }
}
