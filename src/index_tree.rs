//! Ordered index of the cells a grid has materialized.
//!
//! A binary search tree over cell indices, stored in an arena of nodes addressed by slot number.
//! Node priorities are a fixed hash of the key (a treap), so the shape depends only on the set of
//! keys held and stays shallow whatever order cells are materialized in.

use crate::cells::CellIndex;

type NodeId = usize;

#[derive(Debug, Clone)]
struct TreeNode {
    key: CellIndex,
    priority: u64,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct IndexTree {
    nodes: Vec<TreeNode>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

// splitmix64 finalizer
fn priority_of(key: CellIndex) -> u64 {
    let mut z = (key.0 as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

impl IndexTree {
    pub fn new() -> IndexTree {
        IndexTree::default()
    }

    pub fn with_capacity(capacity: usize) -> IndexTree {
        IndexTree {
            nodes: Vec::with_capacity(capacity),
            ..IndexTree::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<CellIndex> {
        self.root.map(|id| self.nodes[id].key)
    }

    /// Returns false if the index is already present.
    pub fn insert(&mut self, key: CellIndex) -> bool {
        let (root, inserted) = self.insert_node(self.root, key);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Returns false if the index was not present.
    pub fn delete(&mut self, key: CellIndex) -> bool {
        let (root, deleted) = self.delete_node(self.root, key);
        self.root = root;
        if deleted {
            self.len -= 1;
        }
        deleted
    }

    /// Move `old` to `new`. Fails without change if `old` is absent or `new` is occupied.
    pub fn update(&mut self, old: CellIndex, new: CellIndex) -> bool {
        if old == new {
            return self.contains(old);
        }
        if !self.contains(old) || self.contains(new) {
            return false;
        }
        self.delete(old);
        self.insert(new)
    }

    #[inline]
    pub fn contains(&self, key: CellIndex) -> bool {
        self.find_from(self.root, key).is_some()
    }

    /// Search for `key` beginning at the subtree rooted at `start`.
    ///
    /// A `start` that is absent, or whose subtree cannot hold `key`, falls back to the whole tree.
    pub fn search_from(&self, start: CellIndex, key: CellIndex) -> bool {
        let start_node = self.find_from(self.root, start);
        if start_node.is_some() && self.find_from(start_node, key).is_some() {
            return true;
        }
        self.contains(key)
    }

    /// Every held index in ascending order.
    pub fn in_order(&self) -> Vec<CellIndex> {
        let mut ordered = Vec::with_capacity(self.len);
        let mut stack: Vec<NodeId> = vec![];
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.nodes[id].left;
            }
            if let Some(id) = stack.pop() {
                ordered.push(self.nodes[id].key);
                current = self.nodes[id].right;
            }
        }
        ordered
    }

    /// Longest root to leaf path, counted in nodes.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, d)) = stack.pop() {
            deepest = deepest.max(d);
            let node = &self.nodes[id];
            stack.extend(node.left.map(|l| (l, d + 1)));
            stack.extend(node.right.map(|r| (r, d + 1)));
        }
        deepest
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    fn find_from(&self, start: Option<NodeId>, key: CellIndex) -> Option<NodeId> {
        let mut current = start;
        while let Some(id) = current {
            let node = &self.nodes[id];
            if key == node.key {
                return Some(id);
            }
            current = if key < node.key { node.left } else { node.right };
        }
        None
    }

    fn alloc(&mut self, key: CellIndex) -> NodeId {
        let node = TreeNode {
            key,
            priority: priority_of(key),
            left: None,
            right: None,
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id] = node;
            id
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn insert_node(&mut self, subtree: Option<NodeId>, key: CellIndex) -> (NodeId, bool) {
        let id = match subtree {
            Some(id) => id,
            None => return (self.alloc(key), true),
        };
        let node_key = self.nodes[id].key;
        if key == node_key {
            return (id, false);
        }

        if key < node_key {
            let (child, inserted) = self.insert_node(self.nodes[id].left, key);
            self.nodes[id].left = Some(child);
            if self.nodes[child].priority > self.nodes[id].priority {
                return (self.rotate_right(id, child), inserted);
            }
            (id, inserted)
        } else {
            let (child, inserted) = self.insert_node(self.nodes[id].right, key);
            self.nodes[id].right = Some(child);
            if self.nodes[child].priority > self.nodes[id].priority {
                return (self.rotate_left(id, child), inserted);
            }
            (id, inserted)
        }
    }

    fn delete_node(&mut self, subtree: Option<NodeId>, key: CellIndex) -> (Option<NodeId>, bool) {
        let id = match subtree {
            Some(id) => id,
            None => return (None, false),
        };
        let node_key = self.nodes[id].key;
        if key < node_key {
            let (left, deleted) = self.delete_node(self.nodes[id].left, key);
            self.nodes[id].left = left;
            (Some(id), deleted)
        } else if key > node_key {
            let (right, deleted) = self.delete_node(self.nodes[id].right, key);
            self.nodes[id].right = right;
            (Some(id), deleted)
        } else {
            let merged = self.merge(self.nodes[id].left, self.nodes[id].right);
            self.free.push(id);
            (merged, true)
        }
    }

    // Every key in `lower` is less than every key in `upper`.
    fn merge(&mut self, lower: Option<NodeId>, upper: Option<NodeId>) -> Option<NodeId> {
        match (lower, upper) {
            (None, other) | (other, None) => other,
            (Some(a), Some(b)) => {
                if self.nodes[a].priority > self.nodes[b].priority {
                    let right = self.merge(self.nodes[a].right, Some(b));
                    self.nodes[a].right = right;
                    Some(a)
                } else {
                    let left = self.merge(Some(a), self.nodes[b].left);
                    self.nodes[b].left = left;
                    Some(b)
                }
            }
        }
    }

    fn rotate_right(&mut self, id: NodeId, left: NodeId) -> NodeId {
        self.nodes[id].left = self.nodes[left].right;
        self.nodes[left].right = Some(id);
        left
    }

    fn rotate_left(&mut self, id: NodeId, right: NodeId) -> NodeId {
        self.nodes[id].right = self.nodes[right].left;
        self.nodes[right].left = Some(id);
        right
    }
}
