use compact_str::CompactString;

/// Index into the arena `Vec<Node>`. u32 keeps the tree compact; real
/// collections top out in the tens of thousands of cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Memory-state parameters of a card, straight off the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    /// Backend card id, when the backend sends one. Stable identity is the
    /// arena ordinal (group path + stream position).
    pub cid: Option<u64>,
    /// Front/back HTML. Untrusted; sanitize before display.
    pub front: String,
    pub back: String,
    /// Stability in days. Zero means retention is a defined 0.
    pub stability: f64,
    pub difficulty: f64,
    /// Forgetting-curve shape parameter. Used as a divisor; must be nonzero.
    pub decay: f64,
    /// Last review time, Unix seconds.
    pub last_review: f64,
    pub paused: bool,
}

/// A node in the group tree: either a named group or a card leaf.
/// Sibling-list representation, same layout for both kinds.
#[derive(Debug, Clone)]
pub struct Node {
    /// Group name (card leaves keep an empty name).
    pub name: CompactString,
    /// `Some` for card leaves, `None` for groups.
    pub card: Option<CardRecord>,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0).
    pub depth: u16,
}

impl Node {
    pub fn is_group(&self) -> bool {
        self.card.is_none()
    }
}

/// The group/card tree stored as a flat arena. Children always have higher
/// indices than their parent; `add_child` guarantees it and the aggregation
/// pass relies on it.
pub struct CardTree {
    pub nodes: Vec<Node>,
    pub root: NodeId,
}

impl CardTree {
    /// Create a tree containing only the (nameless) root group.
    pub fn new() -> Self {
        let root = Node {
            name: CompactString::new(""),
            card: None,
            parent: None,
            first_child: None,
            next_sibling: None,
            depth: 0,
        };
        CardTree { nodes: vec![root], root: NodeId(0) }
    }

    /// Add a child node under the given parent. Prepends to the sibling
    /// list (O(1)); `normalize_sibling_order` restores display order.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.depth = self.nodes[parent.index()].depth + 1;
        node.next_sibling = self.nodes[parent.index()].first_child;
        self.nodes[parent.index()].first_child = Some(new_id);
        self.nodes.push(node);
        new_id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node in sibling-list order.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter { tree: self, current: self.nodes[parent.index()].first_child }
    }

    /// Find a direct subgroup by name.
    pub fn subgroup(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .find(|&id| self.get(id).is_group() && self.get(id).name == name)
    }

    /// Ordered group-name segments from the root to `id` (empty for root).
    pub fn group_path(&self, id: NodeId) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = id;
        loop {
            let node = self.get(current);
            if node.is_group() && !node.name.is_empty() {
                segments.push(node.name.to_string());
            }
            match node.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        segments.reverse();
        segments
    }
}

impl Default for CardTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a CardTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}
