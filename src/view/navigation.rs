use crate::tree::arena::{CardTree, NodeId};

/// Resolve a group path against a tree, falling back to the deepest
/// existing ancestor when a segment no longer exists (groups come and
/// go across refreshes).
pub fn resolve_path(tree: &CardTree, path: &[String]) -> NodeId {
    let mut current = tree.root;
    for segment in path {
        match tree.subgroup(current, segment) {
            Some(child) => current = child,
            None => break,
        }
    }
    current
}

/// Navigation state: tracks the current view root and history.
pub struct NavigationState {
    /// Stack of view roots (for back navigation)
    history: Vec<NodeId>,
    /// Current view root
    pub current_root: NodeId,
}

impl NavigationState {
    pub fn new(root: NodeId) -> Self {
        Self {
            history: Vec::new(),
            current_root: root,
        }
    }

    /// Drill down into a group node.
    /// Returns true if navigation happened.
    pub fn drill_down(&mut self, node: NodeId, tree: &CardTree) -> bool {
        let target = tree.get(node);

        // Clicking a card drills into its parent group instead
        let target_id = if target.is_group() {
            node
        } else {
            match target.parent {
                Some(parent) if parent != self.current_root => parent,
                _ => return false,
            }
        };

        // Don't drill into the same node
        if target_id == self.current_root {
            return false;
        }

        self.history.push(self.current_root);
        self.current_root = target_id;
        true
    }

    /// Navigate up one level.
    /// Returns true if navigation happened.
    pub fn navigate_up(&mut self) -> bool {
        if let Some(prev) = self.history.pop() {
            self.current_root = prev;
            true
        } else {
            false
        }
    }

    /// Navigate to the absolute root.
    pub fn navigate_home(&mut self, root: NodeId) {
        self.history.clear();
        self.current_root = root;
    }

    /// Re-anchor after a tree refresh: the old root may be gone, so
    /// resolve its path against the new tree and reset history.
    pub fn reanchor(&mut self, old_path: &[String], tree: &CardTree) {
        self.history.clear();
        self.current_root = resolve_path(tree, old_path);
    }

    /// Current depth in navigation history.
    pub fn depth(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::arena::{CardRecord, CardTree, Node};
    use compact_str::CompactString;

    fn group(name: &str) -> Node {
        Node {
            name: CompactString::new(name),
            card: None,
            parent: None,
            first_child: None,
            next_sibling: None,
            depth: 0,
        }
    }

    fn card(front: &str) -> Node {
        Node {
            card: Some(CardRecord {
                cid: None,
                front: front.to_owned(),
                back: String::new(),
                stability: 10.0,
                difficulty: 5.0,
                decay: -0.5,
                last_review: 0.0,
                paused: false,
            }),
            ..group("")
        }
    }

    fn sample_tree() -> CardTree {
        // root / math / algebra, root / history, plus a card under algebra
        let mut tree = CardTree::new();
        let math = tree.add_child(tree.root, group("math"));
        let algebra = tree.add_child(math, group("algebra"));
        tree.add_child(tree.root, group("history"));
        tree.add_child(algebra, card("<p>quadratic</p>"));
        tree
    }

    #[test]
    fn resolve_full_path() {
        let tree = sample_tree();
        let path = vec![String::from("math"), String::from("algebra")];
        let id = resolve_path(&tree, &path);
        assert_eq!(tree.group_path(id), vec!["math", "algebra"]);
    }

    #[test]
    fn resolve_stops_at_deepest_existing_ancestor() {
        let tree = sample_tree();
        let path = vec![String::from("math"), String::from("calculus")];
        let id = resolve_path(&tree, &path);
        assert_eq!(tree.group_path(id), vec!["math"]);
    }

    #[test]
    fn resolve_of_fully_missing_path_is_root() {
        let tree = sample_tree();
        let path = vec![String::from("geography")];
        assert_eq!(resolve_path(&tree, &path), tree.root);
    }

    #[test]
    fn resolve_of_empty_path_is_root() {
        let tree = sample_tree();
        assert_eq!(resolve_path(&tree, &[]), tree.root);
    }

    #[test]
    fn drill_down_and_back() {
        let tree = sample_tree();
        let math = tree.subgroup(tree.root, "math").unwrap();
        let mut nav = NavigationState::new(tree.root);

        assert!(nav.drill_down(math, &tree));
        assert_eq!(nav.current_root, math);
        assert_eq!(nav.depth(), 1);

        assert!(nav.navigate_up());
        assert_eq!(nav.current_root, tree.root);
        assert!(!nav.navigate_up());
    }

    #[test]
    fn drill_down_on_card_enters_its_group() {
        let tree = sample_tree();
        let math = tree.subgroup(tree.root, "math").unwrap();
        let algebra = tree.subgroup(math, "algebra").unwrap();
        let card = tree.children(algebra).find(|&c| !tree.get(c).is_group()).unwrap();

        let mut nav = NavigationState::new(tree.root);
        assert!(nav.drill_down(card, &tree));
        assert_eq!(nav.current_root, algebra);
    }

    #[test]
    fn drill_down_into_current_root_is_a_noop() {
        let tree = sample_tree();
        let mut nav = NavigationState::new(tree.root);
        assert!(!nav.drill_down(tree.root, &tree));
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn navigate_home_clears_history() {
        let tree = sample_tree();
        let math = tree.subgroup(tree.root, "math").unwrap();
        let algebra = tree.subgroup(math, "algebra").unwrap();
        let mut nav = NavigationState::new(tree.root);
        nav.drill_down(math, &tree);
        nav.drill_down(algebra, &tree);

        nav.navigate_home(tree.root);
        assert_eq!(nav.current_root, tree.root);
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn reanchor_survives_a_vanished_group() {
        let tree = sample_tree();
        let math = tree.subgroup(tree.root, "math").unwrap();
        let algebra = tree.subgroup(math, "algebra").unwrap();
        let mut nav = NavigationState::new(tree.root);
        nav.drill_down(math, &tree);
        nav.drill_down(algebra, &tree);
        let old_path = tree.group_path(nav.current_root);

        // New tree without algebra
        let mut refreshed = CardTree::new();
        let refreshed_root = refreshed.root;
        refreshed.add_child(refreshed_root, group("math"));
        nav.reanchor(&old_path, &refreshed);
        assert_eq!(refreshed.group_path(nav.current_root), vec!["math"]);
        assert_eq!(nav.depth(), 0);
    }
}
