pub mod aggregate;
pub mod arena;

use compact_str::CompactString;

pub use self::arena::{CardRecord, CardTree, Node, NodeId};
use crate::fetch::{ApiCard, ApiItem};

/// Build a CardTree from the flat, order-dependent wire stream.
///
/// A group marker sets the current path for every card that follows it;
/// cards seen before any marker attach to the root. The tree is rebuilt
/// from scratch on every refresh, never mutated incrementally.
pub fn build_tree(items: &[ApiItem]) -> CardTree {
    let mut tree = CardTree::new();
    if items.is_empty() {
        return tree;
    }

    let mut current = tree.root;
    let mut cards = 0usize;
    let mut markers = 0usize;

    for item in items {
        match item {
            ApiItem::Group(marker) => {
                current = ensure_group(&mut tree, &marker.group);
                markers += 1;
            }
            ApiItem::Card(card) => {
                attach_card(&mut tree, current, card);
                cards += 1;
            }
        }
    }

    normalize_sibling_order(&mut tree);

    tracing::info!(
        "tree built: {} nodes ({} cards, {} group markers)",
        tree.len(),
        cards,
        markers
    );
    tree
}

/// Walk `path` from the root, creating missing groups on demand.
/// Idempotent: an existing segment is reused, never duplicated.
fn ensure_group(tree: &mut CardTree, path: &[String]) -> NodeId {
    let mut current = tree.root;
    for segment in path {
        current = match tree.subgroup(current, segment) {
            Some(id) => id,
            None => tree.add_child(
                current,
                Node {
                    name: CompactString::new(segment),
                    card: None,
                    parent: None,
                    first_child: None,
                    next_sibling: None,
                    depth: 0,
                },
            ),
        };
    }
    current
}

fn attach_card(tree: &mut CardTree, group: NodeId, card: &ApiCard) -> NodeId {
    tree.add_child(
        group,
        Node {
            name: CompactString::new(""),
            card: Some(CardRecord {
                cid: card.cid,
                front: card.front.clone(),
                back: card.back.clone(),
                stability: card.stability,
                difficulty: card.difficulty,
                decay: card.decay,
                last_review: card.time,
                paused: card.paused,
            }),
            parent: None,
            first_child: None,
            next_sibling: None,
            depth: 0,
        },
    )
}

/// Re-link every group's sibling list into display order: subgroups first,
/// lexicographic by name, then direct cards in stream order. `add_child`
/// prepends, so without this pass children iterate in reverse.
fn normalize_sibling_order(tree: &mut CardTree) {
    for i in 0..tree.nodes.len() {
        let parent = NodeId(i as u32);
        if !tree.get(parent).is_group() || tree.get(parent).first_child.is_none() {
            continue;
        }

        let mut children: Vec<NodeId> = tree.children(parent).collect();
        children.sort_by(|&a, &b| {
            let (na, nb) = (tree.get(a), tree.get(b));
            match (na.is_group(), nb.is_group()) {
                (true, false) => std::cmp::Ordering::Less,
                (false, true) => std::cmp::Ordering::Greater,
                (true, true) => na.name.cmp(&nb.name),
                // Arena index is insertion order, i.e. stream order.
                (false, false) => a.0.cmp(&b.0),
            }
        });

        tree.get_mut(parent).first_child = Some(children[0]);
        for w in children.windows(2) {
            tree.get_mut(w[0]).next_sibling = Some(w[1]);
        }
        if let Some(&last) = children.last() {
            tree.get_mut(last).next_sibling = None;
        }
    }
}
