use super::arena::{CardTree, NodeId};
use crate::errors::RetmapError;
use crate::options::DisplayOptions;
use crate::retention;

/// Per-node statistics, parallel to the arena. Indexed by `NodeId`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeStat {
    /// Card: the card's weight. Group: total weight of the subtree.
    pub weight: f64,
    /// Card: the card's value. Group: weighted average over the subtree
    /// (0 when the subtree has zero total weight).
    pub value: f64,
    /// Card: 1. Group: own card count plus all descendants'.
    pub cards: u32,
}

/// Statistics for one aggregation pass. A pure function of the tree, the
/// display options, and the evaluation time; re-running with different
/// options starts from scratch, so metric selections never contaminate
/// each other.
#[derive(Debug)]
pub struct Stats {
    nodes: Vec<NodeStat>,
    /// Evaluation time the pass used (Unix seconds).
    pub eval_time: f64,
}

impl Stats {
    pub fn get(&self, id: NodeId) -> NodeStat {
        self.nodes[id.index()]
    }
}

/// Compute statistics for every node, bottom-up.
///
/// Children always have higher arena indices than their parent, so a
/// single reverse-index walk finalizes every child before its parent: a
/// post-order traversal without recursion. The first card whose statistic
/// comes out non-finite aborts the pass with that card's error.
pub fn aggregate(tree: &CardTree, options: &DisplayOptions) -> Result<Stats, RetmapError> {
    let now = options.eval_time();
    let mut nodes = vec![NodeStat::default(); tree.len()];

    for i in (0..tree.len()).rev() {
        let node = &tree.nodes[i];
        if let Some(card) = &node.card {
            nodes[i] = NodeStat {
                weight: retention::card_weight(options.weight, card),
                value: retention::card_value(options.value, card, now)?,
                cards: 1,
            };
            continue;
        }

        // Group: children are already finalized. Sum weights and
        // weight-scaled values once, divide once.
        let mut total_weight = 0.0;
        let mut weighted_sum = 0.0;
        let mut cards = 0u32;
        let mut child = node.first_child;
        while let Some(child_id) = child {
            let stat = nodes[child_id.index()];
            total_weight += stat.weight;
            weighted_sum += stat.weight * stat.value;
            cards += stat.cards;
            child = tree.nodes[child_id.index()].next_sibling;
        }
        nodes[i] = NodeStat {
            weight: total_weight,
            value: if total_weight > 0.0 { weighted_sum / total_weight } else { 0.0 },
            cards,
        };
    }

    tracing::debug!(
        "aggregated {} nodes: root weight {:.3}, {} cards",
        tree.len(),
        nodes[tree.root.index()].weight,
        nodes[tree.root.index()].cards
    );
    Ok(Stats { nodes, eval_time: now })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{ApiCard, ApiGroup, ApiItem};
    use crate::options::{ValueMetric, WeightMetric};
    use crate::tree::build_tree;

    fn marker(path: &[&str]) -> ApiItem {
        ApiItem::Group(ApiGroup { group: path.iter().map(|s| s.to_string()).collect() })
    }

    fn card(stability: f64, difficulty: f64) -> ApiItem {
        ApiItem::Card(ApiCard {
            cid: None,
            time: 1_700_000_000.0,
            difficulty,
            stability,
            decay: 0.5,
            front: String::new(),
            back: String::new(),
            paused: false,
        })
    }

    fn options(value: ValueMetric, weight: WeightMetric) -> DisplayOptions {
        DisplayOptions {
            value,
            weight,
            // Fixed evaluation time keeps the expectations exact.
            time_override: Some(1_700_000_000.0),
            ..DisplayOptions::default()
        }
    }

    fn sample_tree() -> CardTree {
        build_tree(&[
            marker(&["a"]),
            card(10.0, 2.0),
            card(20.0, 6.0),
            marker(&["a", "b"]),
            card(5.0, 4.0),
            marker(&[]),
            card(7.0, 8.0),
        ])
    }

    #[test]
    fn card_counts_include_all_descendants() {
        let tree = sample_tree();
        let stats =
            aggregate(&tree, &options(ValueMetric::Retention, WeightMetric::Count)).unwrap();

        // Invariant: every group's count equals own cards + children's counts.
        for i in 0..tree.len() {
            let id = NodeId(i as u32);
            if !tree.get(id).is_group() {
                continue;
            }
            let expected: u32 = tree.children(id).map(|c| stats.get(c).cards).sum();
            assert_eq!(stats.get(id).cards, expected);
        }
        assert_eq!(stats.get(tree.root).cards, 4);
    }

    #[test]
    fn identical_values_average_to_that_value_under_any_weighting() {
        // StabilityDays with equal stabilities: every card's value is 5.0,
        // difficulty weights differ wildly.
        let tree = build_tree(&[
            marker(&["a"]),
            card(5.0, 1.0),
            card(5.0, 9.0),
            marker(&["a", "b"]),
            card(5.0, 0.5),
        ]);
        let stats =
            aggregate(&tree, &options(ValueMetric::StabilityDays, WeightMetric::Difficulty))
                .unwrap();
        assert!((stats.get(tree.root).value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn count_weighting_sums_cards() {
        let tree = sample_tree();
        let stats =
            aggregate(&tree, &options(ValueMetric::StabilityDays, WeightMetric::Count)).unwrap();
        assert_eq!(stats.get(tree.root).weight, 4.0);
        // (10 + 20 + 5 + 7) / 4
        assert!((stats.get(tree.root).value - 10.5).abs() < 1e-12);
    }

    #[test]
    fn difficulty_weighting_uses_card_difficulty() {
        let tree = sample_tree();
        let stats =
            aggregate(&tree, &options(ValueMetric::StabilityDays, WeightMetric::Difficulty))
                .unwrap();
        let expected_weight = 2.0 + 6.0 + 4.0 + 8.0;
        assert!((stats.get(tree.root).weight - expected_weight).abs() < 1e-12);
        let expected_value =
            (10.0 * 2.0 + 20.0 * 6.0 + 5.0 * 4.0 + 7.0 * 8.0) / expected_weight;
        assert!((stats.get(tree.root).value - expected_value).abs() < 1e-12);
    }

    #[test]
    fn empty_subtree_reports_zero_average_without_dividing() {
        let tree = build_tree(&[marker(&["empty", "deeper"]), marker(&[])]);
        let stats =
            aggregate(&tree, &options(ValueMetric::Retention, WeightMetric::Count)).unwrap();
        let empty = tree.subgroup(tree.root, "empty").unwrap();
        assert_eq!(stats.get(empty).weight, 0.0);
        assert_eq!(stats.get(empty).value, 0.0);
        assert_eq!(stats.get(empty).cards, 0);
    }

    #[test]
    fn reruns_with_different_metrics_are_independent() {
        let tree = sample_tree();
        let by_count =
            aggregate(&tree, &options(ValueMetric::StabilityDays, WeightMetric::Count)).unwrap();
        let by_difficulty =
            aggregate(&tree, &options(ValueMetric::StabilityDays, WeightMetric::Difficulty))
                .unwrap();
        let by_count_again =
            aggregate(&tree, &options(ValueMetric::StabilityDays, WeightMetric::Count)).unwrap();

        assert_eq!(by_count.get(tree.root).weight, by_count_again.get(tree.root).weight);
        assert_eq!(by_count.get(tree.root).value, by_count_again.get(tree.root).value);
        assert_ne!(by_count.get(tree.root).weight, by_difficulty.get(tree.root).weight);
    }

    #[test]
    fn bad_card_aborts_the_pass() {
        let mut items = vec![marker(&["a"]), card(10.0, 2.0)];
        if let ApiItem::Card(c) = &mut items[1] {
            c.decay = 0.0;
        }
        let tree = build_tree(&items);
        let result = aggregate(&tree, &options(ValueMetric::Retention, WeightMetric::Count));
        assert!(matches!(result, Err(RetmapError::NonFiniteStatistic { .. })));
    }
}
