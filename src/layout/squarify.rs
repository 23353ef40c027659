//! Squarified treemap layout over an aggregated card tree.
//!
//! Row filling is greedy: items join the current row while the row's worst
//! aspect ratio does not get worse; committing a row consumes a slice of
//! the remaining space proportional to the row's share of the remaining
//! weight. Groups recurse into their allocated rectangle; a group that has
//! both subgroups and direct cards lays the cards out as one synthetic
//! bucket next to the subgroups.

use std::collections::hash_map::Entry;

use super::{BorderRect, Layout, LayoutConfig, LayoutRect};
use crate::tree::aggregate::Stats;
use crate::tree::{CardTree, NodeId};

#[derive(Debug, Clone, Copy)]
enum ItemKind {
    Group(NodeId),
    /// Direct cards of a group that also has subgroups, laid out as one
    /// nested cards-only region of that same group.
    CardsBucket(NodeId),
    Card(NodeId),
}

#[derive(Debug, Clone, Copy)]
struct Item {
    kind: ItemKind,
    weight: f64,
    value: f64,
}

struct LayoutPass<'a> {
    tree: &'a CardTree,
    stats: &'a Stats,
    config: &'a LayoutConfig,
    rects: Vec<LayoutRect>,
    borders: Vec<BorderRect>,
    node_to_rect: std::collections::HashMap<NodeId, usize>,
}

/// Compute the layout for any subtree (root can be any group, for
/// drill-down) inside a `viewport_w` × `viewport_h` rectangle.
pub fn compute_layout(
    tree: &CardTree,
    stats: &Stats,
    root: NodeId,
    viewport_w: f32,
    viewport_h: f32,
    config: &LayoutConfig,
) -> Layout {
    let mut pass = LayoutPass {
        tree,
        stats,
        config,
        rects: Vec::with_capacity(tree.len()),
        borders: Vec::new(),
        node_to_rect: std::collections::HashMap::with_capacity(tree.len()),
    };

    pass.draw_group(
        root,
        [0.0, 0.0],
        [viewport_w as f64, viewport_h as f64],
        config.border_layer as f64,
        false,
        0,
    );

    tracing::debug!(
        "layout: {} rects, {} borders for {}x{} viewport",
        pass.rects.len(),
        pass.borders.len(),
        viewport_w,
        viewport_h
    );
    Layout { rects: pass.rects, borders: pass.borders, node_to_rect: pass.node_to_rect }
}

impl LayoutPass<'_> {
    fn draw_group(
        &mut self,
        group: NodeId,
        pos: [f64; 2],
        size: [f64; 2],
        layer: f64,
        mut cards_only: bool,
        depth: u16,
    ) {
        if depth >= self.config.max_depth {
            return;
        }

        // Background rect carries the group's aggregated value.
        self.emit_rect(group, pos, size, depth, self.stats.get(group).value);

        let has_subgroups = self.tree.children(group).any(|id| self.tree.get(id).is_group());
        if !has_subgroups {
            cards_only = true;
        }

        // Heaviest first. The stable sort keeps the lexicographic subgroup
        // order (and card stream order) among equal weights.
        let mut items = self.collect_items(group, cards_only);
        items.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        self.arrange(&items, pos, size, layer, cards_only, depth);

        // One divider per drawn group boundary, cards included or not.
        self.borders.push(BorderRect {
            node: group,
            x: pos[0] as f32,
            y: pos[1] as f32,
            w: size[0] as f32,
            h: size[1] as f32,
            layer: layer as f32,
        });
    }

    fn collect_items(&self, group: NodeId, cards_only: bool) -> Vec<Item> {
        let mut items = Vec::new();
        if cards_only {
            for id in self.tree.children(group) {
                if self.tree.get(id).is_group() {
                    continue;
                }
                let stat = self.stats.get(id);
                items.push(Item { kind: ItemKind::Card(id), weight: stat.weight, value: stat.value });
            }
            return items;
        }

        let mut direct_card_weight = 0.0;
        let mut has_direct_cards = false;
        for id in self.tree.children(group) {
            let node = self.tree.get(id);
            if node.is_group() {
                let stat = self.stats.get(id);
                items.push(Item {
                    kind: ItemKind::Group(id),
                    weight: stat.weight,
                    value: stat.value,
                });
            } else {
                has_direct_cards = true;
                direct_card_weight += self.stats.get(id).weight;
            }
        }
        if has_direct_cards {
            items.push(Item {
                kind: ItemKind::CardsBucket(group),
                weight: direct_card_weight,
                value: 0.0,
            });
        }
        items
    }

    /// The squarify row loop. `pos`/`size` are [x, y] pairs; `ax` is the
    /// axis items are laid along within a row, `ay` the axis rows consume.
    fn arrange(
        &mut self,
        items: &[Item],
        mut pos: [f64; 2],
        mut size: [f64; 2],
        layer: f64,
        cards_only: bool,
        depth: u16,
    ) {
        // Degenerate region: everything inside is zero-area, not an error.
        // Zero-weight cards still get nothing, as in the weighted path.
        if size[0] <= 0.0 || size[1] <= 0.0 {
            for item in items {
                if item.weight == 0.0 && matches!(item.kind, ItemKind::Card(_)) {
                    continue;
                }
                self.place(item, pos, [0.0, 0.0], layer, depth);
            }
            return;
        }

        let mut total_weight: f64 = items.iter().map(|item| item.weight).sum();
        let mut i = 0;
        while i < items.len() {
            // Cards-only regions flip the row axis when the region is
            // wider than tall, so card grids stay square-ish.
            let (ax, ay) =
                if cards_only && size[0] > size[1] { (1usize, 0usize) } else { (0usize, 1usize) };

            // Zero-weight items get no screen area. Groups still recurse
            // so their (equally weightless) descendants exist.
            while i < items.len() && items[i].weight == 0.0 {
                if !matches!(items[i].kind, ItemKind::Card(_)) {
                    self.place(&items[i], pos, [0.0, 0.0], layer, depth);
                }
                i += 1;
            }
            if i >= items.len() {
                break;
            }

            // Grow the row while the worst aspect ratio improves.
            let mut row_weight = items[i].weight;
            let mut row_len = row_weight / total_weight * size[ay];
            let mut item_len = items[i].weight / row_weight * size[ax];
            let mut aspect = ratio(item_len, row_len);
            let mut j = i + 1;
            while j < items.len() {
                if items[j].weight == 0.0 {
                    j += 1;
                    continue;
                }
                row_weight += items[j].weight;
                row_len = row_weight / total_weight * size[ay];
                item_len = items[j].weight / row_weight * size[ax];
                let aspect2 = ratio(item_len, row_len);
                if aspect2 < aspect {
                    row_weight -= items[j].weight;
                    break;
                }
                aspect = aspect2;
                j += 1;
            }

            // Commit the row.
            let row_len = row_weight / total_weight * size[ay];
            let mut cursor = pos;
            for item in &items[i..j] {
                if item.weight == 0.0 {
                    if !matches!(item.kind, ItemKind::Card(_)) {
                        self.place(item, cursor, [0.0, 0.0], layer, depth);
                    }
                    continue;
                }
                let item_len = item.weight / row_weight * size[ax];
                let mut cell = [0.0; 2];
                cell[ay] = row_len;
                cell[ax] = item_len;
                self.place(item, cursor, cell, layer, depth);
                cursor[ax] += item_len;
            }

            pos[ay] += row_len;
            size[ay] -= row_len;
            total_weight -= row_weight;
            i = j;
        }
    }

    fn place(&mut self, item: &Item, pos: [f64; 2], size: [f64; 2], layer: f64, depth: u16) {
        match item.kind {
            ItemKind::Card(id) => {
                self.emit_rect(id, pos, size, depth + 1, item.value);
            }
            ItemKind::Group(id) => {
                self.draw_group(id, pos, size, layer * 0.5, false, depth + 1);
            }
            ItemKind::CardsBucket(id) => {
                self.draw_group(id, pos, size, layer * 0.5, true, depth + 1);
            }
        }
    }

    fn emit_rect(&mut self, node: NodeId, pos: [f64; 2], size: [f64; 2], depth: u16, value: f64) {
        let idx = self.rects.len();
        self.rects.push(LayoutRect {
            node,
            x: pos[0] as f32,
            y: pos[1] as f32,
            w: size[0] as f32,
            h: size[1] as f32,
            depth,
            value: value as f32,
        });
        // A group drawn again as its own cards bucket keeps its first
        // (full-region) rect in the lookup.
        if let Entry::Vacant(entry) = self.node_to_rect.entry(node) {
            entry.insert(idx);
        }
    }
}

fn ratio(a: f64, b: f64) -> f64 {
    if b > a {
        a / b
    } else {
        b / a
    }
}
