pub mod squarify;

use std::collections::HashMap;

use crate::tree::NodeId;

pub use squarify::compute_layout;

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRect {
    pub node: NodeId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Recursion depth relative to the layout root (root = 0).
    pub depth: u16,
    /// Display value of the node (group average or card value), so the
    /// color scale can be applied without re-walking the stats.
    pub value: f32,
}

impl LayoutRect {
    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}

/// A group-boundary divider, emitted once per drawn group. `layer` is the
/// visual stroke weight; it halves at each nesting level.
#[derive(Debug, Clone, Copy)]
pub struct BorderRect {
    pub node: NodeId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub layer: f32,
}

/// The full layout result (rects + fast lookup).
#[derive(Debug)]
pub struct Layout {
    /// All rectangles (cards + group backgrounds, for interaction).
    pub rects: Vec<LayoutRect>,
    /// Group-boundary dividers, decorative.
    pub borders: Vec<BorderRect>,
    /// node → index of its first rect in `rects` (O(1) hover lookup).
    pub node_to_rect: HashMap<NodeId, usize>,
}

/// Configuration for treemap layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// Border stroke weight at the layout root; halves per nesting level.
    pub border_layer: f32,
    /// Maximum recursion depth (safety bound).
    pub max_depth: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { border_layer: 5.0, max_depth: 64 }
    }
}
