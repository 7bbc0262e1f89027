//! Space-partitioning layout: squarified treemap (Bruls, Huizing, van Wijk)
//! plus the walk that assigns a rectangle to every display node.
//!
//! Child order is taken as given — the transform already sorted children, so
//! the row-building here never reorders items.

use crate::model::DisplayNode;

/// Reconciliation key of the tree root, whose own path is the empty string.
pub const ROOT_KEY: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Item to be laid out in the treemap
#[derive(Debug, Clone)]
pub struct TreemapItem {
    pub size: u64,
    pub index: usize,
}

/// Result of the treemap layout calculation
#[derive(Debug, Clone)]
pub struct LayoutRect {
    pub rect: Rect,
    pub index: usize,
}

pub struct SquarifiedTreemap;

impl SquarifiedTreemap {
    /// Calculate the squarified treemap layout, preserving item order.
    pub fn layout(items: &[TreemapItem], container: Rect) -> Vec<LayoutRect> {
        if items.is_empty() {
            return vec![];
        }

        let total_size: u64 = items.iter().map(|item| item.size).sum();
        if total_size == 0 {
            return vec![];
        }

        // Normalize sizes to fit container area
        let scale = container.area() as f64 / total_size as f64;
        let normalized: Vec<(usize, f32)> = items
            .iter()
            .map(|item| (item.index, (item.size as f64 * scale) as f32))
            .collect();

        let mut result = Vec::with_capacity(items.len());
        Self::squarify(&normalized, &mut result, container);

        result
    }

    fn squarify(items: &[(usize, f32)], result: &mut Vec<LayoutRect>, container: Rect) {
        if items.is_empty() {
            return;
        }

        let mut current_row = Vec::new();
        let mut remaining = items.to_vec();

        Self::squarify_recursive(&mut remaining, &mut current_row, result, container);
    }

    fn squarify_recursive(
        remaining: &mut Vec<(usize, f32)>,
        current_row: &mut Vec<(usize, f32)>,
        result: &mut Vec<LayoutRect>,
        container: Rect,
    ) {
        if remaining.is_empty() {
            if !current_row.is_empty() {
                Self::layout_row(current_row, result, container);
                current_row.clear();
            }
            return;
        }

        let next = remaining[0];

        if current_row.is_empty() {
            current_row.push(next);
            remaining.remove(0);
            Self::squarify_recursive(remaining, current_row, result, container);
        } else {
            let current_worst = Self::worst_aspect_ratio(current_row, container);
            let mut test_row = current_row.clone();
            test_row.push(next);
            let test_worst = Self::worst_aspect_ratio(&test_row, container);

            if test_worst <= current_worst {
                current_row.push(next);
                remaining.remove(0);
                Self::squarify_recursive(remaining, current_row, result, container);
            } else {
                // Layout current row and start new row
                let row_total: f32 = current_row.iter().map(|(_, size)| size).sum();
                let new_container = Self::get_remaining_rect(&container, row_total);
                Self::layout_row(current_row, result, container);
                current_row.clear();
                Self::squarify_recursive(remaining, current_row, result, new_container);
            }
        }
    }

    fn worst_aspect_ratio(row: &[(usize, f32)], container: Rect) -> f32 {
        if row.is_empty() {
            return f32::INFINITY;
        }

        let total: f32 = row.iter().map(|(_, size)| size).sum();
        let w = container.short_side();
        let max_size = row
            .iter()
            .map(|(_, size)| size)
            .fold(0.0f32, |a, &b| a.max(b));
        let min_size = row
            .iter()
            .map(|(_, size)| size)
            .fold(f32::INFINITY, |a, &b| a.min(b));

        let aspect1 = (w * w * max_size) / (total * total);
        let aspect2 = (total * total) / (w * w * min_size);

        aspect1.max(aspect2)
    }

    fn layout_row(row: &[(usize, f32)], result: &mut Vec<LayoutRect>, container: Rect) {
        let total: f32 = row.iter().map(|(_, size)| size).sum();

        let horizontal = container.width >= container.height;
        let (length, _breadth) = if horizontal {
            (container.width, container.height)
        } else {
            (container.height, container.width)
        };

        let row_breadth = if total > 0.0 { total / length } else { 0.0 };

        let mut offset = 0.0f32;

        for &(index, size) in row {
            let item_length = if total > 0.0 {
                size / total * length
            } else {
                0.0
            };

            let rect = if horizontal {
                Rect::new(container.x + offset, container.y, item_length, row_breadth)
            } else {
                Rect::new(container.x, container.y + offset, row_breadth, item_length)
            };

            result.push(LayoutRect { rect, index });
            offset += item_length;
        }
    }

    fn get_remaining_rect(container: &Rect, row_total: f32) -> Rect {
        let horizontal = container.width >= container.height;
        let length = if horizontal {
            container.width
        } else {
            container.height
        };

        let row_breadth = if row_total > 0.0 {
            row_total / length
        } else {
            0.0
        };

        if horizontal {
            Rect::new(
                container.x,
                container.y + row_breadth,
                container.width,
                container.height - row_breadth,
            )
        } else {
            Rect::new(
                container.x + row_breadth,
                container.y,
                container.width - row_breadth,
                container.height,
            )
        }
    }
}

/// Layout knobs. Expanded folders reserve a header strip for their label and
/// lay children out in the remaining content rect.
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub header_height: f32,
    pub side_inset: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        // Cell-sized defaults for the terminal front end: one header row,
        // no horizontal inset.
        Self {
            header_height: 1.0,
            side_inset: 0.0,
        }
    }
}

/// A laid-out display node in paint order (parents before children).
#[derive(Debug)]
pub struct Placement<'a> {
    pub key: String,
    pub node: &'a DisplayNode,
    pub rect: Rect,
    pub depth: u16,
}

/// Assign a rectangle to every node in the display tree. The root fills the
/// container; each expanded folder subdivides its content rect among its
/// children weighted by their (already final) display values.
pub fn layout_tree<'a>(
    root: &'a DisplayNode,
    container: Rect,
    params: &LayoutParams,
) -> Vec<Placement<'a>> {
    let mut out = Vec::new();
    out.push(Placement {
        key: ROOT_KEY.to_string(),
        node: root,
        rect: container,
        depth: 0,
    });
    layout_children(root, container, params, 1, &mut out);
    out
}

fn layout_children<'a>(
    node: &'a DisplayNode,
    rect: Rect,
    params: &LayoutParams,
    depth: u16,
    out: &mut Vec<Placement<'a>>,
) {
    if node.children.is_empty() {
        return;
    }

    let content = Rect::new(
        rect.x + params.side_inset,
        rect.y + params.header_height,
        (rect.width - 2.0 * params.side_inset).max(0.0),
        (rect.height - params.header_height - params.side_inset).max(0.0),
    );
    if content.width < 1.0 || content.height < 1.0 {
        return;
    }

    let items: Vec<TreemapItem> = node
        .children
        .iter()
        .enumerate()
        .map(|(index, child)| TreemapItem {
            size: child.value,
            index,
        })
        .collect();

    for lr in SquarifiedTreemap::layout(&items, content) {
        let child = &node.children[lr.index];
        out.push(Placement {
            key: child.path.clone(),
            node: child,
            rect: lr.rect,
            depth,
        });
        layout_children(child, lr.rect, params, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collapse::CollapseSet;
    use crate::model::{RawNode, SizeMode, ViewOptions};
    use crate::transform::transform;

    #[test]
    fn squarified_preserves_total_area() {
        let items = vec![
            TreemapItem { size: 100, index: 0 },
            TreemapItem { size: 200, index: 1 },
            TreemapItem { size: 300, index: 2 },
        ];

        let container = Rect::new(0.0, 0.0, 800.0, 600.0);
        let layout = SquarifiedTreemap::layout(&items, container);

        assert_eq!(layout.len(), 3);
        let total_area: f32 = layout.iter().map(|r| r.rect.area()).sum();
        let ratio = total_area / container.area();
        assert!(
            ratio > 0.99 && ratio < 1.01,
            "Total area ratio {} should be close to 1.0",
            ratio
        );
    }

    #[test]
    fn squarified_preserves_item_order() {
        // Input order is the transform's sort order; layout must not reorder.
        let items = vec![
            TreemapItem { size: 10, index: 0 },
            TreemapItem { size: 500, index: 1 },
            TreemapItem { size: 50, index: 2 },
        ];
        let layout = SquarifiedTreemap::layout(&items, Rect::new(0.0, 0.0, 100.0, 100.0));
        let indices: Vec<usize> = layout.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn zero_total_yields_empty_layout() {
        let items = vec![TreemapItem { size: 0, index: 0 }];
        assert!(SquarifiedTreemap::layout(&items, Rect::new(0.0, 0.0, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn tree_layout_keys_and_nesting() {
        let raw = RawNode::folder(
            "root",
            vec![
                RawNode::folder("src", vec![RawNode::file("main.rs", 60)]),
                RawNode::file("Cargo.toml", 40),
            ],
        );
        let opts = ViewOptions {
            mode: SizeMode::Size,
            ..ViewOptions::new()
        };
        let display = transform(&raw, &opts, &CollapseSet::new());
        let container = Rect::new(0.0, 0.0, 80.0, 40.0);
        let placements = layout_tree(&display, container, &LayoutParams::default());

        assert_eq!(placements[0].key, ROOT_KEY);
        assert_eq!(placements[0].rect, container);

        let keys: Vec<&str> = placements.iter().map(|p| p.key.as_str()).collect();
        assert!(keys.contains(&"src"));
        assert!(keys.contains(&"src/main.rs"));
        assert!(keys.contains(&"Cargo.toml"));

        // Child rect fits inside the parent's content area.
        let src = placements.iter().find(|p| p.key == "src").unwrap();
        let main = placements.iter().find(|p| p.key == "src/main.rs").unwrap();
        assert!(main.rect.x >= src.rect.x);
        assert!(main.rect.y >= src.rect.y + 1.0);
        assert!(main.depth > src.depth);
    }

    #[test]
    fn degenerate_container_stops_recursion() {
        let raw = RawNode::folder(
            "root",
            vec![RawNode::folder("src", vec![RawNode::file("main.rs", 60)])],
        );
        let display = transform(
            &raw,
            &ViewOptions {
                mode: SizeMode::Size,
                ..ViewOptions::new()
            },
            &CollapseSet::new(),
        );
        let placements = layout_tree(
            &display,
            Rect::new(0.0, 0.0, 3.0, 1.0),
            &LayoutParams::default(),
        );
        // Only the root fits; no room below the header strip.
        assert_eq!(placements.len(), 1);
    }
}
