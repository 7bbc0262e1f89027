//! Render reconciliation: diff the previously rendered keyed tile set
//! against a freshly laid-out target list into enter/update/exit operations,
//! keyed by node path so reordering never reads as exit+enter.
//!
//! Graphics-library independent: tiles are rectangles, RGB fills, and
//! opacities; the front end decides how to paint them. All transition
//! classes run in parallel; a transition in flight when a new render arrives
//! is interrupted and restarted from its current interpolated state — latest
//! render always wins, nothing queues.

use std::collections::{BTreeMap, BTreeSet};

use crate::layout::Rect;
use crate::palette::Rgb;

pub const ENTER_DURATION: f32 = 0.4;
pub const UPDATE_DURATION: f32 = 0.4;
pub const EXIT_DURATION: f32 = 0.3;

/// Desired end state of one tile for the upcoming render.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub key: String,
    pub rect: Rect,
    pub fill: Rgb,
    pub depth: u16,
}

/// Instantaneous visual attributes of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileVisual {
    pub rect: Rect,
    pub fill: Rgb,
    pub opacity: f32,
}

fn lerp_visual(from: &TileVisual, to: &TileVisual, t: f32) -> TileVisual {
    let lf = |a: f32, b: f32| a + (b - a) * t;
    TileVisual {
        rect: Rect::new(
            lf(from.rect.x, to.rect.x),
            lf(from.rect.y, to.rect.y),
            lf(from.rect.width, to.rect.width),
            lf(from.rect.height, to.rect.height),
        ),
        fill: from.fill.lerp(to.fill, t),
        opacity: lf(from.opacity, to.opacity),
    }
}

fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Updating,
    Exiting,
}

#[derive(Debug, Clone)]
struct Tween {
    from: TileVisual,
    to: TileVisual,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug, Clone)]
pub struct Tile {
    pub depth: u16,
    pub phase: Phase,
    current: TileVisual,
    tween: Option<Tween>,
}

impl Tile {
    pub fn visual(&self) -> TileVisual {
        self.current
    }
}

/// Disjoint key sets computed by one reconciliation pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RenderDiff {
    pub enter: BTreeSet<String>,
    pub update: BTreeSet<String>,
    pub exit: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    tiles: BTreeMap<String, Tile>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff the alive tile set against `targets` and (re)start transitions.
    ///
    /// Entering tiles are created at their final rectangle with zero opacity
    /// and fade in; shared keys transition position, size, and fill from
    /// their current (possibly mid-flight) values; departed keys fade out
    /// and are removed once their exit completes.
    pub fn reconcile(&mut self, targets: &[RenderTarget]) -> RenderDiff {
        let mut diff = RenderDiff::default();
        let mut seen: BTreeSet<&str> = BTreeSet::new();

        for target in targets {
            seen.insert(target.key.as_str());
            let to = TileVisual {
                rect: target.rect,
                fill: target.fill,
                opacity: 1.0,
            };

            match self.tiles.get_mut(&target.key) {
                Some(tile) => {
                    diff.update.insert(target.key.clone());
                    tile.depth = target.depth;
                    tile.phase = Phase::Updating;
                    tile.tween = Some(Tween {
                        from: tile.current,
                        to,
                        elapsed: 0.0,
                        duration: UPDATE_DURATION,
                    });
                }
                None => {
                    diff.enter.insert(target.key.clone());
                    let from = TileVisual {
                        rect: target.rect,
                        fill: target.fill,
                        opacity: 0.0,
                    };
                    self.tiles.insert(
                        target.key.clone(),
                        Tile {
                            depth: target.depth,
                            phase: Phase::Entering,
                            current: from,
                            tween: Some(Tween {
                                from,
                                to,
                                elapsed: 0.0,
                                duration: ENTER_DURATION,
                            }),
                        },
                    );
                }
            }
        }

        for (key, tile) in &mut self.tiles {
            if seen.contains(key.as_str()) || tile.phase == Phase::Exiting {
                continue;
            }
            diff.exit.insert(key.clone());
            tile.phase = Phase::Exiting;
            let mut to = tile.current;
            to.opacity = 0.0;
            tile.tween = Some(Tween {
                from: tile.current,
                to,
                elapsed: 0.0,
                duration: EXIT_DURATION,
            });
        }

        diff
    }

    /// Step every running transition by `dt` seconds. Finished exits are
    /// removed. Returns true while anything is still animating.
    pub fn advance(&mut self, dt: f32) -> bool {
        let mut finished_exits = Vec::new();

        for (key, tile) in &mut self.tiles {
            let Some(tween) = tile.tween.as_mut() else {
                continue;
            };
            tween.elapsed += dt;
            let t = (tween.elapsed / tween.duration).clamp(0.0, 1.0);
            tile.current = lerp_visual(&tween.from, &tween.to, ease_in_out_cubic(t));

            if t >= 1.0 {
                tile.current = tween.to;
                tile.tween = None;
                if tile.phase == Phase::Exiting {
                    finished_exits.push(key.clone());
                }
            }
        }

        for key in finished_exits {
            self.tiles.remove(&key);
        }

        self.is_animating()
    }

    /// Snap every tile to its target and drop exiting tiles.
    pub fn finish_immediately(&mut self) {
        for tile in self.tiles.values_mut() {
            if let Some(tween) = tile.tween.take() {
                tile.current = tween.to;
            }
        }
        self.tiles.retain(|_, tile| tile.phase != Phase::Exiting);
    }

    pub fn is_animating(&self) -> bool {
        self.tiles.values().any(|t| t.tween.is_some())
    }

    /// Alive tiles in paint order: shallow first, stable by key within a
    /// depth so parents never cover their children.
    pub fn visuals(&self) -> Vec<(&str, &Tile)> {
        let mut out: Vec<(&str, &Tile)> =
            self.tiles.iter().map(|(k, t)| (k.as_str(), t)).collect();
        out.sort_by(|a, b| a.1.depth.cmp(&b.1.depth).then_with(|| a.0.cmp(b.0)));
        out
    }

    pub fn contains(&self, key: &str) -> bool {
        self.tiles.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
