//! Broad-phase grid and narrow-phase collision tests
//!
//! The grid buckets every active object into fixed square cells (4 blocks a
//! side) so per-frame queries only look at the neighbourhood of the player.
//! Narrow phase is plain AABB overlap, with a separating-axis test for spike
//! triangles and rotated rectangles.

use std::collections::{BTreeSet, HashMap};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::object::{LevelObject, ObjectId};
use crate::consts::{BLOCK_SIZE, GRID_CELL_BLOCKS};

/// Uniform grid over level objects
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<ObjectId>>,
    rects: HashMap<ObjectId, Rect>,
}

impl Default for CollisionGrid {
    fn default() -> Self {
        Self::new(BLOCK_SIZE * GRID_CELL_BLOCKS)
    }
}

impl CollisionGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            rects: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.rects.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Rebuild from scratch; inactive objects are left out
    pub fn build<'a, I>(&mut self, objects: I)
    where
        I: IntoIterator<Item = &'a LevelObject>,
    {
        self.clear();
        for obj in objects {
            if obj.active {
                self.insert(obj.id, obj.rect());
            }
        }
    }

    /// Insert into every cell the rect touches
    pub fn insert(&mut self, id: ObjectId, rect: Rect) {
        let (x0, x1, y0, y1) = self.cell_span(&rect);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
        self.rects.insert(id, rect);
    }

    /// Every object sharing a cell with `rect`, de-duplicated, in id order
    pub fn candidates(&self, rect: &Rect) -> Vec<ObjectId> {
        let (x0, x1, y0, y1) = self.cell_span(rect);
        let mut found = BTreeSet::new();
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(cell) = self.cells.get(&(cx, cy)) {
                    found.extend(cell.iter().copied());
                }
            }
        }
        found.into_iter().collect()
    }

    /// Objects whose inserted rect overlaps `rect`, in id order
    pub fn query(&self, rect: &Rect) -> Vec<ObjectId> {
        self.candidates(rect)
            .into_iter()
            .filter(|id| self.rects.get(id).is_some_and(|r| r.overlaps(rect)))
            .collect()
    }

    fn cell_span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let cell = |v: f32| (v / self.cell_size).floor() as i32;
        (cell(rect.x), cell(rect.right()), cell(rect.y), cell(rect.bottom()))
    }
}

/// Axis chosen to separate two overlapping boxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Minimum translation that moves `moving` out of `stationary`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Push {
    pub offset: Vec2,
    pub axis: Axis,
}

/// Push-out along the axis of smaller overlap; ties resolve vertically
pub fn resolve_aabb(moving: &Rect, stationary: &Rect) -> Push {
    let overlap_x = (moving.right() - stationary.x).min(stationary.right() - moving.x);
    let overlap_y = (moving.bottom() - stationary.y).min(stationary.bottom() - moving.y);

    if overlap_x < overlap_y {
        let dir = if moving.center().x < stationary.center().x {
            -1.0
        } else {
            1.0
        };
        Push {
            offset: Vec2::new(overlap_x * dir, 0.0),
            axis: Axis::X,
        }
    } else {
        let dir = if moving.center().y < stationary.center().y {
            -1.0
        } else {
            1.0
        };
        Push {
            offset: Vec2::new(0.0, overlap_y * dir),
            axis: Axis::Y,
        }
    }
}

/// Separating axis test between two convex polygons
pub fn test_sat(poly_a: &[Vec2], poly_b: &[Vec2]) -> bool {
    edge_normals(poly_a)
        .chain(edge_normals(poly_b))
        .all(|axis| {
            let (min_a, max_a) = project(poly_a, axis);
            let (min_b, max_b) = project(poly_b, axis);
            !(max_a < min_b || max_b < min_a)
        })
}

fn edge_normals(poly: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    (0..poly.len()).filter_map(move |i| {
        let edge = poly[(i + 1) % poly.len()] - poly[i];
        // Zero-length edges give no axis
        let normal = edge.perp().try_normalize()?;
        Some(normal)
    })
}

fn project(poly: &[Vec2], axis: Vec2) -> (f32, f32) {
    poly.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
        let d = p.dot(axis);
        (min.min(d), max.max(d))
    })
}

/// Direction a spike's apex points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "up" => Some(Facing::Up),
            "down" => Some(Facing::Down),
            "left" => Some(Facing::Left),
            "right" => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Triangle inscribed in `rect` with its apex toward `facing`
pub fn triangle_hitbox(rect: &Rect, facing: Facing) -> [Vec2; 3] {
    let (x, y, w, h) = (rect.x, rect.y, rect.width, rect.height);
    match facing {
        Facing::Up => [
            Vec2::new(x + w / 2.0, y),
            Vec2::new(x + w, y + h),
            Vec2::new(x, y + h),
        ],
        Facing::Down => [
            Vec2::new(x, y),
            Vec2::new(x + w, y),
            Vec2::new(x + w / 2.0, y + h),
        ],
        Facing::Left => [
            Vec2::new(x, y + h / 2.0),
            Vec2::new(x + w, y),
            Vec2::new(x + w, y + h),
        ],
        Facing::Right => [
            Vec2::new(x, y),
            Vec2::new(x, y + h),
            Vec2::new(x + w, y + h / 2.0),
        ],
    }
}

/// Edge sign test; points on an edge count as inside
pub fn point_in_triangle(p: Vec2, tri: &[Vec2; 3]) -> bool {
    let sign = |a: Vec2, b: Vec2| (p.x - b.x) * (a.y - b.y) - (a.x - b.x) * (p.y - b.y);
    let d1 = sign(tri[0], tri[1]);
    let d2 = sign(tri[1], tri[2]);
    let d3 = sign(tri[2], tri[0]);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Box vs triangle: bounding-box reject, corner containment, then SAT
pub fn test_aabb_triangle(rect: &Rect, tri: &[Vec2; 3]) -> bool {
    let min_x = tri[0].x.min(tri[1].x).min(tri[2].x);
    let max_x = tri[0].x.max(tri[1].x).max(tri[2].x);
    let min_y = tri[0].y.min(tri[1].y).min(tri[2].y);
    let max_y = tri[0].y.max(tri[1].y).max(tri[2].y);

    if rect.right() <= min_x || rect.x >= max_x || rect.bottom() <= min_y || rect.y >= max_y {
        return false;
    }

    let corners = rect.corners();
    if corners.iter().any(|c| point_in_triangle(*c, tri)) {
        return true;
    }

    test_sat(&corners, tri)
}
