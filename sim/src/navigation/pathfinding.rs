//! A* pathfinding over the occupancy grid.
//!
//! Four-directional moves at unit cost with a Manhattan heuristic. The
//! frontier is an ordered set keyed by `(f, h, cell)`, so tie-breaking is
//! deterministic and repeated queries return identical paths.

use std::collections::{BTreeSet, HashMap};

use super::{Cell, OccupancyGrid};

/// Neighbor offsets checked in a fixed order: down, right, up, left
const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    cell: Cell,
}

fn heuristic(a: Cell, b: Cell) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Shortest path from `start` to `goal`, as the cells after `start` through
/// `goal` inclusive. Empty when the goal is unreachable or `start == goal`.
pub fn find_path(start: Cell, goal: Cell, grid: &OccupancyGrid) -> Vec<Cell> {
    let mut open = BTreeSet::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut cost_so_far: HashMap<Cell, u32> = HashMap::new();

    cost_so_far.insert(start, 0);
    open.insert(OpenNode {
        f: 0,
        h: heuristic(start, goal),
        cell: start,
    });

    while let Some(node) = open.pop_first() {
        let current = node.cell;
        if current == goal {
            break;
        }
        let Some(&current_cost) = cost_so_far.get(&current) else {
            continue;
        };

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let neighbor = (current.0 + dx, current.1 + dy);
            if !grid.is_walkable(neighbor) {
                continue;
            }
            let new_cost = current_cost + 1;
            let improves = match cost_so_far.get(&neighbor) {
                Some(&existing) => new_cost < existing,
                None => true,
            };
            if improves {
                cost_so_far.insert(neighbor, new_cost);
                let h = heuristic(neighbor, goal);
                open.insert(OpenNode {
                    f: new_cost + h,
                    h,
                    cell: neighbor,
                });
                came_from.insert(neighbor, current);
            }
        }
    }

    reconstruct_path(&came_from, start, goal)
}

/// Walks the back-links from goal to start. Any break in the chain means no
/// usable path; return empty instead.
fn reconstruct_path(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        match came_from.get(&current) {
            Some(&previous) => current = previous,
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
