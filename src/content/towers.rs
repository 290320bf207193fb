//! Tower Puzzle Solver
//!
//! Breadth-first search over rod configurations under the Hanoi rule:
//! one top disk moves per step and no disk may rest on a smaller one.
//! Used to check the minimum-move answers stored in a tower bank.

use std::collections::{BTreeSet, VecDeque};

/// Rods, each listing disk sizes from bottom to top.
pub type TowerConfig = Vec<Vec<u8>>;

/// Minimum number of moves from `start` to `end`.
///
/// Returns `None` when either configuration breaks the size rule, the two
/// do not hold the same disks on the same number of rods, or there are
/// no rods at all.
pub fn minimum_moves(start: &TowerConfig, end: &TowerConfig) -> Option<u32> {
    if start.is_empty() || start.len() != end.len() || !is_legal(start) || !is_legal(end) {
        return None;
    }
    match (disks(start), disks(end)) {
        (Some(a), Some(b)) if a == b => {}
        _ => return None,
    }

    let mut visited: BTreeSet<TowerConfig> = BTreeSet::new();
    let mut queue: VecDeque<(TowerConfig, u32)> = VecDeque::new();
    visited.insert(start.clone());
    queue.push_back((start.clone(), 0));

    while let Some((config, depth)) = queue.pop_front() {
        if &config == end {
            return Some(depth);
        }

        for next in successors(&config) {
            if visited.insert(next.clone()) {
                queue.push_back((next, depth + 1));
            }
        }
    }

    None
}

/// True when every rod is strictly decreasing from bottom to top.
pub fn is_legal(config: &TowerConfig) -> bool {
    config
        .iter()
        .all(|rod| rod.windows(2).all(|pair| pair[0] > pair[1]))
}

fn disks(config: &TowerConfig) -> Option<Vec<u8>> {
    let mut all: Vec<u8> = config.iter().flatten().copied().collect();
    all.sort_unstable();
    let before = all.len();
    all.dedup();
    (all.len() == before).then_some(all)
}

fn successors(config: &TowerConfig) -> Vec<TowerConfig> {
    let mut next = Vec::new();

    for from in 0..config.len() {
        let Some(&disk) = config[from].last() else { continue };

        for to in 0..config.len() {
            if to == from {
                continue;
            }
            let fits = config[to].last().map_or(true, |&top| top > disk);
            if fits {
                let mut moved = config.clone();
                moved[from].pop();
                moved[to].push(disk);
                next.push(moved);
            }
        }
    }

    next
}
