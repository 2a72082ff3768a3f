//! Reconciliation pass between two desired states.

use std::collections::{HashMap, HashSet};

use crate::controller::SurfaceOp;
use crate::surface::{LayerDescriptor, SourceDescriptor};

use super::DesiredState;

/// One step of a reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOp {
    AddSource(SourceDescriptor),
    UpdateSource(SourceDescriptor),
    RemoveSource(String),
    AddLayer {
        layer: LayerDescriptor,
        before: Option<String>,
    },
    UpdateLayer(LayerDescriptor),
    RemoveLayer(String),
    MoveLayer {
        id: String,
        before: Option<String>,
    },
}

impl From<SyncOp> for SurfaceOp {
    fn from(op: SyncOp) -> Self {
        match op {
            SyncOp::AddSource(source) | SyncOp::UpdateSource(source) => {
                SurfaceOp::UpsertSource(source)
            }
            SyncOp::RemoveSource(id) => SurfaceOp::RemoveSource(id),
            SyncOp::AddLayer { layer, before } => SurfaceOp::AddLayer { layer, before },
            SyncOp::UpdateLayer(layer) => SurfaceOp::UpdateLayer(layer),
            SyncOp::RemoveLayer(id) => SurfaceOp::RemoveLayer(id),
            SyncOp::MoveLayer { id, before } => SurfaceOp::MoveLayer { id, before },
        }
    }
}

/// Minimal operations turning `previous` into `next`.
///
/// Emitted in a safe order: layer removals, then source changes, then layer
/// additions and in-place updates, then order moves. Layers whose source or
/// kind changed are removed and re-added; other changes are updated in
/// place. A source whose clustering options changed is recreated together
/// with the layers drawing from it.
pub fn diff(previous: &DesiredState, next: &DesiredState) -> Vec<SyncOp> {
    let mut ops = Vec::new();
    let mut dropped: HashSet<String> = HashSet::new();

    for prev_layer in previous.layers() {
        match next.layer(&prev_layer.id) {
            Some(layer) if !prev_layer.requires_recreate(layer) => {}
            _ => {
                ops.push(SyncOp::RemoveLayer(prev_layer.id.clone()));
                dropped.insert(prev_layer.id.clone());
            }
        }
    }

    for prev_source in previous.sources() {
        if next.source(&prev_source.id).is_none() {
            ops.push(SyncOp::RemoveSource(prev_source.id.clone()));
        }
    }

    for source in next.sources() {
        match previous.source(&source.id) {
            None => ops.push(SyncOp::AddSource(source.clone())),
            Some(prev) if prev.cluster != source.cluster => {
                for id in previous.layers_using(&source.id) {
                    if dropped.insert(id.clone()) {
                        ops.push(SyncOp::RemoveLayer(id));
                    }
                }
                ops.push(SyncOp::RemoveSource(source.id.clone()));
                ops.push(SyncOp::AddSource(source.clone()));
            }
            Some(prev) if prev.data != source.data => {
                ops.push(SyncOp::UpdateSource(source.clone()));
            }
            Some(_) => {}
        }
    }

    // Order on the surface once removals and additions are applied
    let mut current: Vec<String> = previous
        .order()
        .iter()
        .filter(|id| !dropped.contains(*id))
        .cloned()
        .collect();

    for layer in next.layers() {
        match previous.layer(&layer.id) {
            Some(prev) if !dropped.contains(&layer.id) => {
                if prev != layer {
                    ops.push(SyncOp::UpdateLayer(layer.clone()));
                }
            }
            _ => {
                ops.push(SyncOp::AddLayer {
                    layer: layer.clone(),
                    before: None,
                });
                current.push(layer.id.clone());
            }
        }
    }

    ops.extend(order_moves(&current, next.order()));
    ops
}

/// Moves that rearrange `current` into `target` using insert-before.
///
/// Only ids present in both lists are considered. Layers on a longest
/// increasing subsequence of their current positions stay put; every other
/// layer is moved, walking `target` from the top down, directly below its
/// successor. The result is the minimum number of moves, and empty when
/// the orders already agree.
pub fn order_moves(current: &[String], target: &[String]) -> Vec<SyncOp> {
    let positions: HashMap<&str, usize> = current
        .iter()
        .enumerate()
        .map(|(index, id)| (id.as_str(), index))
        .collect();

    let target: Vec<&String> = target
        .iter()
        .filter(|id| positions.contains_key(id.as_str()))
        .collect();
    let sequence: Vec<usize> = target.iter().map(|id| positions[id.as_str()]).collect();

    let mut keep = vec![false; target.len()];
    for index in longest_increasing_subsequence(&sequence) {
        keep[index] = true;
    }

    let mut moves = Vec::new();
    for index in (0..target.len()).rev() {
        if !keep[index] {
            moves.push(SyncOp::MoveLayer {
                id: target[index].clone(),
                before: target.get(index + 1).map(|id| (*id).clone()),
            });
        }
    }
    moves
}

/// Indices of one longest strictly increasing subsequence of `seq`.
fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    // tails[k]: index in seq of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; seq.len()];

    for (index, &value) in seq.iter().enumerate() {
        let slot = tails.partition_point(|&t| seq[t] < value);
        if slot > 0 {
            predecessor[index] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(index);
        } else {
            tails[slot] = index;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        result.push(index);
        cursor = predecessor[index];
    }
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Apply moves to a plain list the way a surface would.
    fn simulate(current: &[String], moves: &[SyncOp]) -> Vec<String> {
        let mut order = current.to_vec();
        for op in moves {
            let SyncOp::MoveLayer { id, before } = op else {
                panic!("unexpected op {:?}", op);
            };
            order.retain(|l| l != id);
            let at = before
                .as_ref()
                .and_then(|b| order.iter().position(|l| l == b))
                .unwrap_or(order.len());
            order.insert(at, id.clone());
        }
        order
    }

    #[test]
    fn test_lis() {
        assert_eq!(longest_increasing_subsequence(&[]), Vec::<usize>::new());
        assert_eq!(longest_increasing_subsequence(&[0, 1, 2]), vec![0, 1, 2]);
        assert_eq!(longest_increasing_subsequence(&[2, 0, 1]), vec![1, 2]);
        assert_eq!(longest_increasing_subsequence(&[3, 1, 2, 0, 4]).len(), 3);
    }

    #[test]
    fn test_identical_order_has_no_moves() {
        let order = ids(&["a", "b", "c"]);
        assert!(order_moves(&order, &order).is_empty());
    }

    #[test]
    fn test_single_layer_raised() {
        let current = ids(&["a", "b", "c", "d"]);
        let target = ids(&["b", "c", "d", "a"]);
        let moves = order_moves(&current, &target);
        assert_eq!(
            moves,
            vec![SyncOp::MoveLayer {
                id: "a".into(),
                before: None
            }]
        );
        assert_eq!(simulate(&current, &moves), target);
    }

    #[test]
    fn test_reversal_moves_all_but_one() {
        let current = ids(&["a", "b", "c", "d", "e"]);
        let target = ids(&["e", "d", "c", "b", "a"]);
        let moves = order_moves(&current, &target);
        assert_eq!(moves.len(), 4);
        assert_eq!(simulate(&current, &moves), target);
    }

    #[test]
    fn test_shuffles_reach_target() {
        let current = ids(&["a", "b", "c", "d", "e", "f"]);
        for target in [
            ids(&["c", "a", "b", "f", "d", "e"]),
            ids(&["f", "a", "e", "b", "d", "c"]),
            ids(&["b", "a", "d", "c", "f", "e"]),
        ] {
            let moves = order_moves(&current, &target);
            assert_eq!(simulate(&current, &moves), target);
            assert!(order_moves(&target, &target).is_empty());
        }
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let current = ids(&["a", "b"]);
        let target = ids(&["x", "b", "a"]);
        let moves = order_moves(&current, &target);
        assert_eq!(simulate(&current, &moves), ids(&["b", "a"]));
    }
}
