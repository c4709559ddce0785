//! Layered initial placement for claims entering the canvas.
//!
//! Each node is ranked by the longest support/attack path leading into it, so
//! premises sit above the conclusions they bear on. Cycles are tolerated by
//! capping the number of relaxation rounds.

use std::collections::HashMap;

use crate::projector::Elements;

const LAYER_GAP: f64 = 140.0;
const NODE_GAP: f64 = 40.0;

/// World-space position for every node, centred on the origin.
pub fn layered_positions(elements: &Elements) -> HashMap<String, (f64, f64)> {
	let ranks = ranks(elements);
	let max_rank = ranks.values().copied().max().unwrap_or(0);

	let mut layers: Vec<Vec<(&str, f64)>> = vec![Vec::new(); max_rank + 1];
	for node in &elements.nodes {
		let rank = ranks.get(node.id.as_str()).copied().unwrap_or(0);
		layers[rank].push((node.id.as_str(), node.width));
	}

	let top = -(max_rank as f64) * LAYER_GAP / 2.0;
	let mut positions = HashMap::with_capacity(elements.nodes.len());
	for (rank, layer) in layers.iter().enumerate() {
		let total: f64 = layer.iter().map(|(_, w)| w + NODE_GAP).sum::<f64>() - NODE_GAP;
		let mut x = -total / 2.0;
		let y = top + rank as f64 * LAYER_GAP;
		for (id, width) in layer {
			positions.insert((*id).to_string(), (x + width / 2.0, y));
			x += width + NODE_GAP;
		}
	}
	positions
}

/// Longest-path rank per node. Edges with unknown endpoints are ignored.
fn ranks(elements: &Elements) -> HashMap<&str, usize> {
	let mut rank: HashMap<&str, usize> =
		elements.nodes.iter().map(|n| (n.id.as_str(), 0)).collect();
	let n = rank.len();

	// In a DAG ranks settle within n rounds; past that only cycles keep growing.
	for _ in 0..n {
		let mut changed = false;
		for edge in &elements.edges {
			let (Some(&from), Some(&to)) = (
				rank.get(edge.source.as_str()),
				rank.get(edge.target.as_str()),
			) else {
				continue;
			};
			if edge.source != edge.target && to < from + 1 && from + 1 < n {
				rank.insert(edge.target.as_str(), from + 1);
				changed = true;
			}
		}
		if !changed {
			break;
		}
	}
	rank
}
