//! Nearest-first neighborhood ordering.
//!
//! An R-tree (via `rstar`) over neighborhood coordinates yields, for each
//! neighborhood, every other one in ascending distance.  Equal distances
//! are ordered by ID so the ranking is total and reproducible.

use std::collections::BTreeMap;

use dm_core::{Coords, NeighborhoodId};
use rstar::{AABB, PointDistance, RTree, RTreeObject};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct NeighborhoodEntry {
    point: [f64; 2],
    id:    NeighborhoodId,
}

impl RTreeObject for NeighborhoodEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NeighborhoodEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Ranking ───────────────────────────────────────────────────────────────────

/// For each input neighborhood, all *other* inputs ordered nearest first.
pub fn rank_by_distance(points: &[(NeighborhoodId, Coords)]) -> BTreeMap<NeighborhoodId, Vec<NeighborhoodId>> {
    let entries: Vec<NeighborhoodEntry> = points
        .iter()
        .map(|&(id, c)| NeighborhoodEntry { point: [c.x, c.y], id })
        .collect();
    let tree = RTree::bulk_load(entries);

    points
        .iter()
        .map(|&(origin, c)| {
            let mut ranked: Vec<(f64, NeighborhoodId)> = tree
                .nearest_neighbor_iter_with_distance_2(&[c.x, c.y])
                .filter(|(entry, _)| entry.id != origin)
                .map(|(entry, d2)| (d2, entry.id))
                .collect();
            ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            (origin, ranked.into_iter().map(|(_, id)| id).collect())
        })
        .collect()
}
