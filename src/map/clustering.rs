//! Screen-space marker clustering.
//!
//! Clusters are the connected components of the "within `d` pixels"
//! graph over visible markers. A spatial grid bucketed at the cluster
//! distance bounds the neighbor scan near O(n) for typical
//! distributions; the partition itself does not depend on traversal
//! order, and member lists are emitted in record order so repeated runs
//! produce identical clusters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use glam::DVec2;

use crate::data::EarthquakeRecord;
use crate::map::color::{magnitude_color, Rgba};
use crate::map::markers::VisualMarker;

/// Aggregate representation of two or more nearby visible markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    /// Centroid of member screen positions.
    pub center: DVec2,
    /// Member record identifiers, in record order. Always >= 2.
    pub member_ids: Vec<String>,
    pub avg_magnitude: f64,
    pub max_magnitude: f64,
    /// Most recent origin time among members.
    pub latest: DateTime<Utc>,
    /// Badge diameter in pixels, grows with member count.
    pub display_size: f64,
    /// Badge color, derived from the average magnitude.
    pub color: Rgba,
    /// Expanded clusters render their members individually; the record
    /// sticks around until the next full recompute so the paint layer
    /// can animate the transition.
    pub expanded: bool,
}

/// Groups visible markers into clusters and stamps each member's
/// `cluster` index. Records and markers are parallel arrays.
pub(crate) fn rebuild(
    markers: &mut [VisualMarker],
    records: &[EarthquakeRecord],
    distance_px: f64,
) -> Vec<Cluster> {
    clear(markers);

    if !(distance_px > 0.0) {
        return Vec::new();
    }
    let cell = distance_px;
    let d2 = distance_px * distance_px;

    // Bucket visible markers by grid cell.
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, marker) in markers.iter().enumerate() {
        if marker.visible {
            grid.entry(cell_of(marker.screen_pos, cell)).or_default().push(i);
        }
    }

    let mut visited = vec![false; markers.len()];
    let mut clusters = Vec::new();

    for start in 0..markers.len() {
        if visited[start] || !markers[start].visible {
            continue;
        }

        // Flood out from `start` over the within-distance graph.
        let mut component = Vec::new();
        let mut pending = vec![start];
        visited[start] = true;

        while let Some(current) = pending.pop() {
            component.push(current);
            let pos = markers[current].screen_pos;
            let (cx, cy) = cell_of(pos, cell);

            for nx in cx - 1..=cx + 1 {
                for ny in cy - 1..=cy + 1 {
                    let Some(bucket) = grid.get(&(nx, ny)) else {
                        continue;
                    };
                    for &j in bucket {
                        if !visited[j] && pos.distance_squared(markers[j].screen_pos) <= d2 {
                            visited[j] = true;
                            pending.push(j);
                        }
                    }
                }
            }
        }

        if component.len() < 2 {
            continue;
        }

        component.sort_unstable();
        let cluster_index = clusters.len();
        for &i in &component {
            markers[i].cluster = Some(cluster_index);
        }
        clusters.push(aggregate(&component, markers, records));
    }

    log::debug!(
        "clustering produced {} clusters over {} visible markers",
        clusters.len(),
        markers.iter().filter(|m| m.visible).count()
    );
    clusters
}

/// Detaches every marker from its cluster.
pub(crate) fn clear(markers: &mut [VisualMarker]) {
    for marker in markers.iter_mut() {
        marker.cluster = None;
    }
}

fn aggregate(component: &[usize], markers: &[VisualMarker], records: &[EarthquakeRecord]) -> Cluster {
    let n = component.len() as f64;
    let mut center = DVec2::ZERO;
    let mut total_magnitude = 0.0;
    let mut max_magnitude = f64::NEG_INFINITY;
    let mut latest = records[component[0]].timestamp;
    let mut member_ids = Vec::with_capacity(component.len());

    for &i in component {
        center += markers[i].screen_pos;
        total_magnitude += records[i].magnitude;
        max_magnitude = max_magnitude.max(records[i].magnitude);
        latest = latest.max(records[i].timestamp);
        member_ids.push(records[i].id.clone());
    }

    let avg_magnitude = total_magnitude / n;
    Cluster {
        center: center / n,
        member_ids,
        avg_magnitude,
        max_magnitude,
        latest,
        display_size: (10.0 + 2.0 * n).clamp(15.0, 50.0),
        color: magnitude_color(avg_magnitude),
        expanded: false,
    }
}

fn cell_of(pos: DVec2, cell: f64) -> (i64, i64) {
    ((pos.x / cell).floor() as i64, (pos.y / cell).floor() as i64)
}
