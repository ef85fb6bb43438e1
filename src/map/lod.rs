//! Level-of-detail policy.
//!
//! Picks a rendering budget from the zoom level and the visible marker
//! count, then trims the render set to it. Trimmed markers stay in the
//! marker list and remain queryable by identifier; they are only
//! excluded from painting and screen hit-tests.

use crate::map::markers::VisualMarker;

/// Rendering detail tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodTier {
    Low,
    Medium,
    High,
}

impl LodTier {
    /// Selects the tier for the current view load.
    pub fn select(zoom: f64, visible_count: usize) -> LodTier {
        if zoom < 0.5 || visible_count > 1000 {
            LodTier::Low
        } else if zoom < 1.0 || visible_count > 500 {
            LodTier::Medium
        } else {
            LodTier::High
        }
    }

    /// Maximum number of markers drawn.
    pub fn render_cap(&self) -> usize {
        match self {
            LodTier::Low => 500,
            LodTier::Medium => 1000,
            LodTier::High => 10000,
        }
    }

    /// Minimum magnitude drawn, when the tier raises the floor.
    pub fn magnitude_floor(&self) -> Option<f64> {
        match self {
            LodTier::Low => Some(3.0),
            LodTier::Medium | LodTier::High => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LodTier::Low => "Low",
            LodTier::Medium => "Medium",
            LodTier::High => "High",
        }
    }
}

/// Builds the render set: indices of unclustered visible markers above
/// the tier's magnitude floor, capped to the tier budget keeping the
/// largest markers, then ordered small-to-large for painting (big
/// events end up on top).
pub(crate) fn render_set(markers: &[VisualMarker], tier: LodTier) -> Vec<usize> {
    let floor = tier.magnitude_floor();

    let mut set: Vec<usize> = markers
        .iter()
        .enumerate()
        .filter(|(_, m)| {
            m.visible
                && m.cluster.is_none()
                && floor.map_or(true, |min| m.magnitude >= min)
        })
        .map(|(i, _)| i)
        .collect();

    if set.len() > tier.render_cap() {
        set.sort_unstable_by(|&a, &b| {
            markers[b]
                .display_size
                .total_cmp(&markers[a].display_size)
                .then(a.cmp(&b))
        });
        set.truncate(tier.render_cap());
    }

    set.sort_unstable_by(|&a, &b| {
        markers[a]
            .display_size
            .total_cmp(&markers[b].display_size)
            .then(a.cmp(&b))
    });
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::color::Rgba;
    use glam::DVec2;

    fn marker(magnitude: f64, size: f64, visible: bool) -> VisualMarker {
        VisualMarker {
            id: format!("m{magnitude}-{size}"),
            magnitude,
            screen_pos: DVec2::ZERO,
            display_size: size,
            color: Rgba::UNKNOWN,
            visible,
            selected: false,
            highlighted: false,
            cluster: None,
            animation_phase: 1.0,
        }
    }

    #[test]
    fn tier_selection_boundaries() {
        assert_eq!(LodTier::select(0.4, 10), LodTier::Low);
        assert_eq!(LodTier::select(5.0, 1500), LodTier::Low);
        assert_eq!(LodTier::select(0.7, 10), LodTier::Medium);
        assert_eq!(LodTier::select(5.0, 700), LodTier::Medium);
        assert_eq!(LodTier::select(1.0, 500), LodTier::High);
        assert_eq!(LodTier::select(2.0, 10), LodTier::High);
    }

    #[test]
    fn low_tier_raises_magnitude_floor() {
        let markers = vec![
            marker(2.0, 5.0, true),
            marker(4.0, 12.0, true),
            marker(6.0, 25.0, true),
        ];
        let set = render_set(&markers, LodTier::Low);
        assert_eq!(set, vec![1, 2]);

        let set = render_set(&markers, LodTier::High);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn cap_keeps_largest_markers() {
        // 600 visible markers with sizes 0..600; Low tier keeps the
        // biggest 500.
        let markers: Vec<_> = (0..600).map(|i| marker(5.0, i as f64, true)).collect();
        let set = render_set(&markers, LodTier::Low);

        assert_eq!(set.len(), 500);
        // The 100 smallest were trimmed.
        assert!(set.iter().all(|&i| markers[i].display_size >= 100.0));
        // Paint order is small-to-large.
        assert!(set
            .windows(2)
            .all(|w| markers[w[0]].display_size <= markers[w[1]].display_size));
    }

    #[test]
    fn hidden_and_clustered_markers_are_excluded() {
        let mut clustered = marker(5.0, 10.0, true);
        clustered.cluster = Some(0);
        let markers = vec![marker(5.0, 10.0, false), clustered, marker(5.0, 10.0, true)];

        assert_eq!(render_set(&markers, LodTier::High), vec![2]);
    }
}
