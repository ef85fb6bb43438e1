//! The map engine facade.
//!
//! `MapEngine` owns the record catalog, the viewport, settings,
//! filters, and selection, plus the derived marker/cluster/render-set
//! caches. Derivation is a single synchronous pipeline (`refresh`):
//! markers from a catalog snapshot, then clustering, then the
//! level-of-detail render set. The engine holds no reference to any
//! rendering surface; the paint layer reads immutable snapshots once
//! per frame and draws them.
//!
//! Mutations mark the engine dirty. Refreshing is idempotent and cheap
//! enough to run unconditionally; callers coalesce bursts of pan/zoom
//! events into one refresh before the next paint.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo_types::Coord;
use glam::DVec2;

use crate::data::{EarthquakeRecord, EventCatalog};
use crate::error::GeometryError;
use crate::geo::{GeoBounds, Projection};
use crate::map::animation::{self, FrameClock};
use crate::map::clustering::{self, Cluster};
use crate::map::hit_test::{self, ScreenRect};
use crate::map::lod::{self, LodTier};
use crate::map::markers::{self, VisualMarker};
use crate::state::{AnimationStyle, ColorScheme, FilterState, MapSettings, MarkerShape};
use crate::viewport::Viewport;

pub struct MapEngine {
    catalog: Arc<EventCatalog>,
    viewport: Viewport,
    settings: MapSettings,
    filters: FilterState,
    selected: HashSet<String>,
    highlighted: HashSet<String>,
    clock: FrameClock,

    /// Record snapshot the current derived state was computed from.
    records: Vec<EarthquakeRecord>,
    markers: Vec<VisualMarker>,
    clusters: Vec<Cluster>,
    /// Indices of markers to draw, in paint order.
    render: Vec<usize>,
    lod: LodTier,
    dirty: bool,
}

impl Default for MapEngine {
    fn default() -> Self {
        Self {
            catalog: Arc::new(EventCatalog::new()),
            viewport: Viewport::default(),
            settings: MapSettings::default(),
            filters: FilterState::default(),
            selected: HashSet::new(),
            highlighted: HashSet::new(),
            clock: FrameClock::new(),
            records: Vec::new(),
            markers: Vec::new(),
            clusters: Vec::new(),
            render: Vec::new(),
            lod: LodTier::High,
            dirty: true,
        }
    }
}

impl MapEngine {
    pub fn new(width: f64, height: f64) -> Self {
        let mut engine = Self::default();
        engine.viewport.resize(width, height);
        engine
    }

    // ------------------------------------------------------------------
    // Record ingestion
    // ------------------------------------------------------------------

    /// Handle to the shared catalog for the background feed thread.
    /// After a batch lands, the feed hands control back to the UI
    /// thread, which calls `invalidate` + `refresh`.
    pub fn catalog(&self) -> Arc<EventCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn upsert(&mut self, record: EarthquakeRecord) -> bool {
        let stored = self.catalog.upsert(record);
        if stored {
            self.dirty = true;
        }
        stored
    }

    pub fn upsert_batch(&mut self, records: impl IntoIterator<Item = EarthquakeRecord>) -> usize {
        let stored = self.catalog.upsert_batch(records);
        if stored > 0 {
            self.dirty = true;
        }
        stored
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.catalog.remove(id);
        if removed {
            self.selected.remove(id);
            self.highlighted.remove(id);
            self.dirty = true;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.catalog.clear();
        self.selected.clear();
        self.highlighted.clear();
        self.dirty = true;
    }

    pub fn record(&self, id: &str) -> Option<EarthquakeRecord> {
        self.catalog.get(id)
    }

    pub fn event_count(&self) -> usize {
        self.catalog.len()
    }

    // ------------------------------------------------------------------
    // View control
    // ------------------------------------------------------------------

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if self.viewport.resize(width, height) {
            self.dirty = true;
        }
    }

    pub fn set_center(&mut self, lat: f64, lon: f64) {
        if self.viewport.set_center(lat, lon) {
            self.dirty = true;
        }
    }

    pub fn center_latitude(&self) -> f64 {
        self.viewport.center().y
    }

    pub fn center_longitude(&self) -> f64 {
        self.viewport.center().x
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if self.viewport.set_zoom(zoom) {
            self.dirty = true;
        }
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn zoom_in(&mut self) {
        if self.viewport.zoom_in() {
            self.dirty = true;
        }
    }

    pub fn zoom_out(&mut self) {
        if self.viewport.zoom_out() {
            self.dirty = true;
        }
    }

    /// Zoom keeping the geographic point under `anchor` fixed on
    /// screen (mouse-wheel zoom).
    pub fn zoom_at(&mut self, anchor: DVec2, new_zoom: f64) {
        if self.viewport.zoom_at(anchor, new_zoom, self.settings.projection) {
            self.dirty = true;
        }
    }

    /// Keyboard panning by degree deltas.
    pub fn pan_by(&mut self, d_lat: f64, d_lon: f64) {
        if self.viewport.pan_by(d_lat, d_lon) {
            self.dirty = true;
        }
    }

    /// Frames the currently visible events (10% padding, 80% margin
    /// zoom). No-op when nothing is visible.
    pub fn fit_to_events(&mut self) {
        let points: Vec<Coord<f64>> = self
            .records
            .iter()
            .zip(self.markers.iter())
            .filter(|(_, m)| m.visible)
            .map(|(r, _)| Coord {
                x: r.longitude,
                y: r.latitude,
            })
            .collect();
        if points.is_empty() {
            return;
        }
        self.fit_to_bounds(&GeoBounds::around(&points));
    }

    pub fn fit_to_bounds(&mut self, bounds: &GeoBounds) {
        if self.viewport.fit_bounds(bounds) {
            self.dirty = true;
        }
    }

    pub fn visible_bounds(&self) -> Result<GeoBounds, GeometryError> {
        self.viewport
            .visible_bounds(self.settings.projection)
            .ok_or(GeometryError::NoGeometry(
                "viewport has no valid size, zoom, or representable center",
            ))
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn set_projection(&mut self, projection: Projection) {
        if self.settings.projection != projection {
            self.settings.projection = projection;
            self.dirty = true;
        }
    }

    pub fn projection(&self) -> Projection {
        self.settings.projection
    }

    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        if self.settings.color_scheme != scheme {
            self.settings.color_scheme = scheme;
            self.dirty = true;
        }
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.settings.color_scheme
    }

    pub fn set_marker_shape(&mut self, shape: MarkerShape) {
        self.settings.marker_shape = shape;
    }

    pub fn marker_shape(&self) -> MarkerShape {
        self.settings.marker_shape
    }

    pub fn set_animation_style(&mut self, style: AnimationStyle) {
        self.settings.animation_style = style;
    }

    pub fn animation_style(&self) -> AnimationStyle {
        self.settings.animation_style
    }

    pub fn set_animation_enabled(&mut self, enabled: bool) {
        if self.settings.animation_enabled != enabled {
            self.settings.animation_enabled = enabled;
            if enabled {
                self.clock.start();
            } else {
                self.clock.stop();
            }
            self.dirty = true;
        }
    }

    pub fn animation_enabled(&self) -> bool {
        self.settings.animation_enabled
    }

    pub fn set_animation_speed(&mut self, speed: f64) {
        self.clock.set_speed(speed);
        self.settings.animation_speed = self.clock.speed();
    }

    pub fn animation_speed(&self) -> f64 {
        self.settings.animation_speed
    }

    pub fn set_clustering_enabled(&mut self, enabled: bool) {
        if self.settings.clustering_enabled == enabled {
            return;
        }
        self.settings.clustering_enabled = enabled;
        if !enabled {
            // Takes effect immediately: every marker renders individually.
            clustering::clear(&mut self.markers);
            self.clusters.clear();
            self.render = lod::render_set(&self.markers, self.lod);
        }
        self.dirty = true;
    }

    pub fn clustering_enabled(&self) -> bool {
        self.settings.clustering_enabled
    }

    pub fn set_cluster_distance(&mut self, pixels: f64) {
        if pixels.is_finite() && pixels > 0.0 && pixels != self.settings.cluster_distance_px {
            self.settings.cluster_distance_px = pixels;
            self.dirty = true;
        }
    }

    pub fn cluster_distance(&self) -> f64 {
        self.settings.cluster_distance_px
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_magnitude_filter(&mut self, min: Option<f64>, max: Option<f64>) {
        self.filters.min_magnitude = min;
        self.filters.max_magnitude = max;
        self.dirty = true;
    }

    pub fn set_depth_filter(&mut self, min_km: Option<f64>, max_km: Option<f64>) {
        self.filters.min_depth_km = min_km;
        self.filters.max_depth_km = max_km;
        self.dirty = true;
    }

    pub fn set_time_filter(&mut self, window: Option<(DateTime<Utc>, DateTime<Utc>)>) {
        self.filters.time_window = window;
        self.dirty = true;
    }

    pub fn set_region_filter(&mut self, region: Option<GeoBounds>) {
        self.filters.region = region;
        self.dirty = true;
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.dirty = true;
    }

    // ------------------------------------------------------------------
    // Selection and highlight
    // ------------------------------------------------------------------

    /// Makes `id` the only selected event.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected.clear();
        self.selected.insert(id.into());
        self.apply_marker_flags();
    }

    /// Adds events to the selection.
    pub fn extend_selection(&mut self, ids: impl IntoIterator<Item = String>) {
        self.selected.extend(ids);
        self.apply_marker_flags();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.apply_marker_flags();
    }

    /// Identifiers of selected events, in record order. Selection is
    /// independent of visibility: an event keeps its selection while
    /// scrolled off screen.
    pub fn selected_ids(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| &r.id)
            .chain(
                // Selected events not yet in the last snapshot still count.
                self.selected
                    .iter()
                    .filter(|id| !self.records.iter().any(|r| &r.id == *id)),
            )
            .filter(|id| self.selected.contains(*id))
            .cloned()
            .collect()
    }

    pub fn selected_records(&self) -> Vec<EarthquakeRecord> {
        self.selected_ids()
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .collect()
    }

    pub fn set_highlight(&mut self, id: &str, on: bool) {
        if on {
            self.highlighted.insert(id.to_string());
        } else {
            self.highlighted.remove(id);
        }
        self.apply_marker_flags();
    }

    // ------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------

    /// Marks the derived state stale. Idempotent; a burst of calls
    /// costs one recompute at the next `refresh`.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn needs_refresh(&self) -> bool {
        self.dirty
    }

    /// Recomputes markers, clusters, and the render set from a fresh
    /// catalog snapshot.
    ///
    /// Fails only while the viewport cannot produce geometry (zero
    /// size or zoom); derived state is emptied so stale markers are
    /// never painted or hit-tested.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> Result<(), GeometryError> {
        if !self.viewport.is_valid() {
            self.records.clear();
            self.markers.clear();
            self.clusters.clear();
            self.render.clear();
            return Err(GeometryError::NoGeometry(
                "viewport has no pixel area or zoom",
            ));
        }

        self.records = self.catalog.snapshot();
        self.markers = markers::rebuild(
            &self.records,
            &self.viewport,
            &self.settings,
            &self.filters,
            &self.selected,
            &self.highlighted,
            now,
            self.clock.frame(),
        );

        if self.settings.clustering_enabled {
            self.clusters = clustering::rebuild(
                &mut self.markers,
                &self.records,
                self.settings.cluster_distance_px,
            );
        } else {
            self.clusters.clear();
        }

        let visible = self.markers.iter().filter(|m| m.visible).count();
        self.lod = LodTier::select(self.viewport.zoom(), visible);
        self.render = lod::render_set(&self.markers, self.lod);
        self.dirty = false;

        log::debug!(
            "refresh: {} records, {} visible, {} clusters, {} rendered ({} detail)",
            self.records.len(),
            visible,
            self.clusters.len(),
            self.render.len(),
            self.lod.label()
        );
        Ok(())
    }

    /// Advances the animation clock one frame and re-derives marker
    /// pulse phases. Cheap; runs on the caller's tick timer between
    /// full refreshes.
    pub fn tick(&mut self, now: DateTime<Utc>) -> u64 {
        let frame = self.clock.advance();
        if self.settings.animation_enabled {
            for (marker, record) in self.markers.iter_mut().zip(self.records.iter()) {
                marker.animation_phase = animation::pulse_phase(frame, record.timestamp, now);
            }
        }
        frame
    }

    pub fn animation_frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Suggested tick interval for the shell's timer, in milliseconds.
    pub fn frame_interval_ms(&self) -> u64 {
        self.clock.frame_interval_ms()
    }

    // ------------------------------------------------------------------
    // Cluster interaction
    // ------------------------------------------------------------------

    /// Detaches a cluster's members so they render individually. The
    /// cluster record stays, flagged expanded, until the next refresh.
    pub fn expand_cluster(&mut self, index: usize) {
        let Some(cluster) = self.clusters.get_mut(index) else {
            return;
        };
        if cluster.expanded {
            return;
        }
        cluster.expanded = true;
        for marker in self.markers.iter_mut() {
            if marker.cluster == Some(index) {
                marker.cluster = None;
            }
        }
        self.render = lod::render_set(&self.markers, self.lod);
    }

    /// Re-attaches the members of an expanded cluster.
    pub fn collapse_cluster(&mut self, index: usize) {
        let Some(cluster) = self.clusters.get_mut(index) else {
            return;
        };
        if !cluster.expanded {
            return;
        }
        cluster.expanded = false;
        let members: HashSet<&String> = cluster.member_ids.iter().collect();
        for marker in self.markers.iter_mut() {
            if members.contains(&marker.id) {
                marker.cluster = Some(index);
            }
        }
        self.render = lod::render_set(&self.markers, self.lod);
    }

    // ------------------------------------------------------------------
    // Queries and paint snapshots
    // ------------------------------------------------------------------

    /// All derived markers, parallel to the record snapshot.
    pub fn markers(&self) -> &[VisualMarker] {
        &self.markers
    }

    /// Markers to draw this frame, in paint order (small first, large
    /// on top).
    pub fn render_set(&self) -> Vec<&VisualMarker> {
        self.render.iter().map(|&i| &self.markers[i]).collect()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn lod_tier(&self) -> LodTier {
        self.lod
    }

    /// All markers currently visible, whether rendered individually or
    /// through a cluster badge.
    pub fn visible_markers(&self) -> Vec<&VisualMarker> {
        self.markers.iter().filter(|m| m.visible).collect()
    }

    pub fn visible_records(&self) -> Vec<EarthquakeRecord> {
        self.records
            .iter()
            .zip(self.markers.iter())
            .filter(|(_, m)| m.visible)
            .map(|(r, _)| r.clone())
            .collect()
    }

    /// The rendered marker under `point`, if any.
    pub fn find_nearest(&self, point: DVec2) -> Option<String> {
        hit_test::find_nearest(&self.markers, &self.render, point)
            .map(|i| self.markers[i].id.clone())
    }

    /// Identifiers of rendered markers inside the screen rectangle.
    pub fn find_in_rect(&self, rect: ScreenRect) -> Vec<String> {
        hit_test::find_in_rect(&self.markers, &self.render, rect)
            .into_iter()
            .map(|i| self.markers[i].id.clone())
            .collect()
    }

    fn apply_marker_flags(&mut self) {
        for marker in self.markers.iter_mut() {
            marker.selected = self.selected.contains(&marker.id);
            marker.highlighted = self.highlighted.contains(&marker.id);
        }
    }
}
