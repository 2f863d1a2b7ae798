//! View state of the map search and its transition function.
//!
//! All state changes go through [`ViewState::update`], which returns the
//! effects the surrounding UI (and the search session) must carry out.

use crate::picking::pick_features;
use geosearch_client::{ApiResult, SearchFilters, SearchRequest, SpatialMode};
use geosearch_core::config::ConfigSchema;
use geosearch_documents::{
    project_feature, sorted_by_geometry, to_csv, DocumentParser, MapFeature, ProjectedFeature,
    ResultSet, SearchResponse, SHAPE_PREFIX,
};
use geosearch_geo::{extent_from_viewport, Extent, Viewport};
use std::sync::Arc;
use tracing::debug;

/// Id of a displayed feature (the document id)
pub type FeatureId = String;

/// Settings of a view that do not change through events.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    /// Field holding document geometries
    pub geometry_field: String,
    /// Refetch whenever the map settles on a new place
    pub auto_search: bool,
    /// Pick tolerance around the pointer
    pub pick_radius_px: f64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from_config_schema(&ConfigSchema::default())
    }
}

impl ViewOptions {
    pub fn from_config_schema(schema: &ConfigSchema) -> Self {
        Self {
            geometry_field: schema.index.geometry_field.clone(),
            auto_search: schema.search.auto_search,
            pick_radius_px: schema.map.pick_radius_px,
        }
    }
}

/// Something that happened in the UI or the search pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The map finished its first render
    MapLoaded(Viewport),
    /// The map stopped moving; ignored until the map is loaded
    ViewportChanged(Viewport),
    /// A search rectangle was drawn
    ExplicitSearch(Extent),
    FiltersChanged(SearchFilters),
    SpatialModeChanged(SpatialMode),
    /// Sidebar ordering by geometry type switched on or off
    SortChanged(bool),
    /// Width of the panel overlaying the left map edge
    OffsetWidthChanged(f64),
    /// A search for `extent` delivered its response
    SearchCompleted {
        extent: Extent,
        response: SearchResponse,
    },
    /// Features under the pointer while moving over the map
    MapPointerMoved(Vec<FeatureId>),
    /// Features under the pointer on click
    MapClicked(Vec<FeatureId>),
    /// Pointer over an entry of the multi-selection popup
    PopupHover(Option<FeatureId>),
    /// Pointer over a sidebar entry
    ListHover(Option<FeatureId>),
    /// The selection popup was closed
    SelectionCleared,
}

/// Work the outside world has to do after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start a search, superseding any pending one
    Search(SearchRequest),
    /// A new result set is in place
    ResultsReplaced {
        shown: usize,
        total: u64,
        truncated: bool,
    },
    /// The extent of the delivered search, e.g. for the `e=` URL parameter
    ExtentCommitted(Extent),
    HoverChanged(Option<FeatureId>),
    SelectionChanged(Vec<FeatureId>),
    /// The first non-empty result set arrived
    SidebarOpened,
}

/// State shared by the map layer, the sidebar list and the print list.
#[derive(Debug, Clone)]
pub struct ViewState {
    parser: DocumentParser,
    options: ViewOptions,
    viewport: Option<Viewport>,
    offset_width: f64,
    mode: SpatialMode,
    filters: SearchFilters,
    sorted: bool,
    results: ResultSet,
    committed_extent: Option<Extent>,
    hover: Option<FeatureId>,
    selection: Vec<FeatureId>,
    sidebar_open: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}

impl ViewState {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            parser: DocumentParser::new(options.geometry_field.clone()),
            options,
            viewport: None,
            offset_width: 0.0,
            mode: SpatialMode::default(),
            filters: SearchFilters::default(),
            sorted: false,
            results: ResultSet::default(),
            committed_extent: None,
            hover: None,
            selection: Vec::new(),
            sidebar_open: false,
        }
    }

    /// Initial state from a configuration file.
    ///
    /// # Errors
    ///
    /// [`geosearch_client::ApiError::InvalidSpatialMode`] for an unknown
    /// `search.spatial_mode`.
    pub fn from_config_schema(schema: &ConfigSchema) -> ApiResult<Self> {
        let mut state = Self::new(ViewOptions::from_config_schema(schema));
        state.offset_width = schema.map.offset_width;
        state.mode = schema.search.spatial_mode.parse()?;
        state.filters = SearchFilters {
            only_maps: schema.search.only_maps,
            only_public: schema.search.only_public,
            terms: Vec::new(),
        };
        state.sorted = schema.search.sort_by_geometry;
        Ok(state)
    }

    /// Applies `event` and returns the resulting effects in order.
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();

        match event {
            Event::MapLoaded(viewport) => {
                self.viewport = Some(viewport);
                effects.push(self.search_visible(&viewport));
            }
            Event::ViewportChanged(viewport) => {
                let moved = self
                    .viewport
                    .is_some_and(|current| viewport.differs_from(&current));
                if moved {
                    self.viewport = Some(viewport);
                    if self.options.auto_search {
                        effects.push(self.search_visible(&viewport));
                    }
                }
            }
            Event::ExplicitSearch(extent) => effects.push(Effect::Search(self.request(extent))),
            Event::FiltersChanged(filters) => {
                if filters != self.filters {
                    self.filters = filters;
                    effects.extend(self.refresh());
                }
            }
            Event::SpatialModeChanged(mode) => {
                if mode != self.mode {
                    self.mode = mode;
                    effects.extend(self.refresh());
                }
            }
            Event::SortChanged(sorted) => self.sorted = sorted,
            Event::OffsetWidthChanged(width) => self.offset_width = width.max(0.0),
            Event::SearchCompleted { extent, response } => {
                self.replace_results(extent, response, &mut effects);
            }
            Event::MapPointerMoved(picked) => {
                if self.selection.len() <= 1 {
                    effects.extend(self.set_hover(picked.into_iter().next()));
                }
            }
            Event::MapClicked(picked) => effects.extend(self.set_selection(picked)),
            Event::PopupHover(id) => {
                if self.selection.len() > 1 {
                    effects.extend(self.set_hover(id));
                }
            }
            Event::ListHover(id) => effects.extend(self.set_hover(id)),
            Event::SelectionCleared => effects.extend(self.set_selection(Vec::new())),
        }

        effects
    }

    fn request(&self, extent: Extent) -> SearchRequest {
        SearchRequest::new(extent, self.mode, self.filters.clone())
    }

    fn search_visible(&self, viewport: &Viewport) -> Effect {
        Effect::Search(self.request(extent_from_viewport(viewport, self.offset_width)))
    }

    /// Search again with the current viewport, once the map is loaded.
    fn refresh(&self) -> Option<Effect> {
        self.viewport.as_ref().map(|viewport| self.search_visible(viewport))
    }

    fn replace_results(&mut self, extent: Extent, response: SearchResponse, effects: &mut Vec<Effect>) {
        let was_empty = self.results.is_empty();
        self.results = ResultSet::from_response(response, &self.parser);
        self.committed_extent = Some(extent);

        debug!(
            shown = self.results.len(),
            total = self.results.total(),
            "Result set replaced"
        );
        effects.push(Effect::ResultsReplaced {
            shown: self.results.len(),
            total: self.results.total(),
            truncated: self.results.is_truncated(),
        });
        effects.push(Effect::ExtentCommitted(extent));
        effects.extend(self.set_selection(Vec::new()));
        effects.extend(self.set_hover(None));

        if was_empty && !self.results.is_empty() {
            self.sidebar_open = true;
            effects.push(Effect::SidebarOpened);
        }
    }

    fn set_hover(&mut self, hover: Option<FeatureId>) -> Option<Effect> {
        if hover == self.hover {
            return None;
        }
        self.hover.clone_from(&hover);
        Some(Effect::HoverChanged(hover))
    }

    fn set_selection(&mut self, selection: Vec<FeatureId>) -> Option<Effect> {
        if selection == self.selection {
            return None;
        }
        self.selection.clone_from(&selection);
        Some(Effect::SelectionChanged(selection))
    }

    /// Ids of the features within the pick radius of `pixel`.
    pub fn pick(&self, pixel: [f64; 2]) -> Vec<FeatureId> {
        match &self.viewport {
            Some(viewport) => pick_features(
                viewport,
                self.results.features(),
                pixel,
                self.options.pick_radius_px,
            ),
            None => Vec::new(),
        }
    }

    /// Features for the map layer, in result order.
    pub fn map_features(&self) -> &[ProjectedFeature] {
        self.results.features()
    }

    /// Features for the sidebar list, ordered by geometry type when sorting is on.
    pub fn sidebar_features(&self) -> Vec<&ProjectedFeature> {
        if self.sorted {
            sorted_by_geometry(self.results.features())
        } else {
            self.results.features().iter().collect()
        }
    }

    /// Features for the print list, in result order.
    pub fn print_features(&self) -> Vec<&ProjectedFeature> {
        self.results.features().iter().collect()
    }

    /// CSV of the sidebar list, `None` without results.
    pub fn export_csv(&self) -> Option<String> {
        to_csv(self.sidebar_features().into_iter().map(|f| f.document.as_ref()))
    }

    /// Full shapes of the hovered feature and of a single selection.
    pub fn highlight_shapes(&self) -> Vec<MapFeature> {
        let mut ids: Vec<&str> = Vec::new();
        if let Some(hover) = &self.hover {
            ids.push(hover);
        }
        if let Some(single) = self.single_selection() {
            if !ids.contains(&single.id.as_str()) {
                ids.push(&single.id);
            }
        }
        ids.into_iter()
            .filter_map(|id| self.results.get(id))
            .map(|f| project_feature(Arc::clone(&f.document), SHAPE_PREFIX))
            .collect()
    }

    /// The selected feature when exactly one is selected.
    pub fn single_selection(&self) -> Option<&ProjectedFeature> {
        match self.selection.as_slice() {
            [id] => self.results.get(id),
            _ => None,
        }
    }

    pub fn selected_features(&self) -> Vec<&ProjectedFeature> {
        self.selection.iter().filter_map(|id| self.results.get(id)).collect()
    }

    pub fn hovered(&self) -> Option<&ProjectedFeature> {
        self.hover.as_deref().and_then(|id| self.results.get(id))
    }

    pub fn hover(&self) -> Option<&str> {
        self.hover.as_deref()
    }

    pub fn selection(&self) -> &[FeatureId] {
        &self.selection
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn committed_extent(&self) -> Option<Extent> {
        self.committed_extent
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn mode(&self) -> SpatialMode {
        self.mode
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn offset_width(&self) -> f64 {
        self.offset_width
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosearch_geo::MapSurface;
    use serde_json::{json, Value};

    fn view() -> Viewport {
        Viewport::new([13.7373, 51.0504], 8.0, [1024.0, 768.0])
    }

    fn point(id: &str, lon: f64, lat: f64) -> Value {
        json!({
            "id": id,
            "title": [format!("Sheet {id}")],
            "geom": [format!("{{'type':'Feature','geometry':{{'type':'Point','coordinates':[{lon},{lat}]}}}}")],
        })
    }

    fn polygon(id: &str) -> Value {
        json!({
            "id": id,
            "geom": ["{'type':'Feature','geometry':{'type':'Polygon','coordinates':[[[13,51],[14,51],[14,52],[13,52],[13,51]]]}}"],
        })
    }

    fn line(id: &str) -> Value {
        json!({
            "id": id,
            "geom": ["{'type':'Feature','geometry':{'type':'LineString','coordinates':[[13,51],[14,52]]}}"],
        })
    }

    fn response(docs: Vec<Value>, num_found: u64) -> SearchResponse {
        let docs = docs
            .into_iter()
            .map(|d| match d {
                Value::Object(map) => map,
                _ => unreachable!(),
            })
            .collect();
        SearchResponse { docs, num_found }
    }

    fn completed(docs: Vec<Value>, num_found: u64) -> Event {
        Event::SearchCompleted {
            extent: Extent::new(12.0, 50.0, 15.0, 52.0),
            response: response(docs, num_found),
        }
    }

    fn loaded_state() -> ViewState {
        let mut state = ViewState::default();
        state.update(Event::MapLoaded(view()));
        state.update(completed(
            vec![polygon("p1"), point("a", 13.7, 51.0), line("l1"), point("b", 13.8, 51.1)],
            4,
        ));
        state
    }

    fn searched_extent(effects: &[Effect]) -> Option<Extent> {
        effects.iter().find_map(|e| match e {
            Effect::Search(request) => Some(request.extent),
            _ => None,
        })
    }

    #[test]
    fn test_map_load_searches_visible_extent() {
        let mut state = ViewState::default();
        let effects = state.update(Event::MapLoaded(view()));
        assert_eq!(searched_extent(&effects), Some(extent_from_viewport(&view(), 0.0)));
    }

    #[test]
    fn test_offset_narrows_search_extent() {
        let mut state = ViewState::default();
        state.update(Event::OffsetWidthChanged(300.0));
        let effects = state.update(Event::MapLoaded(view()));

        let extent = searched_extent(&effects).unwrap();
        let full = extent_from_viewport(&view(), 0.0);
        assert!(extent.min_lon > full.min_lon);
        assert_eq!(extent.max_lon, full.max_lon);
    }

    #[test]
    fn test_refetch_only_when_viewport_moved() {
        let mut state = ViewState::default();
        state.update(Event::MapLoaded(view()));

        let mut jitter = view();
        jitter.center[0] += 0.000_01;
        assert!(state.update(Event::ViewportChanged(jitter)).is_empty());

        let mut zoomed = view();
        zoomed.zoom = 9.0;
        assert!(searched_extent(&state.update(Event::ViewportChanged(zoomed))).is_some());
    }

    #[test]
    fn test_viewport_change_before_load_is_ignored() {
        let mut state = ViewState::default();
        assert!(state.update(Event::ViewportChanged(view())).is_empty());
        assert_eq!(state.viewport(), None);

        let effects = state.update(Event::MapLoaded(view()));
        assert!(searched_extent(&effects).is_some());
    }

    #[test]
    fn test_no_refetch_without_auto_search() {
        let mut state = ViewState::new(ViewOptions {
            auto_search: false,
            ..ViewOptions::default()
        });
        state.update(Event::MapLoaded(view()));

        let mut moved = view();
        moved.center = [10.0, 50.0];
        assert!(state.update(Event::ViewportChanged(moved)).is_empty());
        assert_eq!(state.viewport(), Some(&moved));
    }

    #[test]
    fn test_filter_change_refetches_once() {
        let mut state = ViewState::default();
        let filters = SearchFilters::default().with_text("dresden");

        // nothing to search before the map is loaded
        assert!(state.update(Event::FiltersChanged(filters.clone())).is_empty());

        state.update(Event::MapLoaded(view()));
        assert!(state.update(Event::FiltersChanged(filters.clone())).is_empty());

        let effects = state.update(Event::SpatialModeChanged(SpatialMode::Intersects));
        match effects.as_slice() {
            [Effect::Search(request)] => {
                assert_eq!(request.mode, SpatialMode::Intersects);
                assert_eq!(request.filters, filters);
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_search_uses_drawn_extent() {
        let mut state = ViewState::default();
        let drawn = Extent::new(13.0, 50.0, 14.0, 51.0);
        assert_eq!(searched_extent(&state.update(Event::ExplicitSearch(drawn))), Some(drawn));
    }

    #[test]
    fn test_delivery_replaces_results() {
        let mut state = ViewState::default();
        state.update(Event::MapLoaded(view()));
        let effects = state.update(completed(vec![point("a", 13.7, 51.0), point("b", 13.8, 51.1)], 25));

        assert_eq!(
            effects[..3],
            [
                Effect::ResultsReplaced {
                    shown: 2,
                    total: 25,
                    truncated: true
                },
                Effect::ExtentCommitted(Extent::new(12.0, 50.0, 15.0, 52.0)),
                Effect::SidebarOpened,
            ]
        );
        assert!(state.is_sidebar_open());
        assert_eq!(state.results().total(), 25);
    }

    #[test]
    fn test_sidebar_opens_only_on_first_results() {
        let mut state = loaded_state();
        let effects = state.update(completed(vec![point("c", 13.7, 51.0)], 1));
        assert!(!effects.contains(&Effect::SidebarOpened));
        assert_eq!(state.map_features().len(), 1);
    }

    #[test]
    fn test_delivery_clears_selection_and_hover() {
        let mut state = loaded_state();
        state.update(Event::MapClicked(vec!["a".into()]));
        state.update(Event::ListHover(Some("b".into())));

        let effects = state.update(completed(vec![point("a", 13.7, 51.0)], 1));
        assert!(effects.contains(&Effect::SelectionChanged(Vec::new())));
        assert!(effects.contains(&Effect::HoverChanged(None)));
        assert!(state.selection().is_empty());
        assert_eq!(state.hover(), None);
    }

    #[test]
    fn test_skipped_documents_do_not_block_delivery() {
        let mut state = ViewState::default();
        let broken = json!({"id": "broken"});
        state.update(completed(vec![broken, point("a", 13.7, 51.0)], 2));
        assert_eq!(state.map_features().len(), 1);
        assert_eq!(state.results().total(), 2);
    }

    #[test]
    fn test_map_hover_ignored_with_multi_selection() {
        let mut state = loaded_state();
        assert_eq!(
            state.update(Event::MapPointerMoved(vec!["a".into(), "b".into()])),
            vec![Effect::HoverChanged(Some("a".into()))]
        );

        state.update(Event::MapClicked(vec!["a".into(), "b".into()]));
        assert!(state.update(Event::MapPointerMoved(vec!["p1".into()])).is_empty());
        assert_eq!(state.hover(), Some("a"));

        // popup entries take over hovering while the popup is open
        assert_eq!(
            state.update(Event::PopupHover(Some("b".into()))),
            vec![Effect::HoverChanged(Some("b".into()))]
        );
    }

    #[test]
    fn test_popup_hover_needs_multi_selection() {
        let mut state = loaded_state();
        state.update(Event::MapClicked(vec!["a".into()]));
        assert!(state.update(Event::PopupHover(Some("a".into()))).is_empty());
    }

    #[test]
    fn test_list_hover_always_forwarded() {
        let mut state = loaded_state();
        state.update(Event::MapClicked(vec!["a".into(), "b".into()]));
        assert_eq!(
            state.update(Event::ListHover(Some("l1".into()))),
            vec![Effect::HoverChanged(Some("l1".into()))]
        );
        assert_eq!(state.hovered().map(|f| f.id.as_str()), Some("l1"));
        assert!(state.update(Event::ListHover(Some("l1".into()))).is_empty());
    }

    #[test]
    fn test_single_selection() {
        let mut state = loaded_state();
        assert!(state.single_selection().is_none());

        state.update(Event::MapClicked(vec!["b".into()]));
        assert_eq!(state.single_selection().map(|f| f.id.as_str()), Some("b"));

        state.update(Event::MapClicked(vec!["a".into(), "b".into()]));
        assert!(state.single_selection().is_none());
        assert_eq!(state.selected_features().len(), 2);

        assert_eq!(
            state.update(Event::SelectionCleared),
            vec![Effect::SelectionChanged(Vec::new())]
        );
    }

    #[test]
    fn test_sidebar_sorting_is_stable() {
        let mut state = loaded_state();
        let ids = |features: Vec<&ProjectedFeature>| -> Vec<String> {
            features.into_iter().map(|f| f.id.clone()).collect()
        };

        assert_eq!(ids(state.sidebar_features()), ["p1", "a", "l1", "b"]);
        state.update(Event::SortChanged(true));
        assert_eq!(ids(state.sidebar_features()), ["a", "b", "l1", "p1"]);
        assert_eq!(ids(state.print_features()), ["p1", "a", "l1", "b"]);
    }

    #[test]
    fn test_export_follows_sidebar_order() {
        let mut state = loaded_state();
        state.update(Event::SortChanged(true));
        let csv = state.export_csv().unwrap();
        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows, [",Sheet a,", ",Sheet b,", ",,", ",,"]);

        assert_eq!(ViewState::default().export_csv(), None);
    }

    #[test]
    fn test_highlight_shapes() {
        let mut state = loaded_state();
        assert!(state.highlight_shapes().is_empty());

        state.update(Event::MapClicked(vec!["p1".into()]));
        state.update(Event::ListHover(Some("a".into())));

        let shapes = state.highlight_shapes();
        let ids: Vec<&str> = shapes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["shape-a", "shape-p1"]);
    }

    #[test]
    fn test_pick_through_state() {
        let state = loaded_state();
        let position = state.results().get("a").unwrap().position;
        let pixel = view().pixel_from_coordinate(position);
        assert!(state.pick(pixel).contains(&"a".to_string()));
    }

    #[test]
    fn test_from_config_schema() {
        let mut schema = ConfigSchema::default();
        schema.search.spatial_mode = "intersects".into();
        schema.search.only_public = true;
        let state = ViewState::from_config_schema(&schema).unwrap();
        assert_eq!(state.mode(), SpatialMode::Intersects);
        assert!(state.filters().only_public);

        schema.search.spatial_mode = "overlaps".into();
        assert!(ViewState::from_config_schema(&schema).is_err());
    }
}
