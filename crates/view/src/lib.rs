//! Synchronization of the map layer, sidebar list and print list
//!
//! This crate provides:
//! - [`ViewState`]: the shared view state and its `(state, event) -> effects` transition
//! - Pixel picking of displayed features
//! - [`SearchSession`]: an async driver routing searches through a
//!   [`geosearch_client::SearchController`]
//!
//! # Example
//!
//! ```
//! use geosearch_geo::Viewport;
//! use geosearch_view::{Effect, Event, ViewState};
//!
//! let mut state = ViewState::default();
//! let effects = state.update(Event::MapLoaded(Viewport::new([13.74, 51.05], 8.0, [1024.0, 768.0])));
//! assert!(matches!(effects.as_slice(), [Effect::Search(_)]));
//! ```

mod picking;
mod session;
mod state;

pub use picking::pick_features;
pub use session::SearchSession;
pub use state::{Effect, Event, FeatureId, ViewOptions, ViewState};
