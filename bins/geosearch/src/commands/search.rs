//! Search command

use super::{emit, parse_extent, parse_position};
use crate::OutputFormat;
use anyhow::{Context, Result};
use clap::Args;
use console::Term;
use geosearch_cli::output::{format_duration, format_extent, format_hits, print_results, Status};
use geosearch_cli::progress;
use geosearch_client::{
    ClientConfig, QueryBuilder, SearchController, SearchFilters, SearchRequest, SpatialMode,
};
use geosearch_core::config::Config;
use geosearch_core::Error as CoreError;
use geosearch_geo::{from_web_mercator, Viewport};
use geosearch_view::{Effect, Event, SearchSession, ViewState};
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Full-text terms, each matched as a prefix
    pub terms: Vec<String>,

    /// Search rectangle as min_lon,min_lat,max_lon,max_lat
    #[arg(short, long, allow_hyphen_values = true)]
    pub extent: Option<String>,

    /// Map center as lon,lat (defaults to the configured center)
    #[arg(long, allow_hyphen_values = true)]
    pub center: Option<String>,

    /// Map zoom level (defaults to the configured zoom)
    #[arg(short, long)]
    pub zoom: Option<f64>,

    /// Map width in pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f64,

    /// Map height in pixels
    #[arg(long, default_value_t = 800.0)]
    pub height: f64,

    /// Pixels covered by the side panel on the left map edge
    #[arg(long)]
    pub offset: Option<f64>,

    /// Spatial predicate: within or intersects
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Only documents of type map
    #[arg(long)]
    pub only_maps: bool,

    /// Only public documents
    #[arg(long)]
    pub only_public: bool,

    /// Order by geometry type: points, then lines, then polygons
    #[arg(short, long)]
    pub sort: bool,

    /// Print the select URL without querying the index
    #[arg(long)]
    pub dry_run: bool,

    /// Write JSON or CSV output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Apply the command line to a fresh view state and return the event that starts the search.
fn prepare(args: &SearchArgs, config: &Config) -> Result<(ViewState, Event)> {
    let schema = &config.schema;
    let mut state = ViewState::from_config_schema(schema).map_err(CoreError::from)?;

    let mut filters = SearchFilters {
        only_maps: state.filters().only_maps || args.only_maps,
        only_public: state.filters().only_public || args.only_public,
        ..SearchFilters::default()
    };
    filters = filters.with_text(&args.terms.join(" "));
    state.update(Event::FiltersChanged(filters));

    if let Some(mode) = &args.mode {
        let mode: SpatialMode = mode.parse().map_err(CoreError::from)?;
        state.update(Event::SpatialModeChanged(mode));
    }
    if args.sort {
        state.update(Event::SortChanged(true));
    }
    if let Some(offset) = args.offset {
        state.update(Event::OffsetWidthChanged(offset));
    }

    let trigger = match &args.extent {
        Some(extent) => Event::ExplicitSearch(parse_extent(extent)?),
        None => {
            let center = match &args.center {
                Some(center) => parse_position(center)?,
                None => schema.map.center,
            };
            let zoom = args.zoom.unwrap_or(schema.map.zoom);
            Event::MapLoaded(Viewport::new(center, zoom, [args.width, args.height]))
        }
    };
    Ok((state, trigger))
}

/// The search among `effects`
fn scheduled(effects: Vec<Effect>) -> Result<SearchRequest> {
    effects
        .into_iter()
        .find_map(|effect| match effect {
            Effect::Search(request) => Some(request),
            _ => None,
        })
        .context("no search was scheduled")
}

/// The state and search the command line leads to, without running it.
fn plan(args: &SearchArgs, config: &Config) -> Result<(ViewState, SearchRequest)> {
    let (mut state, trigger) = prepare(args, config)?;
    let request = scheduled(state.update(trigger))?;
    Ok((state, request))
}

/// Run a single search and print the results
pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client_config = ClientConfig::from_index_config(&config.schema.index)
        .with_env_overrides()
        .map_err(CoreError::from)?;

    if args.dry_run {
        let (_, request) = plan(&args, config)?;
        let queries = QueryBuilder::new(&client_config).map_err(CoreError::from)?;
        println!("{}", queries.search_url(&request));
        return Ok(());
    }

    let (state, trigger) = prepare(&args, config)?;
    let controller = SearchController::from_config(client_config, &config.schema.search)
        .map_err(CoreError::from)?;
    let mut session = SearchSession::new(state, controller);
    let request = scheduled(session.dispatch(trigger))?;

    let spinner = if format == OutputFormat::Text && Term::stderr().is_term() {
        progress::spinner(&format!("Searching {}", format_extent(&request.extent)))
    } else {
        progress::hidden()
    };

    let started = Instant::now();
    if let Err(e) = session.settle().await {
        progress::finish_error(&spinner, "Search failed");
        return Err(e.into());
    }
    let state = session.state();
    progress::finish_success(
        &spinner,
        &format!(
            "{} in {}",
            format_hits(state.results().len(), state.results().total()),
            format_duration(started.elapsed())
        ),
    );

    match format {
        OutputFormat::Text => print_text(state),
        OutputFormat::Json => emit(&to_json(state, &request)?, args.output.as_deref())?,
        OutputFormat::Csv => match state.export_csv() {
            Some(csv) => emit(&csv, args.output.as_deref())?,
            None => Status::warning("No documents to export"),
        },
    }

    Ok(())
}

fn print_text(state: &ViewState) {
    let results = state.results();
    Status::header(&format_hits(results.len(), results.total()));
    print_results(state.sidebar_features());
    if results.is_truncated() {
        Status::warning("The index capped the result list; narrow the extent to see all documents");
    }
}

fn to_json(state: &ViewState, request: &SearchRequest) -> Result<String> {
    let results = state.results();
    let features: Vec<_> = state
        .sidebar_features()
        .into_iter()
        .map(|feature| {
            json!({
                "id": feature.id,
                "geometry_type": feature.geometry_type().as_str(),
                "position": from_web_mercator(feature.position),
                "document": feature.document.as_ref(),
            })
        })
        .collect();

    let output = json!({
        "extent": request.extent.to_array(),
        "mode": request.mode.as_str(),
        "total": results.total(),
        "truncated": results.is_truncated(),
        "features": features,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}
