//! Terminal output utilities
//!
//! Status lines go to stderr so that result data on stdout can be piped.

use console::{truncate_str, Term};
use geosearch_documents::ProjectedFeature;
use geosearch_geo::{Extent, GeometryType};
use owo_colors::OwoColorize;

/// Width used when stdout is not a terminal
const DEFAULT_WIDTH: usize = 100;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        eprintln!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        eprintln!();
        eprintln!("{}", message.bold());
        eprintln!("{}", "─".repeat(message.chars().count()));
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// "N documents" or "N of M documents" when the index capped the rows
pub fn format_hits(shown: usize, total: u64) -> String {
    if total > shown as u64 {
        format!("{shown} of {total} documents")
    } else {
        format_count(shown, "document", "documents")
    }
}

/// Extent in the comma separated `e=` form
pub fn format_extent(extent: &Extent) -> String {
    extent.to_string()
}

fn geometry_label(geometry_type: GeometryType) -> &'static str {
    match geometry_type {
        GeometryType::Point => "point",
        GeometryType::LineString => "line",
        GeometryType::Polygon => "polygon",
        _ => "multi",
    }
}

/// One listing line: id, geometry kind, shelfmark and title
pub fn result_line(feature: &ProjectedFeature, width: usize) -> String {
    let properties = &feature.document.properties;
    let line = format!(
        "{:<12} {:<8} {:<16} {}",
        feature.id,
        geometry_label(feature.geometry_type()),
        properties.shelfmark_usi.as_deref().unwrap_or("-"),
        properties.title.as_deref().unwrap_or(""),
    );
    truncate_str(&line, width, "…").into_owned()
}

/// Print a listing of `features` to stdout, sized to the terminal
pub fn print_results<'a>(features: impl IntoIterator<Item = &'a ProjectedFeature>) {
    let width = Term::stdout()
        .size_checked()
        .map_or(DEFAULT_WIDTH, |(_, cols)| usize::from(cols));
    for feature in features {
        let line = result_line(feature, width);
        if feature.document.properties.restricted {
            println!("{}", line.dimmed());
        } else {
            println!("{line}");
        }
    }
}
