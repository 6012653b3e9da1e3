//! # Route documents
//!
//! A [`RouteData`] is built once per "build route" request by the directions service and is
//! read-only afterwards. The tracking core decodes its polyline into the route geometry when a
//! navigation session starts.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use conquer_once::Lazy;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    coord::Coordinate,
    maneuver::TurnSide,
    polyline::{decode_polyline, PolylineError, GOOGLE_PRECISION},
};

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Matches a single HTML tag in an instruction.
static HTML_TAG_PATTERN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"<[^>]*>"));

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A route between an origin and a destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    /// Identifier assigned by the directions service
    #[serde(default)]
    pub route_id: String,

    pub summary: RouteSummary,

    /// Overview geometry of the whole route
    pub polyline: Polyline,

    /// The steps of the route in traversal order
    pub steps: Vec<RouteStep>,
}

/// Summary information about a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub origin_name: String,

    pub destination_name: String,

    /// Units: meters
    #[serde(rename = "distanceMeters")]
    pub distance_m: f64,

    /// Units: seconds
    #[serde(rename = "durationSeconds")]
    pub duration_s: f64,

    /// ISO 8601 arrival estimate made by the directions service
    #[serde(default)]
    pub eta: String,
}

/// One discrete instruction of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    /// Index of the step within the route
    pub i: usize,

    /// Instruction, possibly containing HTML markup
    #[serde(default, alias = "instructionText")]
    pub instruction_html: String,

    /// Vendor maneuver category, kept for display only
    #[serde(default)]
    pub maneuver: String,

    pub side: TurnSide,

    /// Location at which the instruction should fire
    pub trigger_at: Coordinate,

    /// Location at which the step ends
    pub end: Coordinate,

    /// Units: meters
    #[serde(rename = "distanceMeters", default)]
    pub distance_m: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The route geometry as delivered by the directions service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Polyline {
    /// Encoded polyline at Google precision
    Encoded { points: String },

    /// GeoJSON line string coordinates, each `[lng, lat]`
    GeoJson { coordinates: Vec<[f64; 2]> },
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("The route has no steps")]
    NoSteps,

    #[error("The route geometry must contain at least 2 points, found {0}")]
    TooFewPoints(usize),

    #[error("Step {0} has an invalid coordinate")]
    InvalidStepCoordinate(usize),

    #[error("Point {0} of the route geometry is not a valid coordinate")]
    InvalidGeometryPoint(usize),

    #[error("Cannot decode the route polyline: {0}")]
    PolylineError(PolylineError),

    #[error("Cannot load the route file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the route document: {0}")]
    DeserialiseError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RouteData {
    /// Parse a route from the JSON document produced by the directions service.
    pub fn from_json_str(json: &str) -> Result<Self, RouteError> {
        serde_json::from_str(json).map_err(RouteError::DeserialiseError)
    }

    /// Load a route from a JSON file, such as one previously saved into a session.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, RouteError> {
        let json = std::fs::read_to_string(path).map_err(RouteError::FileLoadError)?;
        Self::from_json_str(&json)
    }

    /// Check the route is usable for navigation and return its decoded geometry.
    ///
    /// A usable route has at least one step, valid step coordinates, and a geometry of at least
    /// two valid points.
    pub fn validate(&self) -> Result<Vec<Coordinate>, RouteError> {
        if self.steps.is_empty() {
            return Err(RouteError::NoSteps);
        }

        for (i, step) in self.steps.iter().enumerate() {
            if !step.trigger_at.is_valid() || !step.end.is_valid() {
                return Err(RouteError::InvalidStepCoordinate(i));
            }
        }

        let points = self.polyline.decode().map_err(RouteError::PolylineError)?;

        if points.len() < 2 {
            return Err(RouteError::TooFewPoints(points.len()));
        }

        if let Some(i) = points.iter().position(|p| !p.is_valid()) {
            return Err(RouteError::InvalidGeometryPoint(i));
        }

        Ok(points)
    }
}

impl RouteStep {
    /// The instruction with any HTML tags removed.
    pub fn instruction_text(&self) -> String {
        match &*HTML_TAG_PATTERN {
            Ok(re) => re.replace_all(&self.instruction_html, "").into_owned(),
            Err(e) => {
                warn!("Could not build the HTML tag pattern: {}", e);
                self.instruction_html.clone()
            }
        }
    }
}

impl Polyline {
    /// Decode the polyline into a sequence of coordinates.
    pub fn decode(&self) -> Result<Vec<Coordinate>, PolylineError> {
        match self {
            Polyline::Encoded { points } => decode_polyline(points, GOOGLE_PRECISION),
            Polyline::GeoJson { coordinates } => Ok(coordinates
                .iter()
                .map(|c| Coordinate::new(c[1], c[0]))
                .collect()),
        }
    }
}
