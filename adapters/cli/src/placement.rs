//! Parsing of scripted tower placements given on the command line.

use std::str::FromStr;

use glam::Vec2;
use waypoint_defence_core::TowerKind;

/// Separates the tower kind from its coordinates.
const KIND_DELIMITER: char = '@';
/// Separates the two coordinates.
const COORDINATE_DELIMITER: char = ',';

/// Tower the runner builds before the first tick of every level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TowerPlacement {
    /// Kind of tower to build.
    pub(crate) kind: TowerKind,
    /// Centre of the tower.
    pub(crate) position: Vec2,
}

impl FromStr for TowerPlacement {
    type Err = PlacementParseError;

    /// Parses `KIND@X,Y`, for example `sniper@400,720`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlacementParseError::Empty);
        }

        let (kind, coordinates) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or(PlacementParseError::MissingPosition)?;
        let kind = parse_kind(kind.trim())?;

        let (x, y) = coordinates
            .split_once(COORDINATE_DELIMITER)
            .ok_or(PlacementParseError::MissingCoordinate)?;
        let position = Vec2::new(parse_coordinate(x)?, parse_coordinate(y)?);

        Ok(Self { kind, position })
    }
}

fn parse_kind(value: &str) -> Result<TowerKind, PlacementParseError> {
    match value.to_ascii_lowercase().as_str() {
        "basic" => Ok(TowerKind::Basic),
        "sniper" => Ok(TowerKind::Sniper),
        _ => Err(PlacementParseError::UnknownKind(value.to_owned())),
    }
}

fn parse_coordinate(value: &str) -> Result<f32, PlacementParseError> {
    let trimmed = value.trim();
    let parsed: f32 = trimmed
        .parse()
        .map_err(|_| PlacementParseError::InvalidCoordinate(trimmed.to_owned()))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(PlacementParseError::InvalidCoordinate(trimmed.to_owned()))
    }
}

/// Errors that can occur while parsing a tower placement.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum PlacementParseError {
    /// The placement string was empty.
    #[error("tower placement is empty")]
    Empty,
    /// The `@` separating kind and position is missing.
    #[error("expected KIND@X,Y")]
    MissingPosition,
    /// Only one coordinate was provided.
    #[error("expected two comma-separated coordinates")]
    MissingCoordinate,
    /// The tower kind is not recognised.
    #[error("unknown tower kind `{0}` (expected basic or sniper)")]
    UnknownKind(String),
    /// A coordinate is not a finite number.
    #[error("invalid coordinate `{0}`")]
    InvalidCoordinate(String),
}
