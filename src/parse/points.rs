//! Parser voor puntenbestanden.
//!
//! Eén punt per regel als drie door witruimte gescheiden getallen (`x y z`).
//! Lege regels worden overgeslagen; extra kolommen na de derde worden
//! genegeerd (met een waarschuwing in het log).

use std::fs;
use std::num::ParseFloatError;
use std::path::Path;

use thiserror::Error;

use crate::geom::Point3;

/// Result type voor het parsen van puntenbestanden.
pub type ParseResult<T> = Result<T, ParseError>;

/// Beschrijft fouten tijdens het parsen.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Een regel bevat minder dan drie coördinaten.
    #[error("regel {line}: verwacht 3 coördinaten, gevonden {found}")]
    MissingCoordinate { line: usize, found: usize },
    /// Een coördinaat is geen geldig getal.
    #[error("regel {line}: ongeldige numerieke waarde `{token}`: {source}")]
    InvalidNumber {
        line: usize,
        token: String,
        #[source]
        source: ParseFloatError,
    },
    /// Een coördinaat is NaN of oneindig.
    #[error("regel {line}: coördinaat `{token}` is niet eindig")]
    NonFinite { line: usize, token: String },
    /// Het bestand kon niet gelezen worden.
    #[error("puntenbestand kon niet gelezen worden: {0}")]
    Io(#[from] std::io::Error),
}

/// Leest alle punten uit een tekst in puntenbestandformaat.
pub fn parse_points(input: &str) -> ParseResult<Vec<Point3>> {
    let mut points = Vec::new();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < 3 {
            return Err(ParseError::MissingCoordinate {
                line,
                found: tokens.len(),
            });
        }
        if tokens.len() > 3 {
            log::warn!(
                "regel {line}: {} extra kolom(men) genegeerd",
                tokens.len() - 3
            );
        }

        let x = parse_coordinate(line, tokens[0])?;
        let y = parse_coordinate(line, tokens[1])?;
        let z = parse_coordinate(line, tokens[2])?;
        points.push(Point3::new(x, y, z));
    }

    log::debug!("{} punten gelezen", points.len());
    Ok(points)
}

/// Leest een puntenbestand van schijf.
pub fn read_points_file(path: impl AsRef<Path>) -> ParseResult<Vec<Point3>> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_points(&text)
}

fn parse_coordinate(line: usize, token: &str) -> ParseResult<f64> {
    let value: f64 = token.parse().map_err(|source| ParseError::InvalidNumber {
        line,
        token: token.to_owned(),
        source,
    })?;
    if !value.is_finite() {
        return Err(ParseError::NonFinite {
            line,
            token: token.to_owned(),
        });
    }
    Ok(value)
}
