//! Parsers for coordinate literals, bounding boxes and gazetteer data, using nom.
//!
//! Accepted forms:
//!
//! ```text
//! 5.6037, -0.1870                      coordinate pair (lat, lng)
//! 4.7, -3.3, 11.2, 1.2                 bounding box (south, west, north, east)
//! city   | Accra   | 5.6037 | -0.1870  gazetteer city line
//! region | Ashanti | 5.8 | -2.6 | 7.6 | -0.5
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, map, map_res},
    number::complete::double,
    sequence::{delimited, separated_pair, terminated, tuple},
    IResult,
};

use crate::coord::{BoundingBox, Coordinates};
use crate::error::{GeoError, GeoResult};

/// One parsed gazetteer line.
#[derive(Debug, Clone, PartialEq)]
pub enum GazetteerRecord {
    /// A named point.
    City {
        /// Place name as written.
        name: String,
        /// Location of the place.
        location: Coordinates,
    },
    /// A named area.
    Region {
        /// Region name as written.
        name: String,
        /// Extent of the region.
        bounds: BoundingBox,
    },
}

/// Parses a `lat, lng` literal into validated coordinates.
///
/// ```rust
/// use facility_geo::parse_coordinates;
///
/// let accra = parse_coordinates("5.6037, -0.1870").unwrap();
/// assert_eq!(accra.lat, 5.6037);
/// ```
pub fn parse_coordinates(input: &str) -> GeoResult<Coordinates> {
    let input = input.trim();
    let (lat, lng) = run(coordinate_pair, input)?;
    Coordinates::new(lat, lng)
}

/// Parses a `south, west, north, east` literal into a validated bounding box.
pub fn parse_bounding_box(input: &str) -> GeoResult<BoundingBox> {
    let input = input.trim();
    let (south, west, north, east) = run(bounding_box, input)?;
    BoundingBox::new(south, west, north, east)
}

/// Parses gazetteer text.
///
/// Blank lines and lines starting with `#` are ignored. Errors carry the
/// 1-based line number.
pub fn parse_gazetteer(text: &str) -> GeoResult<Vec<GazetteerRecord>> {
    let mut records = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = index + 1;
        let record = parse_gazetteer_line(line).map_err(|e| GeoError::GazetteerLine {
            line: line_no,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

fn parse_gazetteer_line(line: &str) -> GeoResult<GazetteerRecord> {
    let parsed = run(gazetteer_record, line)?;
    match parsed {
        RawRecord::City(name, lat, lng) => Ok(GazetteerRecord::City {
            name,
            location: Coordinates::new(lat, lng)?,
        }),
        RawRecord::Region(name, (south, west, north, east)) => Ok(GazetteerRecord::Region {
            name,
            bounds: BoundingBox::new(south, west, north, east)?,
        }),
    }
}

/// Runs a parser to completion, converting nom errors to [`GeoError`].
fn run<'a, T>(
    mut parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
    input: &'a str,
) -> GeoResult<T> {
    if input.is_empty() {
        return Err(GeoError::ParseError {
            position: 0,
            message: "empty input".to_string(),
        });
    }

    match all_consuming(|i| parser(i))(input) {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let position = input.len() - e.input.len();
            Err(GeoError::ParseError {
                position,
                message: format!("unexpected input at: '{}'", truncate(e.input, 20)),
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(GeoError::ParseError {
            position: input.len(),
            message: "incomplete input".to_string(),
        }),
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Literals
// ============================================================================

/// A decimal number with optional surrounding spaces.
fn decimal(input: &str) -> IResult<&str, f64> {
    delimited(space0, double, space0)(input)
}

fn coordinate_pair(input: &str) -> IResult<&str, (f64, f64)> {
    separated_pair(decimal, char(','), decimal)(input)
}

fn bounding_box(input: &str) -> IResult<&str, (f64, f64, f64, f64)> {
    map(
        tuple((
            decimal,
            char(','),
            decimal,
            char(','),
            decimal,
            char(','),
            decimal,
        )),
        |(south, _, west, _, north, _, east)| (south, west, north, east),
    )(input)
}

// ============================================================================
// Gazetteer lines
// ============================================================================

enum RawRecord {
    City(String, f64, f64),
    Region(String, (f64, f64, f64, f64)),
}

fn field_separator(input: &str) -> IResult<&str, char> {
    delimited(space0, char('|'), space0)(input)
}

fn place_name(input: &str) -> IResult<&str, String> {
    map_res(take_while1(|c| c != '|'), |s: &str| {
        let name = s.trim();
        if name.is_empty() {
            Err("blank place name")
        } else {
            Ok(name.to_string())
        }
    })(input)
}

fn city_record(input: &str) -> IResult<&str, RawRecord> {
    map(
        tuple((
            tag_no_case("city"),
            field_separator,
            place_name,
            field_separator,
            decimal,
            field_separator,
            decimal,
        )),
        |(_, _, name, _, lat, _, lng)| RawRecord::City(name, lat, lng),
    )(input)
}

fn region_record(input: &str) -> IResult<&str, RawRecord> {
    map(
        tuple((
            tag_no_case("region"),
            field_separator,
            place_name,
            field_separator,
            decimal,
            field_separator,
            decimal,
            field_separator,
            decimal,
            field_separator,
            decimal,
        )),
        |(_, _, name, _, south, _, west, _, north, _, east)| {
            RawRecord::Region(name, (south, west, north, east))
        },
    )(input)
}

fn gazetteer_record(input: &str) -> IResult<&str, RawRecord> {
    terminated(alt((city_record, region_record)), space0)(input)
}
