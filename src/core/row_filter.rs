use crate::domain::model::{Coordinate, RawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingLatitude,
    MissingLongitude,
    NotNumeric,
    NotFinite,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::MissingLatitude => "latitude missing",
            SkipReason::MissingLongitude => "longitude missing",
            SkipReason::NotNumeric => "coordinate is not a number",
            SkipReason::NotFinite => "coordinate is not finite",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<'a> {
    Valid {
        coordinate: Coordinate,
        record: &'a RawRecord,
    },
    Skip(SkipReason),
}

fn parse_component(value: &str) -> Result<f64, SkipReason> {
    let parsed: f64 = value.parse().map_err(|_| SkipReason::NotNumeric)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(SkipReason::NotFinite)
    }
}

/// Decides whether a row can be placed on the map.
///
/// Never fails: a row without a usable coordinate pair is reported as
/// [`RowOutcome::Skip`] and the caller moves on to the next one.
pub fn check_row<'a>(record: &'a RawRecord, latitude_column: &str, longitude_column: &str) -> RowOutcome<'a> {
    let Some(latitude) = record.get(latitude_column) else {
        return RowOutcome::Skip(SkipReason::MissingLatitude);
    };
    let Some(longitude) = record.get(longitude_column) else {
        return RowOutcome::Skip(SkipReason::MissingLongitude);
    };

    match (parse_component(latitude), parse_component(longitude)) {
        (Ok(latitude), Ok(longitude)) => RowOutcome::Valid {
            coordinate: Coordinate::new(latitude, longitude),
            record,
        },
        (Err(reason), _) | (_, Err(reason)) => RowOutcome::Skip(reason),
    }
}
