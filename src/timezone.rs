use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimezoneError {
    #[error("Unknown timezone: {0}")]
    UnknownZone(String),
    #[error("Invalid date/time '{value}': {source}")]
    InvalidDateTime {
        value: String,
        source: chrono::ParseError,
    },
}

/// Outcome of a display conversion. Failures never reach the caller as an
/// error; they carry the original values plus the reason so the caller can
/// log it.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Converted {
        date: String,
        time: String,
    },
    FallbackOriginal {
        date: String,
        time: String,
        reason: TimezoneError,
    },
}

impl Conversion {
    pub fn into_parts(self) -> (String, String) {
        match self {
            Conversion::Converted { date, time } => (date, time),
            Conversion::FallbackOriginal { date, time, .. } => (date, time),
        }
    }
}

pub fn parse_zone(name: &str) -> Result<Tz, TimezoneError> {
    name.parse::<Tz>()
        .map_err(|_| TimezoneError::UnknownZone(name.to_string()))
}

fn parse_wall_clock(date: &str, time: &str) -> Result<NaiveDateTime, TimezoneError> {
    let value = format!("{date} {time}");
    NaiveDateTime::parse_from_str(&value, &format!("{DATE_FORMAT} {TIME_FORMAT}"))
        .map_err(|source| TimezoneError::InvalidDateTime { value, source })
}

/// Resolves a wall-clock time to an instant using standard time wherever
/// the zone's transitions leave a choice: a repeated fall-back hour takes the
/// later (standard) instant, and a skipped spring-forward hour is read with
/// the offset in force before the jump.
fn localize(naive: NaiveDateTime, zone: Tz) -> DateTime<Tz> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(local) => local,
        LocalResult::Ambiguous(_, standard) => standard,
        LocalResult::None => {
            let before = zone
                .offset_from_utc_datetime(&(naive - Duration::days(1)))
                .fix();
            let utc = naive - Duration::seconds(before.local_minus_utc().into());
            zone.from_utc_datetime(&utc)
        }
    }
}

/// Absolute start instant of a wall-clock `date`/`time` in `zone`.
pub fn start_instant(date: &str, time: &str, zone: &str) -> Result<DateTime<Utc>, TimezoneError> {
    let zone = parse_zone(zone)?;
    let naive = parse_wall_clock(date, time)?;
    Ok(localize(naive, zone).with_timezone(&Utc))
}

fn try_convert(
    date: &str,
    time: &str,
    source_zone: &str,
    target_zone: &str,
) -> Result<(String, String), TimezoneError> {
    let source = parse_zone(source_zone)?;
    let target = parse_zone(target_zone)?;
    let local = localize(parse_wall_clock(date, time)?, source);
    let converted = local.with_timezone(&target);
    Ok((
        converted.format(DATE_FORMAT).to_string(),
        converted.format(TIME_FORMAT).to_string(),
    ))
}

/// Renders the wall-clock `date`/`time` in `source_zone` as wall-clock
/// values in `target_zone`.
pub fn convert(date: &str, time: &str, source_zone: &str, target_zone: &str) -> Conversion {
    match try_convert(date, time, source_zone, target_zone) {
        Ok((date, time)) => Conversion::Converted { date, time },
        Err(reason) => Conversion::FallbackOriginal {
            date: date.to_string(),
            time: time.to_string(),
            reason,
        },
    }
}
