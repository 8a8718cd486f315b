//! Pipe-delimited line protocol spoken by external helper programs
//!
//! A helper prints one line per invocation, fields separated by `|`:
//!
//! | Layout  | Fields                                                  |
//! |---------|---------------------------------------------------------|
//! | `Basic` | title, artist, album, artwork, source                   |
//! | `Timed` | title, artist, album, artwork, duration, position       |
//! | `Full`  | title, artist, album, artwork, duration, position, source |
//!
//! Empty output means nothing is playing. The literals `null` and
//! `missing value` mark a field as unknown. Numbers accept a decimal comma,
//! which AppleScript produces under some locales. Fields beyond the layout
//! are ignored; lines with too few fields are rejected.

use std::fmt;
use std::str::FromStr;

use crate::model::{valid_seconds, MediaState, Snapshot};

pub const FIELD_SEPARATOR: char = '|';

const UNKNOWN_MARKERS: [&str; 2] = ["null", "missing value"];

/// Field layout of a helper's output line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldLayout {
    /// `title|artist|album|artwork|source`
    Basic,
    /// `title|artist|album|artwork|duration|position`
    Timed,
    /// `title|artist|album|artwork|duration|position|source`
    #[default]
    Full,
}

impl FieldLayout {
    /// Minimum number of fields a line must have
    pub fn field_count(self) -> usize {
        match self {
            FieldLayout::Basic => 5,
            FieldLayout::Timed => 6,
            FieldLayout::Full => 7,
        }
    }

    fn source_index(self) -> Option<usize> {
        match self {
            FieldLayout::Basic => Some(4),
            FieldLayout::Timed => None,
            FieldLayout::Full => Some(6),
        }
    }

    fn timing_indices(self) -> Option<(usize, usize)> {
        match self {
            FieldLayout::Basic => None,
            FieldLayout::Timed | FieldLayout::Full => Some((4, 5)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLayout::Basic => "basic",
            FieldLayout::Timed => "timed",
            FieldLayout::Full => "full",
        }
    }
}

impl fmt::Display for FieldLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(FieldLayout::Basic),
            "timed" => Ok(FieldLayout::Timed),
            "full" => Ok(FieldLayout::Full),
            other => Err(format!(
                "unknown field layout '{other}' (expected basic, timed or full)"
            )),
        }
    }
}

/// Parse helper output into a media state
///
/// `default_source` names the snapshot when the layout carries no source
/// field or the field is empty. Anything unparseable yields `Absent`.
pub fn parse_output(output: &str, layout: FieldLayout, default_source: &str) -> MediaState {
    MediaState::from_sample(parse_line(output, layout, default_source))
}

/// Parse the first non-empty line of helper output
pub fn parse_line(output: &str, layout: FieldLayout, default_source: &str) -> Option<Snapshot> {
    let line = output.lines().map(str::trim).find(|line| !line.is_empty())?;
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < layout.field_count() {
        return None;
    }

    let source_name = layout
        .source_index()
        .and_then(|index| text(fields[index]))
        .unwrap_or_else(|| default_source.to_string());

    let (duration_secs, position_secs) = match layout.timing_indices() {
        Some((duration, position)) => (seconds(fields[duration]), seconds(fields[position])),
        None => (None, None),
    };

    Some(Snapshot {
        title: text(fields[0]),
        artist: text(fields[1]),
        album: text(fields[2]),
        artwork_url: text(fields[3]),
        duration_secs,
        position_secs,
        source_name,
    })
}

/// Render a snapshot as a `Full` layout line
///
/// Missing values are written as `null`. Separator characters inside text
/// fields are replaced with `/` so the line stays parseable.
pub fn format_line(snapshot: &Snapshot) -> String {
    fn field(value: Option<&str>) -> String {
        value
            .map(|v| v.replace(FIELD_SEPARATOR, "/"))
            .unwrap_or_else(|| "null".to_string())
    }

    fn number(value: Option<f64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_else(|| "null".to_string())
    }

    [
        field(snapshot.title()),
        field(snapshot.artist()),
        field(snapshot.album()),
        field(snapshot.artwork_url()),
        number(snapshot.duration_secs()),
        number(snapshot.position_secs()),
        field(Some(snapshot.source_name())),
    ]
    .join("|")
}

fn text(field: &str) -> Option<String> {
    let field = field.trim();
    if field.is_empty() || UNKNOWN_MARKERS.iter().any(|m| field.eq_ignore_ascii_case(m)) {
        None
    } else {
        Some(field.to_string())
    }
}

fn seconds(field: &str) -> Option<f64> {
    let field = text(field)?;
    let value: f64 = field.replace(',', ".").parse().ok()?;
    valid_seconds(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_full_line() {
        let snapshot = parse_line(
            "Song|Band|Record|https://img/a.jpg|215.5|12|Spotify\n",
            FieldLayout::Full,
            "helper",
        )
        .unwrap();

        assert_eq!(snapshot.title(), Some("Song"));
        assert_eq!(snapshot.artist(), Some("Band"));
        assert_eq!(snapshot.album(), Some("Record"));
        assert_eq!(snapshot.artwork_url(), Some("https://img/a.jpg"));
        assert_eq!(snapshot.duration_secs(), Some(215.5));
        assert_eq!(snapshot.position_secs(), Some(12.0));
        assert_eq!(snapshot.source_name(), "Spotify");
    }

    #[test]
    fn test_parse_basic_line() {
        let snapshot = parse_line("Song|Band|Record||Spotify.exe", FieldLayout::Basic, "windows")
            .unwrap();
        assert_eq!(snapshot.artwork_url(), None);
        assert_eq!(snapshot.duration_secs(), None);
        assert_eq!(snapshot.source_name(), "Spotify.exe");
    }

    #[test]
    fn test_timed_layout_uses_default_source() {
        let snapshot = parse_line(
            "Song|Band|Record|missing value|200,25|3.5",
            FieldLayout::Timed,
            "Apple Music",
        )
        .unwrap();
        assert_eq!(snapshot.artwork_url(), None);
        assert_eq!(snapshot.duration_secs(), Some(200.25));
        assert_eq!(snapshot.source_name(), "Apple Music");
    }

    #[test]
    fn test_empty_source_field_falls_back() {
        let snapshot = parse_line("Song|Band|Record|null|", FieldLayout::Basic, "windows").unwrap();
        assert_eq!(snapshot.source_name(), "windows");
    }

    #[rstest]
    #[case("")]
    #[case("\n\n")]
    #[case("Song|Band|Record")]
    #[case("only one field")]
    fn test_unparseable_output(#[case] output: &str) {
        assert_eq!(parse_line(output, FieldLayout::Basic, "x"), None);
        assert_eq!(parse_output(output, FieldLayout::Basic, "x"), MediaState::Absent);
    }

    #[test]
    fn test_all_unknown_fields_is_absent() {
        let output = "null|null|missing value|null|null";
        assert_eq!(parse_output(output, FieldLayout::Basic, "x"), MediaState::Absent);
    }

    #[rstest]
    #[case("-1")]
    #[case("NaN")]
    #[case("inf")]
    #[case("abc")]
    fn test_invalid_numbers_are_dropped(#[case] value: &str) {
        let line = format!("Song|Band|Record|null|{value}|{value}");
        let snapshot = parse_line(&line, FieldLayout::Timed, "x").unwrap();
        assert_eq!(snapshot.duration_secs(), None);
        assert_eq!(snapshot.position_secs(), None);
    }

    #[test]
    fn test_format_line_is_parseable() {
        let snapshot = Snapshot::new("Spotify")
            .with_title("Either|Or")
            .with_artist("Band")
            .with_duration_secs(180.0);

        let line = format_line(&snapshot);
        assert_eq!(line, "Either/Or|Band|null|null|180|null|Spotify");

        let parsed = parse_line(&line, FieldLayout::Full, "x").unwrap();
        assert_eq!(parsed.title(), Some("Either/Or"));
        assert_eq!(parsed.album(), None);
        assert_eq!(parsed.duration_secs(), Some(180.0));
    }

    #[test]
    fn test_layout_from_str() {
        assert_eq!("Timed".parse::<FieldLayout>(), Ok(FieldLayout::Timed));
        assert!("csv".parse::<FieldLayout>().is_err());
        assert_eq!(FieldLayout::default(), FieldLayout::Full);
    }
}
