//! Record codec
//!
//! Maps a `Driver` to and from its one-line text form.
//!
//! Decoding is strict: only the exact text `encode` would produce for some
//! record is accepted, so `encode(decode(line)) == line` for every line that
//! decodes.

use chrono::NaiveDate;
use thiserror::Error;

use super::Driver;

/// Field separator
pub const DELIMITER: char = ';';

/// Number of fields in every record line
pub const FIELD_COUNT: usize = 5;

/// ISO-8601 calendar date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Why a line failed to decode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorruptRecord {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid id {0:?}")]
    InvalidId(String),

    #[error("invalid {field} {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("id {0} leaves no room for another record")]
    IdSpaceExhausted(u64),
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a driver under the given id, without line terminator
pub fn encode(id: u64, driver: &Driver) -> String {
    format!(
        "{id}{d}{first}{d}{last}{d}{dob}{d}{created}",
        id = id,
        first = driver.first_name,
        last = driver.last_name,
        dob = driver.date_of_birth.format(DATE_FORMAT),
        created = driver.creation_date.format(DATE_FORMAT),
        d = DELIMITER,
    )
}

/// Encode a driver under the given id, terminator included
///
/// Writers hand this to a single `write_all` so the content and the
/// terminator are never observable separately.
pub fn encode_line(id: u64, driver: &Driver) -> String {
    let mut line = encode(id, driver);
    line.push('\n');
    line
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode one line (terminator already stripped) into a stored driver
pub fn decode(line: &str) -> Result<Driver, CorruptRecord> {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() != FIELD_COUNT {
        return Err(CorruptRecord::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    Ok(Driver {
        id: Some(parse_id(fields[0])?),
        first_name: fields[1].to_string(),
        last_name: fields[2].to_string(),
        date_of_birth: parse_date("dateOfBirth", fields[3])?,
        creation_date: parse_date("creationDate", fields[4])?,
    })
}

/// Parse the id field
///
/// Accepts canonical positive decimals only: no sign, no leading zeros.
pub fn parse_id(field: &str) -> Result<u64, CorruptRecord> {
    let canonical = !field.is_empty()
        && field.bytes().all(|b| b.is_ascii_digit())
        && !field.starts_with('0');
    if !canonical {
        return Err(CorruptRecord::InvalidId(field.to_string()));
    }
    field
        .parse::<u64>()
        .map_err(|_| CorruptRecord::InvalidId(field.to_string()))
}

/// Parse the id at the start of a line without decoding the rest
pub fn parse_leading_id(line: &str) -> Result<u64, CorruptRecord> {
    let field = line.split(DELIMITER).next().unwrap_or_default();
    parse_id(field)
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, CorruptRecord> {
    let invalid = || CorruptRecord::InvalidDate {
        field,
        value: value.to_string(),
    };
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())?;
    // chrono accepts unpadded months/days; only the canonical form is allowed
    if date.format(DATE_FORMAT).to_string() != value {
        return Err(invalid());
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn jaime() -> Driver {
        Driver::new("Jaime", "Bergas", date(1984, 5, 15)).with_creation_date(date(2020, 2, 8))
    }

    #[test]
    fn test_encode_fixed_order() {
        assert_eq!(encode(1, &jaime()), "1;Jaime;Bergas;1984-05-15;2020-02-08");
        assert_eq!(encode_line(12, &jaime()), "12;Jaime;Bergas;1984-05-15;2020-02-08\n");
    }

    #[test]
    fn test_encode_ignores_driver_id() {
        let mut driver = jaime();
        driver.id = Some(99);
        assert!(encode(3, &driver).starts_with("3;"));
    }

    #[test]
    fn test_decode_valid_line() {
        let driver = decode("2;Jane;Doe;1980-05-15;2018-02-08").unwrap();
        assert_eq!(driver.id, Some(2));
        assert_eq!(driver.first_name, "Jane");
        assert_eq!(driver.last_name, "Doe");
        assert_eq!(driver.date_of_birth, date(1980, 5, 15));
        assert_eq!(driver.creation_date, date(2018, 2, 8));
    }

    #[test]
    fn test_round_trip_laws() {
        let lines = [
            "1;Jaime;Bergas;1984-05-15;2020-02-08",
            "42;Zoë;Ñúñez;2000-02-29;2024-12-31",
            "18446744073709551615;A;B;0001-01-01;9999-12-31",
        ];
        for line in lines {
            let driver = decode(line).unwrap();
            assert_eq!(encode(driver.id.unwrap(), &driver), line);
        }

        let mut driver = jaime();
        driver.id = Some(5);
        assert_eq!(decode(&encode(5, &driver)).unwrap(), driver);
    }

    #[test]
    fn test_decode_wrong_field_count() {
        assert_eq!(
            decode("1;Jaime;Bergas;1984-05-15"),
            Err(CorruptRecord::FieldCount { expected: 5, found: 4 })
        );
        assert_eq!(
            decode("1;Jaime;Bergas;1984-05-15;2020-02-08;extra"),
            Err(CorruptRecord::FieldCount { expected: 5, found: 6 })
        );
        assert_eq!(
            decode(""),
            Err(CorruptRecord::FieldCount { expected: 5, found: 1 })
        );
    }

    #[test]
    fn test_decode_bad_ids() {
        for id in ["x", "", "0", "007", "+1", "-1", "1.0", "99999999999999999999"] {
            let line = format!("{};Jaime;Bergas;1984-05-15;2020-02-08", id);
            assert_eq!(decode(&line), Err(CorruptRecord::InvalidId(id.to_string())));
        }
    }

    #[test]
    fn test_decode_bad_dates() {
        assert_eq!(
            decode("1;Jaime;Bergas;1984-13-15;2020-02-08"),
            Err(CorruptRecord::InvalidDate {
                field: "dateOfBirth",
                value: "1984-13-15".into()
            })
        );
        assert_eq!(
            decode("1;Jaime;Bergas;1984-05-15;2020-2-8"),
            Err(CorruptRecord::InvalidDate {
                field: "creationDate",
                value: "2020-2-8".into()
            })
        );
        assert!(decode("1;Jaime;Bergas;1984-05-15;2019-02-29").is_err());
    }

    #[test]
    fn test_parse_leading_id() {
        assert_eq!(parse_leading_id("17;whatever"), Ok(17));
        assert_eq!(parse_leading_id("17"), Ok(17));
        assert!(parse_leading_id("").is_err());
        assert!(parse_leading_id("abc;x").is_err());
    }
}
