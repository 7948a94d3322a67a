//! Person records and their canonical text grammar.
//!
//! The canonical text of a `PersonRecord` is both the input to its chain
//! hash and its on-disk payload, so the rendering below is load-bearing:
//!
//! ```text
//! <first> <patronymic> <last> <YYYY-MM-DD> Fingerprint[x=<i32>, y=<i32>, type=<KIND>, quality=<i32>]
//! ```
//!
//! Changing a single byte of this grammar changes every historical hash.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MalformedRecord;

const MARK_PREFIX: &str = " Fingerprint[";

/// The kind of a fingerprint mark.
///
/// Rendered in canonical text by its upper-case name (`POINT`, `CORE`,
/// `DELTA`); `label()` is for display only and never hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkKind {
    Point,
    Core,
    Delta,
}

impl MarkKind {
    pub const ALL: [MarkKind; 3] = [MarkKind::Point, MarkKind::Core, MarkKind::Delta];

    /// The enumeration name used in canonical text.
    pub fn name(self) -> &'static str {
        match self {
            MarkKind::Point => "POINT",
            MarkKind::Core => "CORE",
            MarkKind::Delta => "DELTA",
        }
    }

    /// Human-readable label for listings.
    pub fn label(self) -> &'static str {
        match self {
            MarkKind::Point => "Point",
            MarkKind::Core => "Core",
            MarkKind::Delta => "Delta",
        }
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarkKind {
    type Err = MalformedRecord;

    /// Accepts only the exact upper-case enumeration name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| MalformedRecord::new(format!("unknown mark type '{s}'")))
    }
}

/// A single fingerprint point-quality descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintMark {
    pub x: i32,
    pub y: i32,
    pub kind: MarkKind,
    pub quality: i32,
}

impl FingerprintMark {
    pub fn new(x: i32, y: i32, kind: MarkKind, quality: i32) -> Self {
        Self { x, y, kind, quality }
    }

    /// Parse the body between `Fingerprint[` and `]`.
    ///
    /// Every key (`x`, `y`, `type`, `quality`) must appear exactly once.
    fn parse_body(body: &str) -> Result<Self, MalformedRecord> {
        let mut x = None;
        let mut y = None;
        let mut kind = None;
        let mut quality = None;

        for field in body.split(',') {
            let (key, value) = field
                .trim()
                .split_once('=')
                .ok_or_else(|| MalformedRecord::new(format!("mark field '{}' has no '='", field.trim())))?;
            let (key, value) = (key.trim(), value.trim());

            let slot_taken = match key {
                "x" => x.replace(parse_int(key, value)?).is_some(),
                "y" => y.replace(parse_int(key, value)?).is_some(),
                "type" => kind.replace(value.parse::<MarkKind>()?).is_some(),
                "quality" => quality.replace(parse_int(key, value)?).is_some(),
                other => return Err(MalformedRecord::new(format!("unknown mark field '{other}'"))),
            };
            if slot_taken {
                return Err(MalformedRecord::new(format!("mark field '{key}' repeated")));
            }
        }

        let missing = |name: &str| MalformedRecord::new(format!("mark field '{name}' missing"));
        Ok(Self {
            x: x.ok_or_else(|| missing("x"))?,
            y: y.ok_or_else(|| missing("y"))?,
            kind: kind.ok_or_else(|| missing("type"))?,
            quality: quality.ok_or_else(|| missing("quality"))?,
        })
    }
}

impl fmt::Display for FingerprintMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fingerprint[x={}, y={}, type={}, quality={}]",
            self.x, self.y, self.kind, self.quality
        )
    }
}

fn parse_int(key: &str, value: &str) -> Result<i32, MalformedRecord> {
    value
        .parse::<i32>()
        .map_err(|e| MalformedRecord::new(format!("mark field '{key}' value '{value}': {e}")))
}

/// One person entry in the ledger.
///
/// Name fields are free text here. `ensure_readable` tells whether a record
/// survives the canonical grammar; the ledger refuses any that do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub first_name: String,
    pub last_name: String,
    pub patronymic: String,
    pub birth_date: NaiveDate,
    pub mark: FingerprintMark,
}

impl PersonRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        patronymic: impl Into<String>,
        birth_date: NaiveDate,
        mark: FingerprintMark,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            patronymic: patronymic.into(),
            birth_date,
            mark,
        }
    }

    /// The exact text that is hashed and stored for this record.
    pub fn canonical_text(&self) -> String {
        self.to_string()
    }

    /// `last first patronymic`, the order operators read names in.
    pub fn full_name(&self) -> String {
        format!("{} {} {}", self.last_name, self.first_name, self.patronymic)
    }

    /// Check that this record's canonical text parses back to an equal record.
    ///
    /// Names holding spaces or a ` Fingerprint[` fragment render text that
    /// reads back differently, or not at all.
    pub fn ensure_readable(&self) -> Result<(), MalformedRecord> {
        let parsed = Self::parse_canonical(&self.canonical_text())?;
        if &parsed != self {
            return Err(MalformedRecord::new(format!(
                "canonical text reads back as a different record: {parsed}"
            )));
        }
        Ok(())
    }

    /// Parse canonical text back into a record.
    pub fn parse_canonical(text: &str) -> Result<Self, MalformedRecord> {
        let mark_at = text
            .find(MARK_PREFIX)
            .ok_or_else(|| MalformedRecord::new("no fingerprint mark"))?;
        let (person_part, rest) = text.split_at(mark_at);
        let body = rest[MARK_PREFIX.len()..]
            .strip_suffix(']')
            .ok_or_else(|| MalformedRecord::new("fingerprint mark is not closed with ']'"))?;

        let tokens: Vec<&str> = person_part.split(' ').collect();
        let [first_name, patronymic, last_name, birth_date] = tokens.as_slice() else {
            return Err(MalformedRecord::new(format!(
                "expected 4 person fields, found {}",
                tokens.len()
            )));
        };
        if [first_name, patronymic, last_name].iter().any(|t| t.is_empty()) {
            return Err(MalformedRecord::new("empty name field"));
        }

        let birth_date = birth_date
            .parse::<NaiveDate>()
            .map_err(|e| MalformedRecord::new(format!("birth date '{birth_date}': {e}")))?;

        Ok(Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            patronymic: patronymic.to_string(),
            birth_date,
            mark: FingerprintMark::parse_body(body)?,
        })
    }
}

impl fmt::Display for PersonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.first_name,
            self.patronymic,
            self.last_name,
            self.birth_date.format("%Y-%m-%d"),
            self.mark
        )
    }
}
