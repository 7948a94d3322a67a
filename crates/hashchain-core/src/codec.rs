//! Persistence codec for the ledger document.
//!
//! The document is JSON-shaped text with one field per line:
//!
//! ```text
//! {
//!   "records": [
//!     {
//!       "hash": "<hex>",
//!       "previousHash": null,
//!       "person": "<escaped canonical text>"
//!     },
//!     ...
//!   ],
//!   "chainHash": "<hex>",
//!   "hmac": "<hex>"
//! }
//! ```
//!
//! Encoding is fully deterministic. Decoding is a tolerant line scan keyed
//! on field labels, not a JSON parser: indentation and surrounding lines do
//! not matter, and a person entry that fails to parse is dropped rather than
//! failing the whole load.

use tracing::{debug, warn};

use hashchain_contracts::{LedgerResult, MacSecret, MalformedRecord, PersonRecord};

use crate::{chain::Chain, digest::mac};

const PERSON_LABEL: &str = "\"person\"";
const HASH_LABEL: &str = "\"hash\"";
const PREVIOUS_HASH_LABEL: &str = "\"previousHash\"";
const CHAIN_HASH_LABEL: &str = "\"chainHash\"";
const HMAC_LABEL: &str = "\"hmac\"";

/// One record entry as found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub person: PersonRecord,
    /// The `hash` value in the same entry, if present.
    pub hash: Option<String>,
    /// The `previousHash` value in the same entry; `None` for `null` or absent.
    pub previous_hash: Option<String>,
}

/// Everything recovered from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLedger {
    pub records: Vec<StoredRecord>,
    pub chain_hash: Option<String>,
    pub hmac: Option<String>,
    /// Person entries dropped because they could not be parsed.
    pub dropped: usize,
}

impl ParsedLedger {
    /// True when the document carried both a chain hash and an HMAC.
    pub fn is_sealed(&self) -> bool {
        self.chain_hash.is_some() && self.hmac.is_some()
    }
}

/// Render `chain` as a complete document sealed with `secret`.
pub fn encode(chain: &Chain, secret: &MacSecret) -> LedgerResult<String> {
    let chain_hash = chain.aggregate_hash();
    let hmac = mac(secret, &chain_hash)?;

    let mut out = String::new();
    out.push_str("{\n");
    out.push_str("  \"records\": [\n");

    let last = chain.len().saturating_sub(1);
    for (index, record) in chain.records().iter().enumerate() {
        out.push_str("    {\n");
        out.push_str(&format!("      \"hash\": \"{}\",\n", escape(record.hash())));
        match record.previous_hash() {
            Some(prev) => out.push_str(&format!("      \"previousHash\": \"{}\",\n", escape(prev))),
            None => out.push_str("      \"previousHash\": null,\n"),
        }
        out.push_str(&format!(
            "      \"person\": \"{}\"\n",
            escape(&record.person().canonical_text())
        ));
        out.push_str("    }");
        if index < last {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("  ],\n");
    out.push_str(&format!("  \"chainHash\": \"{}\",\n", escape(&chain_hash)));
    out.push_str(&format!("  \"hmac\": \"{}\"\n", escape(&hmac)));
    out.push_str("}\n");

    debug!(records = chain.len(), chain_hash = %chain_hash, "encoded ledger document");
    Ok(out)
}

/// Scan `text` for record entries and the seal fields.
///
/// `hash` and `previousHash` lines are attached to the next `person` line.
/// If a field label repeats, the last occurrence wins.
pub fn decode(text: &str) -> ParsedLedger {
    let mut parsed = ParsedLedger::default();
    let mut pending_hash: Option<String> = None;
    let mut pending_previous: Option<String> = None;

    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with(PERSON_LABEL) {
            let hash = pending_hash.take();
            let previous_hash = pending_previous.take();

            let person = field_value(trimmed)
                .ok_or_else(|| MalformedRecord::new("person value is not a quoted string"))
                .and_then(|raw| PersonRecord::parse_canonical(&unescape(raw)));

            match person {
                Ok(person) => parsed.records.push(StoredRecord {
                    person,
                    hash,
                    previous_hash,
                }),
                Err(e) => {
                    warn!(line = line_no + 1, reason = %e.reason, "dropping malformed person record");
                    parsed.dropped += 1;
                }
            }
        } else if trimmed.starts_with(PREVIOUS_HASH_LABEL) {
            pending_previous = field_value(trimmed).map(unescape);
        } else if trimmed.starts_with(HASH_LABEL) {
            pending_hash = field_value(trimmed).map(unescape);
        } else if trimmed.starts_with(CHAIN_HASH_LABEL) {
            parsed.chain_hash = field_value(trimmed).map(unescape);
        } else if trimmed.starts_with(HMAC_LABEL) {
            parsed.hmac = field_value(trimmed).map(unescape);
        }
    }

    debug!(
        records = parsed.records.len(),
        dropped = parsed.dropped,
        sealed = parsed.is_sealed(),
        "decoded ledger document"
    );
    parsed
}

/// The text between the first quote after the label's colon and the last
/// quote on the line. `None` for unquoted values such as `null`.
fn field_value(line: &str) -> Option<&str> {
    let colon = line.find(':')?;
    let open = colon + 1 + line[colon + 1..].find('"')?;
    let close = line.rfind('"')?;
    (close > open).then(|| &line[open + 1..close])
}

/// Escape backslash, double quote, newline, carriage return, and tab.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of `escape`. Unknown escape sequences are kept verbatim.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
