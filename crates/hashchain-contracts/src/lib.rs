//! # hashchain-contracts
//!
//! Shared types and errors for the hashchain ledger.
//!
//! All crates in the workspace import from here. No chain or storage logic
//! lives in this crate, only the person record model, its canonical text
//! grammar, the MAC secret wrapper, and the error taxonomy.

pub mod error;
pub mod person;
pub mod secret;

pub use error::{LedgerError, LedgerResult, MalformedRecord};
pub use person::{FingerprintMark, MarkKind, PersonRecord};
pub use secret::MacSecret;

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ivanov() -> PersonRecord {
        PersonRecord::new(
            "Ivan",
            "Ivanov",
            "Ivanovich",
            date(1990, 5, 17),
            FingerprintMark::new(12, -4, MarkKind::Core, 87),
        )
    }

    // ── Canonical text ───────────────────────────────────────────────────────

    #[test]
    fn canonical_text_layout() {
        assert_eq!(
            ivanov().canonical_text(),
            "Ivan Ivanovich Ivanov 1990-05-17 Fingerprint[x=12, y=-4, type=CORE, quality=87]"
        );
    }

    #[test]
    fn canonical_text_pads_date_fields() {
        let mut person = ivanov();
        person.birth_date = date(987, 1, 2);
        assert!(person.canonical_text().contains(" 0987-01-02 "));
    }

    #[test]
    fn parse_canonical_inverts_rendering() {
        let person = ivanov();
        let parsed = PersonRecord::parse_canonical(&person.canonical_text()).unwrap();
        assert_eq!(parsed, person);
    }

    #[test]
    fn full_name_is_last_first_patronymic() {
        assert_eq!(ivanov().full_name(), "Ivanov Ivan Ivanovich");
    }

    // ── Malformed canonical text ─────────────────────────────────────────────

    #[test]
    fn parse_rejects_missing_mark() {
        let err = PersonRecord::parse_canonical("Ivan Ivanovich Ivanov 1990-05-17").unwrap_err();
        assert!(err.reason.contains("no fingerprint mark"));
    }

    #[test]
    fn parse_rejects_unclosed_mark() {
        let text = "Ivan Ivanovich Ivanov 1990-05-17 Fingerprint[x=1, y=2, type=CORE, quality=3";
        assert!(PersonRecord::parse_canonical(text).is_err());
    }

    #[test]
    fn parse_rejects_bad_date() {
        let text = "Ivan Ivanovich Ivanov 1990-13-40 Fingerprint[x=1, y=2, type=CORE, quality=3]";
        let err = PersonRecord::parse_canonical(text).unwrap_err();
        assert!(err.reason.contains("birth date"), "unexpected reason: {}", err.reason);
    }

    #[test]
    fn parse_rejects_bad_integer() {
        let text = "Ivan Ivanovich Ivanov 1990-05-17 Fingerprint[x=one, y=2, type=CORE, quality=3]";
        let err = PersonRecord::parse_canonical(text).unwrap_err();
        assert!(err.reason.contains("'x'"), "unexpected reason: {}", err.reason);
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let text = "Ivan Ivanovich Ivanov 1990-05-17 Fingerprint[x=1, y=2, type=LOOP, quality=3]";
        let err = PersonRecord::parse_canonical(text).unwrap_err();
        assert!(err.reason.contains("LOOP"));
    }

    #[test]
    fn parse_rejects_lowercase_kind() {
        let text = "Ivan Ivanovich Ivanov 1990-05-17 Fingerprint[x=1, y=2, type=core, quality=3]";
        assert!(PersonRecord::parse_canonical(text).is_err());
    }

    #[test]
    fn parse_rejects_missing_and_repeated_fields() {
        let missing = "Ivan Ivanovich Ivanov 1990-05-17 Fingerprint[x=1, y=2, type=CORE]";
        let err = PersonRecord::parse_canonical(missing).unwrap_err();
        assert!(err.reason.contains("quality"));

        let repeated = "Ivan Ivanovich Ivanov 1990-05-17 Fingerprint[x=1, x=2, type=CORE, quality=3]";
        let err = PersonRecord::parse_canonical(repeated).unwrap_err();
        assert!(err.reason.contains("repeated"));
    }

    #[test]
    fn parse_rejects_wrong_person_token_count() {
        let text = "Ivan Ivanov 1990-05-17 Fingerprint[x=1, y=2, type=CORE, quality=3]";
        let err = PersonRecord::parse_canonical(text).unwrap_err();
        assert!(err.reason.contains("expected 4 person fields"));

        let doubled_space = "Ivan  Ivanovich Ivanov 1990-05-17 Fingerprint[x=1, y=2, type=CORE, quality=3]";
        assert!(PersonRecord::parse_canonical(doubled_space).is_err());
    }

    #[test]
    fn ensure_readable_accepts_plain_record() {
        assert_eq!(ivanov().ensure_readable(), Ok(()));
    }

    #[test]
    fn ensure_readable_rejects_names_that_break_the_grammar() {
        let mut spaced = ivanov();
        spaced.first_name = "Ivan Petr".to_string();
        assert!(spaced.ensure_readable().is_err());

        let mut marker = ivanov();
        marker.last_name = "Fingerprint[".to_string();
        assert!(marker.ensure_readable().is_err());

        let mut empty = ivanov();
        empty.patronymic = String::new();
        assert!(empty.ensure_readable().is_err());
    }

    // ── MarkKind ─────────────────────────────────────────────────────────────

    #[test]
    fn mark_kind_names_and_labels() {
        for kind in MarkKind::ALL {
            assert_eq!(kind.name().parse::<MarkKind>().unwrap(), kind);
        }
        assert_eq!(MarkKind::Delta.label(), "Delta");
        assert_eq!(MarkKind::Point.to_string(), "POINT");
    }

    #[test]
    fn mark_kind_serializes_as_enum_name() {
        let json = serde_json::to_string(&MarkKind::Point).unwrap();
        assert_eq!(json, "\"POINT\"");
    }

    // ── MacSecret ────────────────────────────────────────────────────────────

    #[test]
    fn secret_debug_is_redacted() {
        let secret = MacSecret::from("top-secret-key");
        let shown = format!("{:?}", secret);
        assert!(!shown.contains("top-secret-key"));
        assert!(shown.contains("14 bytes"));
    }

    // ── LedgerError display messages ─────────────────────────────────────────

    #[test]
    fn error_corruption_display() {
        let err = LedgerError::Corruption {
            stored: "aa".to_string(),
            computed: "bb".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("chain hash mismatch"));
        assert!(msg.contains("aa") && msg.contains("bb"));
        assert!(err.is_integrity_fault());
    }

    #[test]
    fn error_deletion_rejected_display() {
        let err = LedgerError::DeletionRejected {
            index: 0,
            before: "b4".to_string(),
            after: "af".to_string(),
            expected: "ex".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("record 0"));
        assert!(msg.contains("b4") && msg.contains("af") && msg.contains("ex"));
        assert!(!err.is_integrity_fault());
    }

    #[test]
    fn error_forgery_is_integrity_fault() {
        assert!(LedgerError::Forgery.is_integrity_fault());
        assert!(LedgerError::Forgery.to_string().contains("HMAC"));
    }

    #[test]
    fn error_io_display() {
        let err = LedgerError::Io {
            path: "hashchain.json".to_string(),
            reason: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("hashchain.json"));
        assert!(msg.contains("disk full"));
        assert!(!err.is_integrity_fault());
    }
}
