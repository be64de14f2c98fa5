//! Contact message record

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One contact-form submission.
///
/// Field order matters: it is the order the fields appear in the persisted
/// JSON, which existing stored data already uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque unique id, fixed at creation.
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    /// Body text; may span several lines.
    pub message: String,
    /// ISO-8601 creation time, e.g. `2024-03-01T09:30:00.000Z`.
    pub date: String,
}

impl Message {
    /// Build a new message with a fresh id, stamped with the current time.
    pub fn new(name: String, email: String, subject: String, message: String) -> Self {
        Self {
            id: new_message_id(),
            name,
            email,
            subject,
            message,
            date: iso_timestamp(Utc::now()),
        }
    }

    /// Parsed creation time, if `date` is a valid timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.date)
    }
}

/// Generate a message id. Random, so two submissions in the same
/// millisecond still get distinct ids.
pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as
/// midnight UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Human-readable date for listings, e.g. `Jan 05, 2024, 03:04 PM`, in
/// local time. Unparseable input renders as `Invalid Date`.
pub fn format_date(date: &str) -> String {
    match parse_timestamp(date) {
        Some(dt) => format_date_in(dt.with_timezone(&Local)),
        None => "Invalid Date".to_string(),
    }
}

fn format_date_in<Tz: chrono::TimeZone>(dt: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%b %d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Message {
        Message {
            id: "1709285400000".to_string(),
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            subject: "Hi".to_string(),
            message: "Hello there".to_string(),
            date: "2024-03-01T09:30:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_new_message_fields() {
        let msg = Message::new(
            "Jane".to_string(),
            "jane@x.com".to_string(),
            "Hi".to_string(),
            "Hello\nthere".to_string(),
        );
        assert!(!msg.id.is_empty());
        assert_eq!(msg.message, "Hello\nthere");
        assert!(msg.date.ends_with('Z'));
        // 2024-03-01T09:30:00.000Z
        assert_eq!(msg.date.len(), 24);
        assert!(msg.timestamp().is_some());
    }

    #[test]
    fn test_new_ids_are_distinct() {
        let ids: std::collections::HashSet<String> = (0..100).map(|_| new_message_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_iso_timestamp_millis() {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 15, 4, 0).unwrap();
        assert_eq!(iso_timestamp(at), "2024-01-05T15:04:00.000Z");
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let full = parse_timestamp("2024-03-01T09:30:00.000Z").unwrap();
        assert_eq!(full, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());

        let offset = parse_timestamp("2024-03-01T10:30:00+01:00").unwrap();
        assert_eq!(offset, full);

        let day = parse_timestamp("2024-02-01").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_format_date_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 15, 4, 0).unwrap();
        assert_eq!(format_date_in(at), "Jan 05, 2024, 03:04 PM");

        let morning = Utc.with_ymd_and_hms(2023, 11, 30, 0, 7, 0).unwrap();
        assert_eq!(format_date_in(morning), "Nov 30, 2023, 12:07 AM");
    }

    #[test]
    fn test_format_date_invalid() {
        assert_eq!(format_date("not a date"), "Invalid Date");
        assert_ne!(format_date(&sample().date), "Invalid Date");
    }

    #[test]
    fn test_json_field_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1709285400000","name":"Jane","email":"jane@x.com","subject":"Hi","message":"Hello there","date":"2024-03-01T09:30:00.000Z"}"#
        );
    }
}
