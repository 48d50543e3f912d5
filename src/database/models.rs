use super::schema::emails;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use diesel::prelude::*;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters of an email body that appear in its preview
pub const PREVIEW_LENGTH: usize = 100;

/// Avatar glyph used when an email is created without one
pub const DEFAULT_AVATAR: &str = "📧";

/// Local time format of `date_time`, e.g. `2024-02-08 09:30 AM`
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/*
 * An email record as stored in the emails table. The preview is always
 * derived from the body and is rewritten whenever the body changes. The
 * created_at and updated_at columns hold UTC timestamps, while date_time is
 * the creation instant formatted for display in the server's local time.
 */
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = emails)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Email {
    pub id: i32,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_avatar: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub preview: String,
    pub date_time: String,
    pub is_read: bool,
    pub is_archived: bool,
    pub attachments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The caller-supplied fields of a new email
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct EmailDraft {
    pub sender_name: String,
    pub sender_email: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub sender_avatar: Option<String>,
    #[serde(default)]
    pub attachments: Option<String>,
}

impl EmailDraft {
    /// Fill in the server-assigned fields of a draft created at `now`
    pub fn into_new_email(self, now: &DateTime<Utc>) -> NewEmail {
        let timestamp = utc_timestamp(now);
        NewEmail {
            preview: derive_preview(&self.body),
            sender_name: self.sender_name,
            sender_email: self.sender_email,
            sender_avatar: Some(
                self.sender_avatar
                    .unwrap_or_else(|| DEFAULT_AVATAR.to_owned()),
            ),
            recipient: self.recipient,
            subject: self.subject,
            body: self.body,
            date_time: display_time(now),
            is_read: false,
            is_archived: false,
            attachments: self.attachments,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = emails)]
pub struct NewEmail {
    pub sender_name: String,
    pub sender_email: String,
    pub sender_avatar: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub preview: String,
    pub date_time: String,
    pub is_read: bool,
    pub is_archived: bool,
    pub attachments: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A partial update to an email where only the present fields change
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct EmailPatch {
    #[serde(deserialize_with = "optional_flag")]
    pub is_read: Option<bool>,
    #[serde(deserialize_with = "optional_flag")]
    pub is_archived: Option<bool>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

impl EmailPatch {
    /// Return `true` if the patch doesn't change any fields
    pub fn is_empty(&self) -> bool {
        self.is_read.is_none()
            && self.is_archived.is_none()
            && self.subject.is_none()
            && self.body.is_none()
    }

    /// Convert the patch into the column changes to apply at `now`
    /// Returns `None` for an empty patch, which must leave the record untouched.
    pub fn into_changes(self, now: &DateTime<Utc>) -> Option<EmailChanges> {
        if self.is_empty() {
            return None;
        }

        Some(EmailChanges {
            preview: self.body.as_deref().map(derive_preview),
            is_read: self.is_read,
            is_archived: self.is_archived,
            subject: self.subject,
            body: self.body,
            updated_at: utc_timestamp(now),
        })
    }
}

// `None` fields are left out of the generated SET clause
#[derive(Debug, AsChangeset)]
#[diesel(table_name = emails)]
pub struct EmailChanges {
    pub is_read: Option<bool>,
    pub is_archived: Option<bool>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub preview: Option<String>,
    pub updated_at: String,
}

/// Which emails a listing returns
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EmailFilter {
    /// Every email that hasn't been archived
    #[default]
    Inbox,
    /// Emails that are neither read nor archived
    Unread,
    /// Only archived emails
    Archived,
}

/// Derive an email's preview from its body
/// Bodies longer than `PREVIEW_LENGTH` characters are truncated and get an ellipsis.
pub fn derive_preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_LENGTH) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_owned(),
    }
}

/// Format an instant as an ISO-8601 UTC timestamp with a `Z` suffix
pub fn utc_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Format an instant for display in the server's local time zone
pub fn display_time(instant: &DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

/// A boolean that also accepts the spellings HTML forms and query strings use
/// for checkboxes, such as `1`, `on` and `yes`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Flag(pub bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = Flag;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a boolean such as true, false, 1, 0, yes, no, on or off")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Flag, E> {
                Ok(Flag(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Flag, E> {
                match value {
                    0 => Ok(Flag(false)),
                    1 => Ok(Flag(true)),
                    _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
                }
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Flag, E> {
                match value.to_ascii_lowercase().as_str() {
                    "1" | "true" | "t" | "yes" | "y" | "on" => Ok(Flag(true)),
                    "0" | "false" | "f" | "no" | "n" | "off" => Ok(Flag(false)),
                    _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
                }
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

/// Deserialize a boolean field with `Flag`'s spellings
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Flag::deserialize(deserializer).map(|Flag(value)| value)
}

/// Deserialize an optional boolean field with `Flag`'s spellings
pub fn optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    Option::<Flag>::deserialize(deserializer).map(|flag| flag.map(|Flag(value)| value))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, NaiveDateTime, TimeZone};

    use super::*;

    fn draft(body: &str) -> EmailDraft {
        EmailDraft {
            sender_name: "Sarah Anderson".to_owned(),
            sender_email: "sarah.anderson@acme.com".to_owned(),
            recipient: "richard@company.com".to_owned(),
            subject: "Report".to_owned(),
            body: body.to_owned(),
            sender_avatar: None,
            attachments: None,
        }
    }

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 8, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_preview_short_body() {
        assert_eq!(derive_preview("Hello"), "Hello");
        assert_eq!(derive_preview(""), "");
    }

    #[test]
    fn test_preview_exact_length() {
        let body = "a".repeat(PREVIEW_LENGTH);
        assert_eq!(derive_preview(&body), body);
    }

    #[test]
    fn test_preview_long_body() {
        let body = "x".repeat(150);
        assert_eq!(derive_preview(&body), format!("{}...", "x".repeat(100)));
    }

    #[test]
    fn test_preview_multibyte_body() {
        let body = "é".repeat(101);
        let preview = derive_preview(&body);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.starts_with(&"é".repeat(100)));
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_utc_timestamp() {
        assert_eq!(utc_timestamp(&instant()), "2024-02-08T09:30:00.000000Z");
    }

    #[test]
    fn test_into_new_email() {
        let new_email = draft(&"x".repeat(150)).into_new_email(&instant());
        assert_eq!(new_email.sender_avatar.as_deref(), Some(DEFAULT_AVATAR));
        assert_eq!(new_email.preview, format!("{}...", "x".repeat(100)));
        assert!(!new_email.is_read);
        assert!(!new_email.is_archived);
        assert_eq!(new_email.created_at, "2024-02-08T09:30:00.000000Z");
        assert_eq!(new_email.created_at, new_email.updated_at);
        let date_time =
            NaiveDateTime::parse_from_str(&new_email.date_time, DISPLAY_TIME_FORMAT).unwrap();
        assert_eq!(date_time, instant().with_timezone(&Local).naive_local());
    }

    #[test]
    fn test_display_time_format() {
        let format = |hour, min| {
            NaiveDate::from_ymd_opt(2024, 2, 8)
                .unwrap()
                .and_hms_opt(hour, min, 0)
                .unwrap()
                .format(DISPLAY_TIME_FORMAT)
                .to_string()
        };
        assert_eq!(format(9, 30), "2024-02-08 09:30 AM");
        assert_eq!(format(15, 45), "2024-02-08 03:45 PM");
        assert_eq!(format(0, 5), "2024-02-08 12:05 AM");
    }

    #[test]
    fn test_flag_spellings() {
        let parse = |json: &str| serde_json::from_str::<Flag>(json).map(|Flag(value)| value);
        assert_eq!(parse("true").unwrap(), true);
        assert_eq!(parse("false").unwrap(), false);
        assert_eq!(parse("1").unwrap(), true);
        assert_eq!(parse(r#""on""#).unwrap(), true);
        assert_eq!(parse(r#""YES""#).unwrap(), true);
        assert_eq!(parse(r#""0""#).unwrap(), false);
        assert_eq!(parse(r#""off""#).unwrap(), false);
        assert_matches!(parse(r#""maybe""#), Err(_));
        assert_matches!(parse("2"), Err(_));
    }

    #[test]
    fn test_patch_flag_fields() {
        let patch: EmailPatch =
            serde_json::from_str(r#"{ "is_read": "yes", "is_archived": null }"#).unwrap();
        assert_eq!(patch.is_read, Some(true));
        assert_eq!(patch.is_archived, None);
        assert!(serde_json::from_str::<EmailPatch>("{}").unwrap().is_empty());
    }

    #[test]
    fn test_into_new_email_keeps_avatar() {
        let new_email = EmailDraft {
            sender_avatar: Some("🟠".to_owned()),
            attachments: Some("Q1_Report.pdf".to_owned()),
            ..draft("Hi")
        }
        .into_new_email(&instant());
        assert_eq!(new_email.sender_avatar.as_deref(), Some("🟠"));
        assert_eq!(new_email.attachments.as_deref(), Some("Q1_Report.pdf"));
    }

    #[test]
    fn test_empty_patch() {
        let patch = EmailPatch::default();
        assert!(patch.is_empty());
        assert!(patch.into_changes(&instant()).is_none());
    }

    #[test]
    fn test_patch_without_body() {
        let changes = EmailPatch {
            is_read: Some(true),
            ..EmailPatch::default()
        }
        .into_changes(&instant());
        assert_matches!(changes, Some(EmailChanges { is_read: Some(true), is_archived: None, subject: None, body: None, preview: None, updated_at }) => {
            assert_eq!(updated_at, "2024-02-08T09:30:00.000000Z");
        });
    }

    #[test]
    fn test_patch_with_body() {
        let body = "y".repeat(120);
        let changes = EmailPatch {
            body: Some(body.clone()),
            ..EmailPatch::default()
        }
        .into_changes(&instant());
        assert_matches!(changes, Some(EmailChanges { body: Some(new_body), preview: Some(preview), .. }) => {
            assert_eq!(new_body, body);
            assert_eq!(preview, format!("{}...", "y".repeat(100)));
        });
    }
}
