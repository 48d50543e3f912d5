use super::models::{Email, EmailFilter, EmailPatch, NewEmail};
use super::schema::emails;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

/// Load the emails matching a filter, newest first
pub fn list_emails(conn: &mut SqliteConnection, filter: EmailFilter) -> QueryResult<Vec<Email>> {
    let query = emails::table
        .select(Email::as_select())
        .order((emails::created_at.desc(), emails::id.desc()))
        .into_boxed();
    let query = match filter {
        EmailFilter::Inbox => query.filter(emails::is_archived.eq(false)),
        EmailFilter::Unread => query
            .filter(emails::is_read.eq(false))
            .filter(emails::is_archived.eq(false)),
        EmailFilter::Archived => query.filter(emails::is_archived.eq(true)),
    };
    query.load(conn)
}

/// Load a single email by its id
pub fn get_email(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Email>> {
    emails::table
        .find(id)
        .select(Email::as_select())
        .first(conn)
        .optional()
}

/// Insert a new email and return it with its assigned id
pub fn insert_email(conn: &mut SqliteConnection, new_email: &NewEmail) -> QueryResult<Email> {
    diesel::insert_into(emails::table)
        .values(new_email)
        .returning(Email::as_returning())
        .get_result(conn)
}

/// Apply a patch to an existing email and return the resulting record
/// An empty patch leaves the record, including its `updated_at` timestamp, untouched.
pub fn update_email(
    conn: &mut SqliteConnection,
    id: i32,
    patch: EmailPatch,
    now: &DateTime<Utc>,
) -> QueryResult<Option<Email>> {
    let Some(changes) = patch.into_changes(now) else {
        return get_email(conn, id);
    };

    diesel::update(emails::table.find(id))
        .set(&changes)
        .returning(Email::as_returning())
        .get_result(conn)
        .optional()
}

/// Permanently delete an email, returning `true` if it existed
pub fn delete_email(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    let deleted = diesel::delete(emails::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}
