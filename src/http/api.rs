use crate::database::{flag, Email, EmailFilter};
use serde::{Deserialize, Serialize};

/// Query string accepted by `GET /emails`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    #[serde(deserialize_with = "flag")]
    pub unread_only: bool,
    #[serde(deserialize_with = "flag")]
    pub archived_only: bool,
}

impl From<ListQuery> for EmailFilter {
    // `unread_only` wins when both flags are set
    fn from(query: ListQuery) -> Self {
        if query.unread_only {
            Self::Unread
        } else if query.archived_only {
            Self::Archived
        } else {
            Self::Inbox
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EmailList {
    pub emails: Vec<Email>,
    pub count: usize,
}

impl From<Vec<Email>> for EmailList {
    fn from(emails: Vec<Email>) -> Self {
        Self {
            count: emails.len(),
            emails,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Confirmation {
    pub message: String,
}
