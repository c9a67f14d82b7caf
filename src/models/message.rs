use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Inbound contact-form message. Replies go out through the mailer.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub body: String,
    pub replied: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub name: String,
    pub email: String,
    pub body: String,
}
