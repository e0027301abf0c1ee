//! Typed shapes of operation results.
//!
//! Field names follow the service's camelCase keys through serde renames.
//! Only operations whose `data` is a nested structure get a type here;
//! scalar results are narrowed directly in [`crate::operations`].

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A session binding an author to a group until a deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "groupID")]
    pub group_id: String,
    #[serde(rename = "authorID")]
    pub author_id: String,
    /// Seconds since the Unix epoch.
    #[serde(rename = "validUntil")]
    pub valid_until: i64,
}

/// One chat line of a pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub time: i64,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
}

/// Attribute pool of a pad. The entries are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributePool {
    #[serde(rename = "numToAttrib")]
    pub num_to_attrib: Map<String, Value>,
    #[serde(rename = "attribToNum")]
    pub attrib_to_num: Map<String, Value>,
    #[serde(rename = "nextNum")]
    pub next_num: u64,
}

/// Result of `createDiffHTML`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHtml {
    pub html: String,
    pub authors: Vec<String>,
}

/// A user currently connected to a pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadUser {
    pub id: String,
    #[serde(rename = "colorId", default)]
    pub color_id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// When a new session stops being valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExpiry {
    /// A fixed deadline.
    At(SystemTime),
    /// A number of hours from the moment the request is built.
    InHours(u32),
}

impl SessionExpiry {
    pub fn deadline(&self) -> SystemTime {
        self.deadline_from(SystemTime::now())
    }

    fn deadline_from(&self, now: SystemTime) -> SystemTime {
        match *self {
            SessionExpiry::At(at) => at,
            SessionExpiry::InHours(hours) => now + Duration::from_secs(u64::from(hours) * 3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::UNIX_EPOCH;

    #[test]
    fn session_info_uses_service_keys() {
        let info: SessionInfo = serde_json::from_value(json!({
            "groupID": "g.8gG2mcJguOEo4std",
            "authorID": "a.kPrLhmVVGK3Y5j03",
            "validUntil": 1550319910
        }))
        .unwrap();
        assert_eq!(info.group_id, "g.8gG2mcJguOEo4std");
        assert_eq!(info.valid_until, 1_550_319_910);
    }

    #[test]
    fn chat_message_without_user_name() {
        let msg: ChatMessage = serde_json::from_value(json!({
            "text": "hi from user1",
            "userId": "a.W3CerL3LH1xgvu3m",
            "time": 1550291109
        }))
        .unwrap();
        assert!(msg.user_name.is_none());
    }

    #[test]
    fn attribute_pool_keeps_entries() {
        let pool: AttributePool = serde_json::from_value(json!({
            "numToAttrib": {"0": ["author", ""], "1": ["removed", "true"]},
            "attribToNum": {"author,": 0, "removed,true": 1},
            "nextNum": 2
        }))
        .unwrap();
        assert_eq!(pool.next_num, 2);
        assert_eq!(pool.num_to_attrib["1"], json!(["removed", "true"]));
    }

    #[test]
    fn expiry_in_hours_adds_to_now() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        assert_eq!(
            SessionExpiry::InHours(2).deadline_from(now),
            UNIX_EPOCH + Duration::from_secs(1_000 + 7_200)
        );
        let fixed = UNIX_EPOCH + Duration::from_secs(42);
        assert_eq!(SessionExpiry::At(fixed).deadline_from(now), fixed);
    }
}
