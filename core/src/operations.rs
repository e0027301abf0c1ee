//! One method per API operation.
//!
//! Each method builds the parameter set for its operation, delegates to
//! [`EtherpadClient::invoke`] and narrows the returned `data` to the shape
//! the operation documents. A shape mismatch fails with
//! `MalformedResponse` instead of guessing.

use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::EtherpadClient;
use crate::error::ApiError;
use crate::params::{ParamValue, ParameterSet};
use crate::transport::Transport;
use crate::types::{AttributePool, ChatMessage, DiffHtml, PadUser, SessionExpiry, SessionInfo};

fn params() -> ParameterSet {
    ParameterSet::new()
}

/// Deserialize `data[key]`.
fn field<D: DeserializeOwned>(data: Value, key: &str) -> Result<D, ApiError> {
    let mut object = match data {
        Value::Object(object) => object,
        other => {
            return Err(ApiError::MalformedResponse(format!(
                "expected an object with `{key}`, got {}",
                type_name(&other)
            )))
        }
    };
    let value = object
        .remove(key)
        .ok_or_else(|| ApiError::MalformedResponse(format!("response data has no `{key}`")))?;
    serde_json::from_value(value).map_err(|e| ApiError::MalformedResponse(format!("`{key}`: {e}")))
}

/// Deserialize `data` as a whole.
fn whole<D: DeserializeOwned>(data: Value) -> Result<D, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

/// Session maps come back as `{sessionID: info}`, or `null` when empty.
fn sessions(data: Value) -> Result<Vec<(String, SessionInfo)>, ApiError> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => map
            .into_iter()
            .map(|(id, info)| whole(info).map(|info| (id, info)))
            .collect(),
        other => Err(ApiError::MalformedResponse(format!(
            "expected a session map, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<T: Transport> EtherpadClient<T> {
    fn call(&self, operation: &str, params: ParameterSet) -> Result<Value, ApiError> {
        self.invoke(operation, &params)
    }

    fn call_unit(&self, operation: &str, params: ParameterSet) -> Result<(), ApiError> {
        self.call(operation, params).map(|_| ())
    }

    // ---------------------------------------------------------------------
    // Groups
    // ---------------------------------------------------------------------

    /// Returns the new group id.
    pub fn create_group(&self) -> Result<String, ApiError> {
        field(self.call("createGroup", params())?, "groupID")
    }

    /// Returns the group mapped to `group_mapper`, creating it if needed.
    pub fn create_group_if_not_exists_for(&self, group_mapper: &str) -> Result<String, ApiError> {
        let p = params().with("groupMapper", group_mapper);
        field(self.call("createGroupIfNotExistsFor", p)?, "groupID")
    }

    pub fn delete_group(&self, group_id: &str) -> Result<(), ApiError> {
        self.call_unit("deleteGroup", params().with("groupID", group_id))
    }

    pub fn list_pads(&self, group_id: &str) -> Result<Vec<String>, ApiError> {
        field(self.call("listPads", params().with("groupID", group_id))?, "padIDs")
    }

    /// Returns the new pad id, `<groupID>$<padName>`.
    pub fn create_group_pad(
        &self,
        group_id: &str,
        pad_name: &str,
        text: Option<&str>,
    ) -> Result<String, ApiError> {
        let p = params()
            .with("groupID", group_id)
            .with("padName", pad_name)
            .with_opt("text", text);
        field(self.call("createGroupPad", p)?, "padID")
    }

    pub fn list_all_groups(&self) -> Result<Vec<String>, ApiError> {
        field(self.call("listAllGroups", params())?, "groupIDs")
    }

    // ---------------------------------------------------------------------
    // Authors
    // ---------------------------------------------------------------------

    /// Returns the new author id. Sent as GET without a name, POST with one.
    pub fn create_author(&self, name: Option<&str>) -> Result<String, ApiError> {
        field(self.call("createAuthor", params().with_opt("name", name))?, "authorID")
    }

    pub fn create_author_if_not_exists_for(
        &self,
        author_mapper: &str,
        name: Option<&str>,
    ) -> Result<String, ApiError> {
        let p = params()
            .with("authorMapper", author_mapper)
            .with_opt("name", name);
        field(self.call("createAuthorIfNotExistsFor", p)?, "authorID")
    }

    pub fn list_pads_of_author(&self, author_id: &str) -> Result<Vec<String>, ApiError> {
        field(self.call("listPadsOfAuthor", params().with("authorID", author_id))?, "padIDs")
    }

    /// The author's display name; `data` is a bare string here.
    pub fn get_author_name(&self, author_id: &str) -> Result<String, ApiError> {
        whole(self.call("getAuthorName", params().with("authorID", author_id))?)
    }

    // ---------------------------------------------------------------------
    // Sessions
    // ---------------------------------------------------------------------

    /// Returns the new session id.
    pub fn create_session(
        &self,
        group_id: &str,
        author_id: &str,
        expiry: SessionExpiry,
    ) -> Result<String, ApiError> {
        let p = params()
            .with("groupID", group_id)
            .with("authorID", author_id)
            .with("validUntil", ParamValue::from(expiry.deadline()));
        field(self.call("createSession", p)?, "sessionID")
    }

    pub fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        self.call_unit("deleteSession", params().with("sessionID", session_id))
    }

    pub fn get_session_info(&self, session_id: &str) -> Result<SessionInfo, ApiError> {
        whole(self.call("getSessionInfo", params().with("sessionID", session_id))?)
    }

    /// Sessions keyed by session id, in the order the service lists them.
    pub fn list_sessions_of_group(&self, group_id: &str) -> Result<Vec<(String, SessionInfo)>, ApiError> {
        sessions(self.call("listSessionsOfGroup", params().with("groupID", group_id))?)
    }

    pub fn list_sessions_of_author(&self, author_id: &str) -> Result<Vec<(String, SessionInfo)>, ApiError> {
        sessions(self.call("listSessionsOfAuthor", params().with("authorID", author_id))?)
    }

    // ---------------------------------------------------------------------
    // Pad content
    // ---------------------------------------------------------------------

    pub fn get_text(&self, pad_id: &str, rev: Option<u32>) -> Result<String, ApiError> {
        let p = params().with("padID", pad_id).with_opt("rev", rev);
        field(self.call("getText", p)?, "text")
    }

    pub fn set_text(&self, pad_id: &str, text: &str) -> Result<(), ApiError> {
        self.call_unit("setText", params().with("padID", pad_id).with("text", text))
    }

    pub fn append_text(&self, pad_id: &str, text: &str) -> Result<(), ApiError> {
        self.call_unit("appendText", params().with("padID", pad_id).with("text", text))
    }

    pub fn get_html(&self, pad_id: &str, rev: Option<u32>) -> Result<String, ApiError> {
        let p = params().with("padID", pad_id).with_opt("rev", rev);
        field(self.call("getHTML", p)?, "html")
    }

    pub fn set_html(&self, pad_id: &str, html: &str) -> Result<(), ApiError> {
        self.call_unit("setHTML", params().with("padID", pad_id).with("html", html))
    }

    pub fn get_attribute_pool(&self, pad_id: &str) -> Result<AttributePool, ApiError> {
        field(self.call("getAttributePool", params().with("padID", pad_id))?, "pool")
    }

    /// The changeset of `rev`, or of the latest revision. Opaque to the
    /// client.
    pub fn get_revision_changeset(&self, pad_id: &str, rev: Option<u32>) -> Result<String, ApiError> {
        let p = params().with("padID", pad_id).with_opt("rev", rev);
        whole(self.call("getRevisionChangeset", p)?)
    }

    pub fn create_diff_html(&self, pad_id: &str, start_rev: u32, end_rev: u32) -> Result<DiffHtml, ApiError> {
        let p = params()
            .with("padID", pad_id)
            .with("startRev", start_rev)
            .with("endRev", end_rev);
        whole(self.call("createDiffHTML", p)?)
    }

    pub fn restore_revision(&self, pad_id: &str, rev: u32) -> Result<(), ApiError> {
        self.call_unit("restoreRevision", params().with("padID", pad_id).with("rev", rev))
    }

    // ---------------------------------------------------------------------
    // Chat
    // ---------------------------------------------------------------------

    /// Whole history, or only the messages in `range` (both ends inclusive).
    pub fn get_chat_history(
        &self,
        pad_id: &str,
        range: Option<RangeInclusive<u32>>,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let (start, end) = match range {
            Some(range) => (Some(*range.start()), Some(*range.end())),
            None => (None, None),
        };
        let p = params()
            .with("padID", pad_id)
            .with_opt("start", start)
            .with_opt("end", end);
        field(self.call("getChatHistory", p)?, "messages")
    }

    pub fn get_chat_head(&self, pad_id: &str) -> Result<i64, ApiError> {
        field(self.call("getChatHead", params().with("padID", pad_id))?, "chatHead")
    }

    /// `time` is seconds since the epoch; the service stamps the message
    /// itself when absent.
    pub fn append_chat_message(
        &self,
        pad_id: &str,
        text: &str,
        author_id: &str,
        time: Option<i64>,
    ) -> Result<(), ApiError> {
        let p = params()
            .with("padID", pad_id)
            .with("text", text)
            .with("authorID", author_id)
            .with_opt("time", time.map(ParamValue::Timestamp));
        self.call_unit("appendChatMessage", p)
    }

    // ---------------------------------------------------------------------
    // Pads
    // ---------------------------------------------------------------------

    pub fn create_pad(&self, pad_id: &str, text: Option<&str>) -> Result<(), ApiError> {
        self.call_unit("createPad", params().with("padID", pad_id).with_opt("text", text))
    }

    pub fn get_revisions_count(&self, pad_id: &str) -> Result<u64, ApiError> {
        field(self.call("getRevisionsCount", params().with("padID", pad_id))?, "revisions")
    }

    pub fn get_saved_revisions_count(&self, pad_id: &str) -> Result<u64, ApiError> {
        field(
            self.call("getSavedRevisionsCount", params().with("padID", pad_id))?,
            "savedRevisions",
        )
    }

    pub fn list_saved_revisions(&self, pad_id: &str) -> Result<Vec<u64>, ApiError> {
        field(
            self.call("listSavedRevisions", params().with("padID", pad_id))?,
            "savedRevisions",
        )
    }

    pub fn save_revision(&self, pad_id: &str, rev: Option<u32>) -> Result<(), ApiError> {
        self.call_unit("saveRevision", params().with("padID", pad_id).with_opt("rev", rev))
    }

    pub fn pad_users_count(&self, pad_id: &str) -> Result<u64, ApiError> {
        field(self.call("padUsersCount", params().with("padID", pad_id))?, "padUsersCount")
    }

    pub fn pad_users(&self, pad_id: &str) -> Result<Vec<PadUser>, ApiError> {
        field(self.call("padUsers", params().with("padID", pad_id))?, "padUsers")
    }

    pub fn delete_pad(&self, pad_id: &str) -> Result<(), ApiError> {
        self.call_unit("deletePad", params().with("padID", pad_id))
    }

    /// Returns the id of the copy.
    pub fn copy_pad(
        &self,
        source_id: &str,
        destination_id: &str,
        force: Option<bool>,
    ) -> Result<String, ApiError> {
        let p = params()
            .with("sourceID", source_id)
            .with("destinationID", destination_id)
            .with_opt("force", force);
        field(self.call("copyPad", p)?, "padID")
    }

    pub fn move_pad(&self, source_id: &str, destination_id: &str, force: Option<bool>) -> Result<(), ApiError> {
        let p = params()
            .with("sourceID", source_id)
            .with("destinationID", destination_id)
            .with_opt("force", force);
        self.call_unit("movePad", p)
    }

    pub fn get_read_only_id(&self, pad_id: &str) -> Result<String, ApiError> {
        field(self.call("getReadOnlyID", params().with("padID", pad_id))?, "readOnlyID")
    }

    pub fn get_pad_id(&self, read_only_id: &str) -> Result<String, ApiError> {
        field(self.call("getPadID", params().with("roID", read_only_id))?, "padID")
    }

    pub fn set_public_status(&self, pad_id: &str, public_status: bool) -> Result<(), ApiError> {
        let p = params().with("padID", pad_id).with("publicStatus", public_status);
        self.call_unit("setPublicStatus", p)
    }

    pub fn get_public_status(&self, pad_id: &str) -> Result<bool, ApiError> {
        field(self.call("getPublicStatus", params().with("padID", pad_id))?, "publicStatus")
    }

    pub fn set_password(&self, pad_id: &str, password: &str) -> Result<(), ApiError> {
        self.call_unit("setPassword", params().with("padID", pad_id).with("password", password))
    }

    pub fn is_password_protected(&self, pad_id: &str) -> Result<bool, ApiError> {
        field(
            self.call("isPasswordProtected", params().with("padID", pad_id))?,
            "isPasswordProtected",
        )
    }

    pub fn list_authors_of_pad(&self, pad_id: &str) -> Result<Vec<String>, ApiError> {
        field(self.call("listAuthorsOfPad", params().with("padID", pad_id))?, "authorIDs")
    }

    /// Milliseconds since the epoch.
    pub fn get_last_edited(&self, pad_id: &str) -> Result<i64, ApiError> {
        field(self.call("getLastEdited", params().with("padID", pad_id))?, "lastEdited")
    }

    pub fn send_clients_message(&self, pad_id: &str, msg: &str) -> Result<(), ApiError> {
        self.call_unit("sendClientsMessage", params().with("padID", pad_id).with("msg", msg))
    }

    // ---------------------------------------------------------------------
    // Misc
    // ---------------------------------------------------------------------

    /// Succeeds when the API key is accepted.
    pub fn check_token(&self) -> Result<(), ApiError> {
        self.call_unit("checkToken", params())
    }

    pub fn list_all_pads(&self) -> Result<Vec<String>, ApiError> {
        field(self.call("listAllPads", params())?, "padIDs")
    }
}
