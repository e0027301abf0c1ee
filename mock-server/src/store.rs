//! In-memory model of groups, pads, authors, sessions and chat.

use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Request parameters in wire order.
pub type Params = [(String, String)];

/// A non-zero envelope answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub code: i64,
    pub message: String,
}

impl Failure {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: 1,
            message: message.into(),
        }
    }

    pub fn no_such_function() -> Self {
        Self {
            code: 3,
            message: "no such function".to_string(),
        }
    }
}

type Outcome = Result<Value, Failure>;

#[derive(Debug, Clone)]
struct ChatLine {
    text: String,
    author_id: String,
    time: i64,
}

#[derive(Debug, Clone)]
struct Pad {
    revisions: Vec<String>,
    saved_revisions: Vec<u64>,
    public: bool,
    password: Option<String>,
    read_only_id: String,
    chat: Vec<ChatLine>,
    last_edited: i64,
}

impl Pad {
    fn new(text: &str) -> Self {
        Self {
            revisions: vec![with_trailing_newline(text)],
            saved_revisions: Vec::new(),
            public: false,
            password: None,
            read_only_id: format!("r.{}", Uuid::new_v4().simple()),
            chat: Vec::new(),
            last_edited: now_millis(),
        }
    }

    fn text(&self) -> &str {
        self.revisions.last().map(String::as_str).unwrap_or("\n")
    }

    fn head(&self) -> u64 {
        self.revisions.len() as u64 - 1
    }

    /// Text of `rev`, or of the head when `rev` is absent.
    fn text_at(&self, rev: Option<i64>) -> Result<&str, Failure> {
        match rev {
            None => Ok(self.text()),
            Some(rev) => usize::try_from(rev)
                .ok()
                .and_then(|rev| self.revisions.get(rev))
                .map(String::as_str)
                .ok_or_else(|| Failure::invalid("rev is higher than the current revision")),
        }
    }

    fn push_revision(&mut self, text: String) {
        self.revisions.push(with_trailing_newline(&text));
        self.last_edited = now_millis();
    }
}

#[derive(Debug, Clone)]
struct Session {
    group_id: String,
    author_id: String,
    valid_until: i64,
}

impl Session {
    fn to_json(&self) -> Value {
        json!({
            "groupID": self.group_id,
            "authorID": self.author_id,
            "validUntil": self.valid_until,
        })
    }
}

/// Everything the mock server remembers between calls.
#[derive(Debug, Default)]
pub struct Store {
    groups: BTreeMap<String, Vec<String>>,
    group_mappers: HashMap<String, String>,
    pads: BTreeMap<String, Pad>,
    authors: BTreeMap<String, Option<String>>,
    author_mappers: HashMap<String, String>,
    sessions: BTreeMap<String, Session>,
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

fn with_trailing_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

/// Render pad text the way the service exports it: escaped, one `<br>`
/// per line break.
fn text_to_html(text: &str) -> String {
    let mut body = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => body.push_str("&amp;"),
            '<' => body.push_str("&lt;"),
            '>' => body.push_str("&gt;"),
            '\n' => body.push_str("<br>"),
            c => body.push(c),
        }
    }
    format!("<!DOCTYPE HTML><html><body>{body}</body></html>")
}

/// Flatten imported markup to text. Line-ending tags become newlines and
/// every other tag is dropped.
fn html_to_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            rest = &rest[open..];
            break;
        };
        let tag = rest[open + 1..open + close]
            .trim()
            .trim_end_matches('/')
            .trim()
            .to_ascii_lowercase();
        if matches!(tag.as_str(), "br" | "/p" | "/div" | "/li") {
            text.push('\n');
        }
        rest = &rest[open + close + 1..];
    }
    text.push_str(rest);
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn short_id(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}.{}", &id[..16])
}

fn get<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn required<'a>(params: &'a Params, name: &str) -> Result<&'a str, Failure> {
    get(params, name).ok_or_else(|| Failure::invalid(format!("{name} is missing")))
}

fn optional_number(params: &Params, name: &str) -> Result<Option<i64>, Failure> {
    match get(params, name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Failure::invalid(format!("{name} is not a number"))),
    }
}

fn flag(params: &Params, name: &str) -> Result<Option<bool>, Failure> {
    match get(params, name) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(Failure::invalid(format!("{name} must be true or false"))),
    }
}

impl Store {
    /// Run one operation against the store.
    pub fn execute(&mut self, operation: &str, params: &Params) -> Outcome {
        match operation {
            "checkToken" => Ok(Value::Null),
            "createGroup" => Ok(json!({ "groupID": self.new_group() })),
            "createGroupIfNotExistsFor" => self.create_group_if_not_exists_for(params),
            "deleteGroup" => self.delete_group(params),
            "listPads" => {
                let group_id = required(params, "groupID")?;
                let pads = self.group(group_id)?;
                Ok(json!({ "padIDs": pads }))
            }
            "createGroupPad" => self.create_group_pad(params),
            "listAllGroups" => Ok(json!({ "groupIDs": self.groups.keys().collect::<Vec<_>>() })),
            "createAuthor" => {
                let id = short_id("a");
                self.authors
                    .insert(id.clone(), get(params, "name").map(str::to_string));
                Ok(json!({ "authorID": id }))
            }
            "createAuthorIfNotExistsFor" => self.create_author_if_not_exists_for(params),
            "getAuthorName" => {
                let author_id = required(params, "authorID")?;
                let name = self
                    .authors
                    .get(author_id)
                    .ok_or_else(|| Failure::invalid("authorID does not exist"))?;
                Ok(json!(name))
            }
            "listPadsOfAuthor" => self.list_pads_of_author(params),
            "createSession" => self.create_session(params),
            "deleteSession" => {
                let session_id = required(params, "sessionID")?;
                self.sessions
                    .remove(session_id)
                    .ok_or_else(|| Failure::invalid("sessionID does not exist"))?;
                Ok(Value::Null)
            }
            "getSessionInfo" => {
                let session_id = required(params, "sessionID")?;
                let session = self
                    .sessions
                    .get(session_id)
                    .ok_or_else(|| Failure::invalid("sessionID does not exist"))?;
                Ok(session.to_json())
            }
            "listSessionsOfGroup" => {
                let group_id = required(params, "groupID")?;
                self.group(group_id)?;
                Ok(self.sessions_where(|s| s.group_id == group_id))
            }
            "listSessionsOfAuthor" => {
                let author_id = required(params, "authorID")?;
                self.author(author_id)?;
                Ok(self.sessions_where(|s| s.author_id == author_id))
            }
            "createPad" => self.create_pad(params),
            "getText" => self.get_text(params),
            "setText" => {
                let text = required(params, "text")?.to_string();
                self.pad_mut(params)?.push_revision(text);
                Ok(Value::Null)
            }
            "appendText" => {
                let text = required(params, "text")?;
                let pad = self.pad_mut(params)?;
                let combined = format!("{}{text}", pad.text());
                pad.push_revision(combined);
                Ok(Value::Null)
            }
            "getHTML" => self.get_html(params),
            "setHTML" => {
                let text = html_to_text(required(params, "html")?);
                self.pad_mut(params)?.push_revision(text);
                Ok(Value::Null)
            }
            "restoreRevision" => self.restore_revision(params),
            "saveRevision" => self.save_revision(params),
            "getSavedRevisionsCount" => Ok(json!({
                "savedRevisions": self.pad(params)?.saved_revisions.len()
            })),
            "listSavedRevisions" => Ok(json!({
                "savedRevisions": self.pad(params)?.saved_revisions
            })),
            "getRevisionsCount" => {
                let pad = self.pad(params)?;
                Ok(json!({ "revisions": pad.head() }))
            }
            "deletePad" => {
                let pad_id = required(params, "padID")?;
                self.remove_pad(pad_id)?;
                Ok(Value::Null)
            }
            "copyPad" => self.copy_pad(params, false),
            "movePad" => self.copy_pad(params, true),
            "getReadOnlyID" => Ok(json!({ "readOnlyID": self.pad(params)?.read_only_id })),
            "getPadID" => {
                let ro_id = required(params, "roID")?;
                let pad_id = self
                    .pads
                    .iter()
                    .find(|(_, pad)| pad.read_only_id == ro_id)
                    .map(|(id, _)| id.clone())
                    .ok_or_else(|| Failure::invalid("padID does not exist"))?;
                Ok(json!({ "padID": pad_id }))
            }
            "setPublicStatus" => {
                let status = flag(params, "publicStatus")?
                    .ok_or_else(|| Failure::invalid("publicStatus is missing"))?;
                self.pad_mut(params)?.public = status;
                Ok(Value::Null)
            }
            "getPublicStatus" => Ok(json!({ "publicStatus": self.pad(params)?.public })),
            "setPassword" => {
                let password = required(params, "password")?.to_string();
                self.pad_mut(params)?.password = Some(password);
                Ok(Value::Null)
            }
            "isPasswordProtected" => Ok(json!({
                "isPasswordProtected": self.pad(params)?.password.is_some()
            })),
            "listAuthorsOfPad" => {
                let pad = self.pad(params)?;
                let mut authors: Vec<&str> = Vec::new();
                for line in &pad.chat {
                    if !authors.contains(&line.author_id.as_str()) {
                        authors.push(&line.author_id);
                    }
                }
                Ok(json!({ "authorIDs": authors }))
            }
            "getLastEdited" => Ok(json!({ "lastEdited": self.pad(params)?.last_edited })),
            "padUsersCount" => {
                self.pad(params)?;
                Ok(json!({ "padUsersCount": 0 }))
            }
            "padUsers" => {
                self.pad(params)?;
                Ok(json!({ "padUsers": [] }))
            }
            "sendClientsMessage" => {
                required(params, "msg")?;
                self.pad(params)?;
                Ok(Value::Null)
            }
            "appendChatMessage" => self.append_chat_message(params),
            "getChatHead" => {
                let pad = self.pad(params)?;
                Ok(json!({ "chatHead": pad.chat.len() as i64 - 1 }))
            }
            "getChatHistory" => self.get_chat_history(params),
            "listAllPads" => Ok(json!({ "padIDs": self.pads.keys().collect::<Vec<_>>() })),
            _ => Err(Failure::no_such_function()),
        }
    }

    fn new_group(&mut self) -> String {
        let id = short_id("g");
        self.groups.insert(id.clone(), Vec::new());
        id
    }

    fn group(&self, group_id: &str) -> Result<&Vec<String>, Failure> {
        self.groups
            .get(group_id)
            .ok_or_else(|| Failure::invalid("groupID does not exist"))
    }

    fn author(&self, author_id: &str) -> Result<&Option<String>, Failure> {
        self.authors
            .get(author_id)
            .ok_or_else(|| Failure::invalid("authorID does not exist"))
    }

    fn pad(&self, params: &Params) -> Result<&Pad, Failure> {
        let pad_id = required(params, "padID")?;
        self.pads
            .get(pad_id)
            .ok_or_else(|| Failure::invalid("padID does not exist"))
    }

    fn pad_mut(&mut self, params: &Params) -> Result<&mut Pad, Failure> {
        let pad_id = required(params, "padID")?;
        self.pads
            .get_mut(pad_id)
            .ok_or_else(|| Failure::invalid("padID does not exist"))
    }

    fn create_group_if_not_exists_for(&mut self, params: &Params) -> Outcome {
        let mapper = required(params, "groupMapper")?;
        if let Some(id) = self.group_mappers.get(mapper) {
            if self.groups.contains_key(id) {
                return Ok(json!({ "groupID": id }));
            }
        }
        let id = self.new_group();
        self.group_mappers.insert(mapper.to_string(), id.clone());
        Ok(json!({ "groupID": id }))
    }

    fn delete_group(&mut self, params: &Params) -> Outcome {
        let group_id = required(params, "groupID")?;
        let pads = self
            .groups
            .remove(group_id)
            .ok_or_else(|| Failure::invalid("groupID does not exist"))?;
        for pad_id in pads {
            self.pads.remove(&pad_id);
        }
        self.sessions.retain(|_, s| s.group_id != group_id);
        self.group_mappers.retain(|_, id| id.as_str() != group_id);
        Ok(Value::Null)
    }

    fn create_group_pad(&mut self, params: &Params) -> Outcome {
        let group_id = required(params, "groupID")?;
        let pad_name = required(params, "padName")?;
        self.group(group_id)?;
        let pad_id = format!("{group_id}${pad_name}");
        if self.pads.contains_key(&pad_id) {
            return Err(Failure::invalid("padName does already exist"));
        }
        let text = get(params, "text").unwrap_or_default();
        self.pads.insert(pad_id.clone(), Pad::new(text));
        if let Some(pads) = self.groups.get_mut(group_id) {
            pads.push(pad_id.clone());
        }
        Ok(json!({ "padID": pad_id }))
    }

    fn create_author_if_not_exists_for(&mut self, params: &Params) -> Outcome {
        let mapper = required(params, "authorMapper")?;
        let name = get(params, "name").map(str::to_string);
        let id = match self.author_mappers.get(mapper) {
            Some(id) => id.clone(),
            None => {
                let id = short_id("a");
                self.author_mappers.insert(mapper.to_string(), id.clone());
                self.authors.insert(id.clone(), None);
                id
            }
        };
        if name.is_some() {
            self.authors.insert(id.clone(), name);
        }
        Ok(json!({ "authorID": id }))
    }

    fn list_pads_of_author(&self, params: &Params) -> Outcome {
        let author_id = required(params, "authorID")?;
        self.author(author_id)?;
        let pads: Vec<&String> = self
            .pads
            .iter()
            .filter(|(_, pad)| pad.chat.iter().any(|line| line.author_id == author_id))
            .map(|(id, _)| id)
            .collect();
        Ok(json!({ "padIDs": pads }))
    }

    fn create_session(&mut self, params: &Params) -> Outcome {
        let group_id = required(params, "groupID")?.to_string();
        let author_id = required(params, "authorID")?.to_string();
        let valid_until = optional_number(params, "validUntil")?
            .ok_or_else(|| Failure::invalid("validUntil is missing"))?;
        self.group(&group_id)?;
        self.author(&author_id)?;
        if valid_until < now_secs() {
            return Err(Failure::invalid("validUntil is in the past"));
        }
        let id = format!("s.{}", Uuid::new_v4().simple());
        self.sessions.insert(
            id.clone(),
            Session {
                group_id,
                author_id,
                valid_until,
            },
        );
        Ok(json!({ "sessionID": id }))
    }

    /// The service answers `null` instead of an empty map.
    fn sessions_where(&self, keep: impl Fn(&Session) -> bool) -> Value {
        let map: Map<String, Value> = self
            .sessions
            .iter()
            .filter(|(_, s)| keep(s))
            .map(|(id, s)| (id.clone(), s.to_json()))
            .collect();
        if map.is_empty() {
            Value::Null
        } else {
            Value::Object(map)
        }
    }

    fn create_pad(&mut self, params: &Params) -> Outcome {
        let pad_id = required(params, "padID")?;
        if pad_id.contains('$') {
            return Err(Failure::invalid("createPad can't create group pads"));
        }
        if self.pads.contains_key(pad_id) {
            return Err(Failure::invalid("padID does already exist"));
        }
        let text = get(params, "text").unwrap_or_default();
        self.pads.insert(pad_id.to_string(), Pad::new(text));
        Ok(Value::Null)
    }

    fn get_text(&self, params: &Params) -> Outcome {
        let pad = self.pad(params)?;
        let text = pad.text_at(optional_number(params, "rev")?)?;
        Ok(json!({ "text": text }))
    }

    fn get_html(&self, params: &Params) -> Outcome {
        let pad = self.pad(params)?;
        let text = pad.text_at(optional_number(params, "rev")?)?;
        Ok(json!({ "html": text_to_html(text) }))
    }

    fn restore_revision(&mut self, params: &Params) -> Outcome {
        let rev = optional_number(params, "rev")?.ok_or_else(|| Failure::invalid("rev is missing"))?;
        let pad = self.pad_mut(params)?;
        let text = pad.text_at(Some(rev))?.to_string();
        pad.push_revision(text);
        Ok(Value::Null)
    }

    fn save_revision(&mut self, params: &Params) -> Outcome {
        let rev = optional_number(params, "rev")?;
        let pad = self.pad_mut(params)?;
        let rev = match rev {
            None => pad.head(),
            Some(rev) => u64::try_from(rev)
                .ok()
                .filter(|rev| *rev <= pad.head())
                .ok_or_else(|| Failure::invalid("rev is higher than the current revision"))?,
        };
        pad.saved_revisions.push(rev);
        Ok(Value::Null)
    }

    fn remove_pad(&mut self, pad_id: &str) -> Result<Pad, Failure> {
        let pad = self
            .pads
            .remove(pad_id)
            .ok_or_else(|| Failure::invalid("padID does not exist"))?;
        for pads in self.groups.values_mut() {
            pads.retain(|id| id != pad_id);
        }
        Ok(pad)
    }

    fn copy_pad(&mut self, params: &Params, remove_source: bool) -> Outcome {
        let source_id = required(params, "sourceID")?;
        let destination_id = required(params, "destinationID")?;
        let force = flag(params, "force")?.unwrap_or(false);
        let source = self
            .pads
            .get(source_id)
            .cloned()
            .ok_or_else(|| Failure::invalid("padID does not exist"))?;
        if self.pads.contains_key(destination_id) {
            if !force {
                return Err(Failure::invalid("destinationID already exists"));
            }
            self.remove_pad(destination_id)?;
        }
        if remove_source {
            self.remove_pad(source_id)?;
        }
        let mut copy = source;
        copy.read_only_id = format!("r.{}", Uuid::new_v4().simple());
        self.pads.insert(destination_id.to_string(), copy);
        if let Some((group_id, _)) = destination_id.split_once('$') {
            if let Some(pads) = self.groups.get_mut(group_id) {
                pads.push(destination_id.to_string());
            }
        }
        if remove_source {
            Ok(Value::Null)
        } else {
            Ok(json!({ "padID": destination_id }))
        }
    }

    fn append_chat_message(&mut self, params: &Params) -> Outcome {
        let text = required(params, "text")?.to_string();
        let author_id = required(params, "authorID")?.to_string();
        let time = optional_number(params, "time")?.unwrap_or_else(now_secs);
        self.author(&author_id)?;
        self.pad_mut(params)?.chat.push(ChatLine {
            text,
            author_id,
            time,
        });
        Ok(Value::Null)
    }

    fn get_chat_history(&self, params: &Params) -> Outcome {
        let pad = self.pad(params)?;
        let start = optional_number(params, "start")?;
        let end = optional_number(params, "end")?;
        let lines: &[ChatLine] = match (start, end) {
            (None, None) => &pad.chat,
            (Some(start), Some(end)) => {
                let len = pad.chat.len() as i64;
                if start < 0 || end < start || end >= len {
                    return Err(Failure::invalid("start/end is out of range"));
                }
                &pad.chat[start as usize..=end as usize]
            }
            _ => return Err(Failure::invalid("start and end must be given together")),
        };
        let messages: Vec<Value> = lines
            .iter()
            .map(|line| {
                json!({
                    "text": line.text,
                    "userId": line.author_id,
                    "time": line.time,
                    "userName": self.authors.get(&line.author_id).cloned().flatten(),
                })
            })
            .collect();
        Ok(json!({ "messages": messages }))
    }
}
