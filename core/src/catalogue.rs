//! The table of operations the client knows, and verb selection.
//!
//! # Design
//! Each entry lists the operation's required and optional parameters and
//! whether it changes server state. Mutating operations go out as POST with
//! a form body; everything else is GET with a query string. The table is the
//! only input to that decision, with one exception: `createAuthor` has two
//! call shapes and is POST only when a `name` is supplied.

use crate::http::HttpMethod;
use crate::params::ParameterSet;

/// Default API version segment of the request path.
pub const DEFAULT_API_VERSION: &str = "1.2.13";

/// One remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub mutating: bool,
}

impl OperationDescriptor {
    /// First required parameter absent from `params`, if any.
    pub fn missing_parameter(&self, params: &ParameterSet) -> Option<&'static str> {
        self.required.iter().copied().find(|name| !params.contains(name))
    }

    pub fn accepts(&self, param: &str) -> bool {
        self.required
            .iter()
            .chain(self.optional.iter())
            .any(|name| *name == param)
    }
}

const fn op(
    name: &'static str,
    required: &'static [&'static str],
    optional: &'static [&'static str],
    mutating: bool,
) -> OperationDescriptor {
    OperationDescriptor {
        name,
        required,
        optional,
        mutating,
    }
}

const READ: bool = false;
const WRITE: bool = true;

/// Operation whose verb depends on the presence of [`CREATE_AUTHOR_NAME`].
pub const CREATE_AUTHOR: &str = "createAuthor";
const CREATE_AUTHOR_NAME: &str = "name";

pub static CATALOGUE: &[OperationDescriptor] = &[
    // groups
    op("createGroup", &[], &[], WRITE),
    op("createGroupIfNotExistsFor", &["groupMapper"], &[], WRITE),
    op("deleteGroup", &["groupID"], &[], WRITE),
    op("listPads", &["groupID"], &[], READ),
    op("createGroupPad", &["groupID", "padName"], &["text"], WRITE),
    op("listAllGroups", &[], &[], READ),
    // authors
    op(CREATE_AUTHOR, &[], &[CREATE_AUTHOR_NAME], READ),
    op("createAuthorIfNotExistsFor", &["authorMapper"], &["name"], WRITE),
    op("listPadsOfAuthor", &["authorID"], &[], READ),
    op("getAuthorName", &["authorID"], &[], READ),
    // sessions
    op("createSession", &["groupID", "authorID", "validUntil"], &[], WRITE),
    op("deleteSession", &["sessionID"], &[], WRITE),
    op("getSessionInfo", &["sessionID"], &[], READ),
    op("listSessionsOfGroup", &["groupID"], &[], READ),
    op("listSessionsOfAuthor", &["authorID"], &[], READ),
    // pad content
    op("getText", &["padID"], &["rev"], READ),
    op("setText", &["padID", "text"], &[], WRITE),
    op("appendText", &["padID", "text"], &[], WRITE),
    op("getHTML", &["padID"], &["rev"], READ),
    op("setHTML", &["padID", "html"], &[], WRITE),
    op("getAttributePool", &["padID"], &[], READ),
    op("getRevisionChangeset", &["padID"], &["rev"], READ),
    op("createDiffHTML", &["padID", "startRev", "endRev"], &[], READ),
    op("restoreRevision", &["padID", "rev"], &[], WRITE),
    // chat
    op("getChatHistory", &["padID"], &["start", "end"], READ),
    op("getChatHead", &["padID"], &[], READ),
    op("appendChatMessage", &["padID", "text", "authorID"], &["time"], WRITE),
    // pads
    op("createPad", &["padID"], &["text"], WRITE),
    op("getRevisionsCount", &["padID"], &[], READ),
    op("getSavedRevisionsCount", &["padID"], &[], READ),
    op("listSavedRevisions", &["padID"], &[], READ),
    op("saveRevision", &["padID"], &["rev"], WRITE),
    op("padUsersCount", &["padID"], &[], READ),
    op("padUsers", &["padID"], &[], READ),
    op("deletePad", &["padID"], &[], WRITE),
    op("copyPad", &["sourceID", "destinationID"], &["force"], WRITE),
    op("movePad", &["sourceID", "destinationID"], &["force"], WRITE),
    op("getReadOnlyID", &["padID"], &[], READ),
    op("getPadID", &["roID"], &[], READ),
    op("setPublicStatus", &["padID", "publicStatus"], &[], WRITE),
    op("getPublicStatus", &["padID"], &[], READ),
    op("setPassword", &["padID", "password"], &[], WRITE),
    op("isPasswordProtected", &["padID"], &[], READ),
    op("listAuthorsOfPad", &["padID"], &[], READ),
    op("getLastEdited", &["padID"], &[], READ),
    op("sendClientsMessage", &["padID", "msg"], &[], WRITE),
    // misc
    op("checkToken", &[], &[], READ),
    op("listAllPads", &[], &[], READ),
];

/// Look up an operation by its exact wire name.
pub fn lookup(name: &str) -> Option<&'static OperationDescriptor> {
    CATALOGUE.iter().find(|d| d.name == name)
}

/// Select the HTTP verb for a call.
pub fn classify(descriptor: &OperationDescriptor, params: &ParameterSet) -> HttpMethod {
    let mutating = if descriptor.name == CREATE_AUTHOR {
        params.contains(CREATE_AUTHOR_NAME)
    } else {
        descriptor.mutating
    };
    if mutating {
        HttpMethod::Post
    } else {
        HttpMethod::Get
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MUTATING: &[&str] = &[
        "appendChatMessage",
        "appendText",
        "copyPad",
        "createAuthorIfNotExistsFor",
        "createGroup",
        "createGroupIfNotExistsFor",
        "createGroupPad",
        "createPad",
        "createSession",
        "deleteGroup",
        "deletePad",
        "deleteSession",
        "movePad",
        "restoreRevision",
        "saveRevision",
        "sendClientsMessage",
        "setHTML",
        "setPassword",
        "setPublicStatus",
        "setText",
    ];

    #[test]
    fn mutating_operations_are_post() {
        for name in MUTATING {
            let d = lookup(name).unwrap_or_else(|| panic!("{name} missing from catalogue"));
            assert_eq!(classify(d, &ParameterSet::new()), HttpMethod::Post, "{name}");
        }
    }

    #[test]
    fn everything_else_is_get() {
        for d in CATALOGUE {
            if MUTATING.contains(&d.name) || d.name == CREATE_AUTHOR {
                continue;
            }
            assert_eq!(classify(d, &ParameterSet::new()), HttpMethod::Get, "{}", d.name);
        }
    }

    #[test]
    fn create_author_depends_on_name() {
        let d = lookup(CREATE_AUTHOR).unwrap();
        assert_eq!(classify(d, &ParameterSet::new()), HttpMethod::Get);
        let named = ParameterSet::new().with("name", "integration-author");
        assert_eq!(classify(d, &named), HttpMethod::Post);
    }

    #[test]
    fn names_are_unique() {
        for (i, d) in CATALOGUE.iter().enumerate() {
            assert!(
                CATALOGUE[i + 1..].iter().all(|other| other.name != d.name),
                "duplicate {}",
                d.name
            );
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("getText").is_some());
        assert!(lookup("gettext").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn missing_parameter_reports_first_gap() {
        let d = lookup("createSession").unwrap();
        let params = ParameterSet::new().with("groupID", "g.1");
        assert_eq!(d.missing_parameter(&params), Some("authorID"));
        let full = params.with("authorID", "a.1").with("validUntil", 1i64);
        assert_eq!(d.missing_parameter(&full), None);
    }

    #[test]
    fn accepts_declared_parameters() {
        let d = lookup("getChatHistory").unwrap();
        assert!(d.accepts("padID"));
        assert!(d.accepts("end"));
        assert!(!d.accepts("rev"));
    }
}
