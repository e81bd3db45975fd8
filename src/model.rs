//! Wire types for the catalog backend.
//!
//! These mirror the JSON the backend emits. Domain views (catalog rows, resolved entities,
//! graph presentation) are built from them in their own modules.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::error::CatalogError;

/// Fallback label for a reference whose target cannot be named.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Returns the fragment identifier of a URI (`http://example.org/library#b2` -> `b2`), or the
/// whole string when it has no fragment.
pub fn id_from_uri(uri: &str) -> &str {
    match uri.rsplit_once('#') {
        Some((_, fragment)) => fragment,
        None => uri,
    }
}

/// Entity kinds the viewer can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Book,
    Author,
    Publisher,
    Genre,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Book,
        EntityType::Author,
        EntityType::Publisher,
        EntityType::Genre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Book => "Book",
            EntityType::Author => "Author",
            EntityType::Publisher => "Publisher",
            EntityType::Genre => "Genre",
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CatalogError::NotFound(format!("unknown entity type '{s}'")))
    }
}

/// `{id, name}` pair the backend embeds for a referenced entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One book as returned by `/api/books`.
///
/// Borrower fields are only meaningful while `borrowed` is set; see
/// [`crate::catalog::Availability`] for the typed view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: EntityRef,
    #[serde(default)]
    pub publisher: EntityRef,
    #[serde(default)]
    pub genre: EntityRef,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub borrowed: bool,
    #[serde(default)]
    pub borrower_name: String,
    #[serde(default)]
    pub borrower_type: String,
    #[serde(default)]
    pub borrow_date: String,
    #[serde(default)]
    pub return_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

/// A property value from `/api/entity`: either a literal or a named reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Reference(EntityRef),
    Scalar(String),
}

/// Pre-resolved entity from `/api/entity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub book_id: String,
    pub borrower_name: String,
    pub borrower_type: String,
    pub borrow_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub book_id: String,
}

/// Acknowledgement body of the state-changing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionResponse {
    #[serde(default)]
    pub description: Option<String>,
}

/// The three success shapes of `/api/sparql`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SparqlResponse {
    Select {
        variables: Vec<String>,
        #[serde(default)]
        results: Vec<BTreeMap<String, serde_json::Value>>,
    },
    Ask {
        boolean: bool,
    },
    Message {
        message: String,
    },
}
