//! Entity resolution for the detail viewer.
//!
//! The backend returns entities with referenced names already embedded, so resolving is one
//! request plus a pure transformation: each property becomes either text or a link to another
//! entity. Which properties are links is decided by [`property_entity_type`].

use crate::{
    api::{ApiClient, ApiTransport},
    error::CatalogError,
    html::{escape, ViewerLink},
    model::{id_from_uri, Entity, EntityType, PropertyValue, UNKNOWN_LABEL},
};

/// Properties that can carry the entity's display name, in order of preference.
pub const NAME_PROPERTIES: [&str; 3] = ["HAS_NAME", "Title", "Name"];

/// Entity type a property points at. Unlisted properties are not navigable.
pub fn property_entity_type(property: &str) -> Option<EntityType> {
    match property {
        "HAS_AUTHOR" => Some(EntityType::Author),
        "HAS_PUBLISHER" => Some(EntityType::Publisher),
        "HAS_GENRE" => Some(EntityType::Genre),
        "HAS_BOOK" | "CONTAINS" => Some(EntityType::Book),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Link { target: ViewerLink, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn to_html(&self) -> String {
        let value = match &self.value {
            AttributeValue::Text(text) => escape(text),
            AttributeValue::Link { target, label } => target.anchor(label),
        };
        format!("<li><strong>{}:</strong> {}</li>", escape(&self.name), value)
    }
}

/// Display-ready form of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityView {
    pub entity_type: EntityType,
    pub id: String,
    /// Used as the key for the description lookup. Empty when the entity has no name property.
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl EntityView {
    pub fn links(&self) -> impl Iterator<Item = (&ViewerLink, &str)> {
        self.attributes.iter().filter_map(|a| match &a.value {
            AttributeValue::Link { target, label } => Some((target, label.as_str())),
            AttributeValue::Text(_) => None,
        })
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<h1>{} Details</h1><ul>", self.entity_type);
        for attribute in &self.attributes {
            html.push_str(&attribute.to_html());
        }
        html.push_str("</ul>");
        html.push_str("<a href=\"/\" class=\"back-link\">&larr; Back to Catalog</a>");
        html
    }
}

fn label_or_unknown(name: &str) -> String {
    if name.trim().is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        name.to_string()
    }
}

fn resolve_property(name: &str, value: &PropertyValue) -> AttributeValue {
    match (property_entity_type(name), value) {
        (Some(entity_type), PropertyValue::Reference(reference)) => AttributeValue::Link {
            target: ViewerLink::new(entity_type, id_from_uri(&reference.id)),
            label: label_or_unknown(&reference.name),
        },
        // The backend could not name the target; it sent the bare URI.
        (Some(entity_type), PropertyValue::Scalar(uri)) => AttributeValue::Link {
            target: ViewerLink::new(entity_type, id_from_uri(uri)),
            label: UNKNOWN_LABEL.to_string(),
        },
        (None, PropertyValue::Reference(reference)) => {
            AttributeValue::Text(label_or_unknown(&reference.name))
        }
        (None, PropertyValue::Scalar(text)) => AttributeValue::Text(text.clone()),
    }
}

/// Turns a fetched entity into its display form. Never fails: unnamed references fall back to
/// [`UNKNOWN_LABEL`].
pub fn resolve(entity_type: EntityType, entity: &Entity) -> EntityView {
    let name = NAME_PROPERTIES
        .iter()
        .find_map(|key| match entity.properties.get(*key) {
            Some(PropertyValue::Scalar(name)) if !name.is_empty() => Some(name.clone()),
            _ => None,
        })
        .unwrap_or_default();
    let attributes = entity
        .properties
        .iter()
        .map(|(name, value)| Attribute {
            name: name.clone(),
            value: resolve_property(name, value),
        })
        .collect();
    EntityView {
        entity_type,
        id: entity.id.clone(),
        name,
        attributes,
    }
}

pub struct EntityResolver<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: ApiTransport> EntityResolver<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        EntityResolver { client }
    }

    /// Fetches and resolves one entity. This single request decides success or failure.
    pub async fn load(&self, entity_type: EntityType, id: &str) -> Result<EntityView, CatalogError> {
        let entity = self.client.entity(entity_type, id).await?;
        Ok(resolve(entity_type, &entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::EntityRef, tests::helpers::entity};
    use test_log::test;

    #[test]
    fn test_reference_becomes_link() {
        let book = entity(
            "Book",
            "http://example.org/library#b1",
            vec![
                ("HAS_NAME", PropertyValue::Scalar("Dune".into())),
                (
                    "HAS_AUTHOR",
                    PropertyValue::Reference(EntityRef {
                        id: "a1#5".into(),
                        name: "Jane".into(),
                    }),
                ),
            ],
        );
        let view = resolve(EntityType::Book, &book);
        assert_eq!(view.name, "Dune");
        let links: Vec<_> = view.links().collect();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].0, &ViewerLink::new(EntityType::Author, "5"));
        assert_eq!(links[0].1, "Jane");
    }

    #[test]
    fn test_scalars_only() {
        let genre = entity(
            "Genre",
            "http://example.org/library#g1",
            vec![
                ("HAS_NAME", PropertyValue::Scalar("Science Fiction".into())),
                ("state", PropertyValue::Scalar("Active".into())),
            ],
        );
        let view = resolve(EntityType::Genre, &genre);
        assert_eq!(view.links().count(), 0);
        assert!(view
            .attributes
            .iter()
            .all(|a| matches!(a.value, AttributeValue::Text(_))));
    }

    #[test]
    fn test_unresolvable_reference_falls_back() {
        let book = entity(
            "Book",
            "b1",
            vec![
                (
                    "HAS_PUBLISHER",
                    PropertyValue::Scalar("http://example.org/library#p404".into()),
                ),
                (
                    "HAS_GENRE",
                    PropertyValue::Reference(EntityRef {
                        id: "http://example.org/library#g1".into(),
                        name: String::new(),
                    }),
                ),
            ],
        );
        let view = resolve(EntityType::Book, &book);
        let links: Vec<_> = view.links().collect();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|(_, label)| *label == UNKNOWN_LABEL));
        assert_eq!(links[1].0, &ViewerLink::new(EntityType::Publisher, "p404"));
        assert!(view.name.is_empty());
    }

    #[test]
    fn test_unmapped_reference_is_text() {
        let event = entity(
            "Book",
            "b1",
            vec![(
                "HAS_BORROWER",
                PropertyValue::Reference(EntityRef {
                    id: "http://example.org/library#u1".into(),
                    name: "Sam".into(),
                }),
            )],
        );
        let view = resolve(EntityType::Book, &event);
        assert_eq!(
            view.attributes[0].value,
            AttributeValue::Text("Sam".to_string())
        );
    }

    #[test]
    fn test_html_escapes_and_links() {
        let book = entity(
            "Book",
            "b1",
            vec![
                ("HAS_NAME", PropertyValue::Scalar("<Dune>".into())),
                (
                    "HAS_AUTHOR",
                    PropertyValue::Reference(EntityRef {
                        id: "a1#5".into(),
                        name: "Jane".into(),
                    }),
                ),
            ],
        );
        let html = resolve(EntityType::Book, &book).to_html();
        assert!(html.starts_with("<h1>Book Details</h1><ul>"));
        assert!(html.contains("<li><strong>HAS_NAME:</strong> &lt;Dune&gt;</li>"));
        assert!(html.contains(
            "<li><strong>HAS_AUTHOR:</strong> <a href=\"viewer.html?type=Author&amp;id=5\" target=\"_blank\">Jane</a></li>"
        ));
        assert!(html.ends_with("&larr; Back to Catalog</a>"));
    }
}
