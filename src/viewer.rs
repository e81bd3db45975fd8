//! Controller for the entity detail page (`viewer.html?type=<Type>&id=<id>`).

use url::form_urlencoded;

use crate::{
    api::{ApiClient, ApiTransport},
    description::{fetch_description, DescriptionSection},
    error::CatalogError,
    model::EntityType,
    resolver::{EntityResolver, EntityView},
};

pub const INVALID_PARAMETERS: &str =
    "Invalid parameters. Please provide both type and id in the URL.";
pub const LOAD_FAILED: &str = "Error loading entity details.";

/// Where the detail page draws. The description region is separate from the details.
pub trait ViewerSurface {
    fn show_entity(&self, view: &EntityView);
    fn show_description(&self, section: &DescriptionSection);
    fn show_error(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerParams {
    pub entity_type: String,
    pub id: String,
}

impl ViewerParams {
    /// Reads `type` and `id` from a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut entity_type = None;
        let mut id = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "type" => entity_type = Some(value.into_owned()),
                "id" => id = Some(value.into_owned()),
                _ => {}
            }
        }
        match (entity_type, id) {
            (Some(entity_type), Some(id)) if !entity_type.is_empty() && !id.is_empty() => {
                Some(ViewerParams { entity_type, id })
            }
            _ => None,
        }
    }
}

pub struct ViewerPage<T, S> {
    client: ApiClient<T>,
    surface: S,
}

impl<T: ApiTransport, S: ViewerSurface> ViewerPage<T, S> {
    pub fn new(client: ApiClient<T>, surface: S) -> Self {
        ViewerPage { client, surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Loads the page for a query string: entity details first, then the description.
    pub async fn open(&self, query: &str) -> Result<(), CatalogError> {
        let Some(params) = ViewerParams::parse(query) else {
            self.surface.show_error(INVALID_PARAMETERS);
            return Err(CatalogError::Validation(INVALID_PARAMETERS.to_string()));
        };
        self.display(&params).await
    }

    pub async fn display(&self, params: &ViewerParams) -> Result<(), CatalogError> {
        let view = match self.load(params).await {
            Ok(view) => view,
            Err(err) => {
                tracing::error!("Error displaying entity: {err}");
                self.surface.show_error(LOAD_FAILED);
                return Err(err);
            }
        };
        self.surface.show_entity(&view);

        if !view.name.is_empty() {
            let section = fetch_description(&self.client, &view.name, view.entity_type).await;
            self.surface.show_description(&section);
        }
        Ok(())
    }

    async fn load(&self, params: &ViewerParams) -> Result<EntityView, CatalogError> {
        let entity_type: EntityType = params.entity_type.parse()?;
        EntityResolver::new(&self.client)
            .load(entity_type, &params.id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parse_params() {
        assert_eq!(
            ViewerParams::parse("?type=Author&id=a%201"),
            Some(ViewerParams {
                entity_type: "Author".to_string(),
                id: "a 1".to_string()
            })
        );
        assert_eq!(
            ViewerParams::parse("id=b1&type=Book&extra=1"),
            Some(ViewerParams {
                entity_type: "Book".to_string(),
                id: "b1".to_string()
            })
        );
        assert_eq!(ViewerParams::parse("?type=Book"), None);
        assert_eq!(ViewerParams::parse("?type=&id=b1"), None);
        assert_eq!(ViewerParams::parse(""), None);
    }
}
