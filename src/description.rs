//! Generated entity descriptions.
//!
//! The lookup is secondary to the detail view: its failure is rendered in its own region and
//! never touches the entity details.

use http::StatusCode;

use crate::{
    api::{ApiClient, ApiTransport},
    error::CatalogError,
    html::{escape, markdown_to_html},
    model::EntityType,
};

pub const NO_DESCRIPTION: &str = "No description available.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionSection {
    /// Markdown source of the description.
    Ready(String),
    /// User-facing failure text.
    Failed(String),
}

impl DescriptionSection {
    pub fn to_html(&self) -> String {
        match self {
            DescriptionSection::Ready(markdown) => {
                let mut html = String::from("<h2>Description</h2>");
                match markdown_to_html(markdown, &mut html) {
                    Ok(()) => html,
                    Err(err) => failure_html(&err.to_string()),
                }
            }
            DescriptionSection::Failed(message) => failure_html(message),
        }
    }
}

fn failure_html(message: &str) -> String {
    format!(
        "<p class=\"error-message\">Error fetching description: {}</p>",
        escape(message)
    )
}

/// Maps a lookup failure onto the message shown in the description region.
///
/// The response status decides the message; an `error` body is only shown when the status
/// itself reported success.
pub fn failure_message(err: &CatalogError) -> String {
    match err.response_status().map(StatusCode::from_u16) {
        Some(Ok(StatusCode::BAD_REQUEST)) => "Invalid request. Entity name is missing.".to_string(),
        Some(Ok(StatusCode::INTERNAL_SERVER_ERROR)) => {
            "Server error while fetching description.".to_string()
        }
        Some(Ok(code)) if code.is_success() => match err {
            CatalogError::Server { error, .. } => error.clone(),
            _ => "Unexpected error occurred.".to_string(),
        },
        _ => "Unexpected error occurred.".to_string(),
    }
}

/// Fetches the description for `name`. Always yields a section to display.
pub async fn fetch_description<T: ApiTransport>(
    client: &ApiClient<T>,
    name: &str,
    entity_type: EntityType,
) -> DescriptionSection {
    tracing::debug!("Fetching description for: {name}");
    match client.description(name, entity_type).await {
        Ok(response) => DescriptionSection::Ready(
            response
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        ),
        Err(err) => {
            tracing::error!("Error fetching description: {err}");
            DescriptionSection::Failed(failure_message(&err))
        }
    }
}
