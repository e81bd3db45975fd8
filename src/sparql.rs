//! SPARQL console: query form, request, and result table.

use crate::{
    api::{ApiClient, ApiRequest, ApiTransport},
    config::SparqlEncoding,
    error::CatalogError,
    html::escape,
    model::SparqlResponse,
    ui::{LoadingGuard, LoadingIndicator, Prompter},
};

pub const MISSING_INPUT: &str = "Please provide both the SPARQL endpoint and the query.";
pub const QUERY_FAILED: &str = "An error occurred while executing the SPARQL query.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparqlForm {
    pub endpoint: String,
    pub query: String,
}

impl SparqlForm {
    pub fn new(endpoint: impl Into<String>, query: impl Into<String>) -> Self {
        SparqlForm {
            endpoint: endpoint.into().trim().to_string(),
            query: query.into().trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.endpoint.trim().is_empty() || self.query.trim().is_empty() {
            return Err(CatalogError::Validation(MISSING_INPUT.to_string()));
        }
        Ok(())
    }

    pub fn to_request(&self, encoding: SparqlEncoding) -> Result<ApiRequest, CatalogError> {
        match encoding {
            SparqlEncoding::Json => ApiRequest::post_json(
                "/api/sparql",
                &serde_json::json!({ "endpoint": self.endpoint, "query": self.query }),
            ),
            SparqlEncoding::Form => Ok(ApiRequest::post_form(
                "/api/sparql",
                vec![
                    ("dataSource".to_string(), self.endpoint.clone()),
                    ("query".to_string(), self.query.clone()),
                ],
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn cell_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl ResultTable {
    pub fn from_response(response: &SparqlResponse) -> Self {
        match response {
            SparqlResponse::Select { variables, results } => ResultTable {
                headers: variables.clone(),
                rows: results
                    .iter()
                    .map(|row| variables.iter().map(|v| cell_text(row.get(v))).collect())
                    .collect(),
            },
            SparqlResponse::Ask { boolean } => ResultTable {
                headers: vec!["Result".to_string()],
                rows: vec![vec![boolean.to_string()]],
            },
            SparqlResponse::Message { message } => ResultTable {
                headers: vec!["Message".to_string()],
                rows: vec![vec![message.clone()]],
            },
        }
    }

    pub fn head_html(&self) -> String {
        let mut html = String::from("<tr>");
        for header in &self.headers {
            html.push_str(&format!("<th>{}</th>", escape(header)));
        }
        html.push_str("</tr>");
        html
    }

    pub fn body_html(&self) -> String {
        let mut html = String::new();
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape(cell)));
            }
            html.push_str("</tr>");
        }
        html
    }
}

pub trait SparqlSurface: Prompter + LoadingIndicator {
    fn clear_results(&self);
    fn show_results(&self, table: &ResultTable);
}

pub struct SparqlConsole<T, S> {
    client: ApiClient<T>,
    surface: S,
    encoding: SparqlEncoding,
}

impl<T: ApiTransport, S: SparqlSurface> SparqlConsole<T, S> {
    pub fn new(client: ApiClient<T>, surface: S, encoding: SparqlEncoding) -> Self {
        SparqlConsole {
            client,
            surface,
            encoding,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Runs one query. Returns the table that was shown, if any.
    pub async fn submit(&self, form: &SparqlForm) -> Option<ResultTable> {
        if form.validate().is_err() {
            self.surface.alert(MISSING_INPUT);
            return None;
        }
        self.surface.clear_results();

        let result = match form.to_request(self.encoding) {
            Ok(request) => {
                let _loading = LoadingGuard::new(&self.surface);
                self.client.sparql(request).await
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                let table = ResultTable::from_response(&response);
                self.surface.show_results(&table);
                Some(table)
            }
            Err(CatalogError::Server { error, details, .. }) => {
                self.surface.alert(&format!(
                    "Error: {error}\n{}",
                    details.unwrap_or_default()
                ));
                None
            }
            Err(err) => {
                tracing::error!("Error: {err}");
                self.surface.alert(QUERY_FAILED);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestBody;
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_ask_result() {
        let table = ResultTable::from_response(&SparqlResponse::Ask { boolean: true });
        assert_eq!(table.headers, vec!["Result"]);
        assert_eq!(table.rows, vec![vec!["true".to_string()]]);
        assert_eq!(table.head_html(), "<tr><th>Result</th></tr>");
        assert_eq!(table.body_html(), "<tr><td>true</td></tr>");
    }

    #[test]
    fn test_select_result_fills_missing_cells() {
        let response: SparqlResponse = serde_json::from_value(json!({
            "variables": ["book", "pages"],
            "results": [
                {"book": "Dune", "pages": 412},
                {"book": "Emma"}
            ]
        }))
        .unwrap();
        let table = ResultTable::from_response(&response);
        assert_eq!(
            table.rows,
            vec![
                vec!["Dune".to_string(), "412".to_string()],
                vec!["Emma".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_form_encodings() {
        let form = SparqlForm::new(" http://localhost:7200/repositories/lib ", "ASK {}");
        assert!(form.validate().is_ok());
        let json_request = form.to_request(SparqlEncoding::Json).unwrap();
        assert_eq!(
            json_request.body,
            RequestBody::Json(json!({
                "endpoint": "http://localhost:7200/repositories/lib",
                "query": "ASK {}"
            }))
        );
        let form_request = form.to_request(SparqlEncoding::Form).unwrap();
        assert!(matches!(
            form_request.body,
            RequestBody::Form(ref fields) if fields[0].0 == "dataSource"
        ));
    }

    #[test]
    fn test_blank_form_invalid() {
        assert!(SparqlForm::new("  ", "SELECT * {}").validate().is_err());
        assert!(SparqlForm::new("http://x", "").validate().is_err());
    }
}
