//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    future::{ready, Future},
    rc::Rc,
};

use http::StatusCode;
use libcat::{
    api::{ApiClient, ApiRequest, ApiTransport, HttpResponse},
    catalog::CatalogView,
    chat::{ChatMessage, ChatSurface},
    description::DescriptionSection,
    graph::GraphPresentation,
    page::{CatalogSurface, ViewMode},
    resolver::EntityView,
    sparql::{ResultTable, SparqlSurface},
    ui::{LoadingIndicator, Prompter},
    viewer::ViewerSurface,
    CatalogError,
};

type Scripted = Result<HttpResponse, CatalogError>;

#[derive(Default)]
struct MockState {
    routes: RefCell<HashMap<String, VecDeque<Scripted>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

/// Transport answering from per-route scripts and recording every request.
///
/// Each route replays its responses in order; the last one repeats. Unscripted routes fail
/// with [`CatalogError::Transport`]. Clones share the same script and log.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Rc<MockState>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> ApiClient<MockTransport> {
        ApiClient::new(self.clone())
    }

    pub fn script(&self, route: &str, response: Scripted) -> &Self {
        self.state
            .routes
            .borrow_mut()
            .entry(route.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn json(&self, route: &str, body: serde_json::Value) -> &Self {
        self.script(route, Ok(HttpResponse::ok_json(body)))
    }

    pub fn status(&self, route: &str, status: StatusCode, body: serde_json::Value) -> &Self {
        self.script(route, Ok(HttpResponse::new(status, body.to_string())))
    }

    pub fn offline(&self, route: &str) -> &Self {
        self.script(
            route,
            Err(CatalogError::Transport("connection refused".to_string())),
        )
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.requests.borrow().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.state
            .requests
            .borrow()
            .iter()
            .filter(|r| r.route() == route)
            .count()
    }

    fn answer(&self, request: &ApiRequest) -> Scripted {
        let mut routes = self.state.routes.borrow_mut();
        match routes.get_mut(request.route()) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| Err(CatalogError::Transport("empty script".to_string()))),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(CatalogError::Transport("empty script".to_string()))),
            None => Err(CatalogError::Transport(format!(
                "no script for {}",
                request.route()
            ))),
        }
    }
}

impl ApiTransport for MockTransport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Scripted> {
        let response = self.answer(&request);
        self.state.requests.borrow_mut().push(request);
        ready(response)
    }
}

/// Surface for every page that records what it was asked to draw.
#[derive(Default)]
pub struct RecordingSurface {
    /// Answer given to every confirmation.
    pub confirm_answer: Cell<bool>,
    pub alerts: RefCell<Vec<String>>,
    pub confirmations: RefCell<Vec<String>>,
    pub loading: RefCell<Vec<&'static str>>,
    pub catalogs: RefCell<Vec<CatalogView>>,
    pub graphs: RefCell<Vec<GraphPresentation>>,
    pub modes: RefCell<Vec<ViewMode>>,
    pub entities: RefCell<Vec<EntityView>>,
    pub descriptions: RefCell<Vec<DescriptionSection>>,
    pub errors: RefCell<Vec<String>>,
    pub messages: RefCell<Vec<ChatMessage>>,
    pub input_enabled: RefCell<Vec<bool>>,
    pub input_clears: Cell<usize>,
    pub results: RefCell<Vec<ResultTable>>,
    pub clears: Cell<usize>,
}

#[allow(dead_code)]
impl RecordingSurface {
    /// A surface that accepts every confirmation.
    pub fn agreeing() -> Self {
        let surface = Self::default();
        surface.confirm_answer.set(true);
        surface
    }

    pub fn last_alert(&self) -> Option<String> {
        self.alerts.borrow().last().cloned()
    }

    pub fn input_is_enabled(&self) -> bool {
        self.input_enabled.borrow().last().copied().unwrap_or(false)
    }
}

impl Prompter for RecordingSurface {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmations.borrow_mut().push(message.to_string());
        self.confirm_answer.get()
    }
}

impl LoadingIndicator for RecordingSurface {
    fn show_loading(&self) {
        self.loading.borrow_mut().push("show");
    }

    fn hide_loading(&self) {
        self.loading.borrow_mut().push("hide");
    }
}

impl CatalogSurface for RecordingSurface {
    fn show_catalog(&self, view: &CatalogView) {
        self.catalogs.borrow_mut().push(view.clone());
    }

    fn show_graph(&self, graph: &GraphPresentation) {
        self.graphs.borrow_mut().push(graph.clone());
    }

    fn set_view_mode(&self, mode: ViewMode) {
        self.modes.borrow_mut().push(mode);
    }
}

impl ViewerSurface for RecordingSurface {
    fn show_entity(&self, view: &EntityView) {
        self.entities.borrow_mut().push(view.clone());
    }

    fn show_description(&self, section: &DescriptionSection) {
        self.descriptions.borrow_mut().push(section.clone());
    }

    fn show_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

impl ChatSurface for RecordingSurface {
    fn append_message(&self, message: &ChatMessage) {
        self.messages.borrow_mut().push(message.clone());
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.input_enabled.borrow_mut().push(enabled);
    }

    fn clear_input(&self) {
        self.input_clears.set(self.input_clears.get() + 1);
    }
}

impl SparqlSurface for RecordingSurface {
    fn clear_results(&self) {
        self.clears.set(self.clears.get() + 1);
    }

    fn show_results(&self, table: &ResultTable) {
        self.results.borrow_mut().push(table.clone());
    }
}

/// `/api/books` payload with one available and one borrowed book.
#[allow(dead_code)]
pub fn two_books() -> serde_json::Value {
    serde_json::json!({
        "books": [
            {
                "id": "http://example.org/library#b1",
                "title": "Dune",
                "author": {"id": "http://example.org/library#a1", "name": "Frank Herbert"},
                "publisher": {"id": "http://example.org/library#p1", "name": "Chilton"},
                "genre": {"id": "http://example.org/library#g1", "name": "Science Fiction"},
                "state": "Present",
                "borrowed": false
            },
            {
                "id": "http://example.org/library#b2",
                "title": "Emma",
                "author": {"id": "http://example.org/library#a2", "name": "Jane Austen"},
                "publisher": {"id": "http://example.org/library#p2", "name": "John Murray"},
                "genre": {"id": "http://example.org/library#g2", "name": "Romance"},
                "state": "Borrowed",
                "borrowed": true,
                "borrower_name": "Ann",
                "borrower_type": "Student",
                "borrow_date": "2024-03-01",
                "return_date": "2024-03-15"
            }
        ]
    })
}
