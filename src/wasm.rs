//! WASM bindings for libcat
//!
//! Browser front-end for the catalog pages. Each page calls one entry point after loading the
//! module; the entry point wires DOM events to a page controller and draws through the DOM
//! surfaces defined here.
//!
//! ## Usage
//!
//! ```javascript,ignore
//! import init, { startCatalog } from './pkg/libcat.js';
//!
//! async function main() {
//!     await init();
//!     startCatalog();
//! }
//! ```
//!
//! | Page          | Entry point       | Element ids                                                      |
//! |---------------|-------------------|------------------------------------------------------------------|
//! | `index.html`  | `startCatalog()`  | `book-table`, `borrowForm`, `returnForm`, `clearDataBtn`, ...    |
//! | `index.html`  | `startChat()`     | `chat`, `chatbox-input`, `chatbox-send`                          |
//! | `viewer.html` | `startViewer()`   | `content`, `description`, `error-message`                        |
//! | `sparql.html` | `startSparql()`   | `sparqlForm`, `resultsHead`, `resultsBody`, `loadingSpinner`     |
//!
//! # Rust→JavaScript serialization
//!
//! `serde_wasm_bindgen::to_value()` turns Rust maps into JavaScript `Map` objects, which
//! vis-network does not read. Graph data and options are always serialized with
//! [`serde_wasm_bindgen::Serializer::json_compatible`] so they arrive as plain objects.

use std::{cell::RefCell, future::Future, rc::Rc};

use http::StatusCode;
use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::{prelude::*, JsCast};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    console, Document, Element, Event, Headers, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, KeyboardEvent, Request, RequestInit, Response, Window,
};

use crate::{
    api::{ApiClient, ApiRequest, ApiTransport, HttpResponse, RequestBody},
    catalog::CatalogView,
    chat::{ChatMessage, ChatSurface, ChatWidget},
    config::ClientConfig,
    description::DescriptionSection,
    error::CatalogError,
    forms::{BorrowForm, ReturnForm},
    graph::GraphPresentation,
    page::{CatalogPage, CatalogSurface, ViewMode, LOADING_DISPLAY},
    resolver::EntityView,
    sparql::{ResultTable, SparqlConsole, SparqlForm, SparqlSurface},
    ui::{LoadingIndicator, Prompter},
    viewer::{ViewerPage, ViewerSurface},
};

#[wasm_bindgen(js_namespace = vis)]
extern "C" {
    /// `vis.Network` from vis-network, loaded by the page.
    type Network;

    #[wasm_bindgen(constructor, catch)]
    fn new(container: &Element, data: &JsValue, options: &JsValue) -> Result<Network, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Network, event: &str, callback: &Function);

    #[wasm_bindgen(method)]
    fn destroy(this: &Network);
}

fn window() -> Result<Window, CatalogError> {
    web_sys::window().ok_or_else(|| CatalogError::Browser("no global window".to_string()))
}

fn document() -> Result<Document, CatalogError> {
    window()?
        .document()
        .ok_or_else(|| CatalogError::Browser("window has no document".to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, CatalogError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

/// Looks up elements by id on one document.
#[derive(Clone)]
struct Dom {
    document: Document,
}

impl Dom {
    fn new() -> Result<Self, CatalogError> {
        Ok(Dom {
            document: document()?,
        })
    }

    fn element(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id);
        if element.is_none() {
            tracing::warn!("Element #{id} not found");
        }
        element
    }

    fn require(&self, id: &str) -> Result<Element, CatalogError> {
        self.element(id)
            .ok_or_else(|| CatalogError::NotFound(format!("element #{id}")))
    }

    fn set_html(&self, id: &str, html: &str) {
        if let Some(element) = self.element(id) {
            element.set_inner_html(html);
        }
    }

    fn set_display(&self, id: &str, display: &str) {
        let Some(element) = self.element(id) else {
            return;
        };
        if let Some(element) = element.dyn_ref::<HtmlElement>() {
            if let Err(err) = element.style().set_property("display", display) {
                tracing::warn!("Could not set display on #{id}: {err:?}");
            }
        }
    }

    fn value(&self, id: &str) -> String {
        let Some(element) = self.element(id) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    fn checked(&self, id: &str) -> bool {
        self.element(id)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.checked())
            .unwrap_or(false)
    }

    fn clear_value(&self, id: &str) {
        if let Some(input) = self
            .element(id)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value("");
        }
    }

    /// Registers `handler` for `event` on `#id` for the lifetime of the page.
    fn listen<F>(&self, id: &str, event: &str, handler: F) -> Result<(), CatalogError>
    where
        F: FnMut(Event) + 'static,
    {
        let target = self.require(id)?;
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}

/// `fetch`-backed transport. Requests are relative to `base_url`, which is empty for pages served
/// by the backend.
#[derive(Debug, Clone, Default)]
pub struct FetchTransport {
    base_url: String,
}

impl FetchTransport {
    pub fn new(config: &ClientConfig) -> Self {
        FetchTransport {
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn execute(&self, request: ApiRequest) -> Result<HttpResponse, CatalogError> {
        let url = format!("{}{}", self.base_url, request.path);
        let init = RequestInit::new();
        init.set_method(request.method.as_str());

        let headers = Headers::new()?;
        headers.set("Accept", "application/json")?;
        match &request.body {
            RequestBody::Empty => {}
            RequestBody::Json(value) => {
                headers.set("Content-Type", "application/json")?;
                init.set_body(&JsValue::from_str(&value.to_string()));
            }
            RequestBody::Form(fields) => {
                let mut serializer = url::form_urlencoded::Serializer::new(String::new());
                for (key, value) in fields {
                    serializer.append_pair(key, value);
                }
                headers.set("Content-Type", "application/x-www-form-urlencoded")?;
                init.set_body(&JsValue::from_str(&serializer.finish()));
            }
        }
        init.set_headers(&headers);

        let js_request = Request::new_with_str_and_init(&url, &init)?;
        let response = JsFuture::from(window()?.fetch_with_request(&js_request))
            .await
            .map_err(|err| CatalogError::Transport(format!("{err:?}")))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| CatalogError::Browser("fetch did not yield a Response".to_string()))?;
        let status = StatusCode::from_u16(response.status())
            .map_err(|e| CatalogError::Transport(format!("invalid status code: {e}")))?;
        let body = JsFuture::from(response.text()?)
            .await
            .map_err(|err| CatalogError::Transport(format!("{err:?}")))?
            .as_string()
            .unwrap_or_default();
        Ok(HttpResponse { status, body })
    }
}

impl ApiTransport for FetchTransport {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<HttpResponse, CatalogError>> {
        self.execute(request)
    }
}

/// `window.alert` / `window.confirm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserPrompter;

impl Prompter for BrowserPrompter {
    fn alert(&self, message: &str) {
        if let Ok(window) = window() {
            if let Err(err) = window.alert_with_message(message) {
                tracing::warn!("alert failed: {err:?}");
            }
        }
    }

    fn confirm(&self, message: &str) -> bool {
        window()
            .ok()
            .and_then(|window| window.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}

struct NetworkHandle {
    network: Network,
    _on_click: Closure<dyn FnMut(JsValue)>,
}

impl Drop for NetworkHandle {
    fn drop(&mut self) {
        self.network.destroy();
    }
}

/// Catalog page: table, selects, graph container and loading indicator.
pub struct DomCatalogSurface {
    dom: Dom,
    prompter: BrowserPrompter,
    network: RefCell<Option<NetworkHandle>>,
}

impl DomCatalogSurface {
    fn new(dom: Dom) -> Self {
        DomCatalogSurface {
            dom,
            prompter: BrowserPrompter,
            network: RefCell::new(None),
        }
    }

    fn draw_network(&self, graph: &GraphPresentation) -> Result<NetworkHandle, CatalogError> {
        let container = self.dom.require("network")?;
        let data = to_js(&graph.data())?;
        let options = to_js(&GraphPresentation::options())?;
        let network = Network::new(&container, &data, &options)?;

        let links = graph.clone();
        let on_click = Closure::<dyn FnMut(JsValue)>::new(move |params: JsValue| {
            let Ok(nodes) = Reflect::get(&params, &JsValue::from_str("nodes")) else {
                return;
            };
            let Some(node_id) = Array::from(&nodes).get(0).as_string() else {
                return;
            };
            let Some(link) = links.link_for(&node_id) else {
                return;
            };
            if let Ok(window) = window() {
                if let Err(err) = window.open_with_url_and_target(&link.href(), "_blank") {
                    tracing::warn!("Could not open {}: {err:?}", link.href());
                }
            }
        });
        network.on("click", on_click.as_ref().unchecked_ref());
        Ok(NetworkHandle {
            network,
            _on_click: on_click,
        })
    }
}

impl Prompter for DomCatalogSurface {
    fn alert(&self, message: &str) {
        self.prompter.alert(message)
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompter.confirm(message)
    }
}

impl LoadingIndicator for DomCatalogSurface {
    fn show_loading(&self) {
        self.dom.set_display("loading", LOADING_DISPLAY);
    }

    fn hide_loading(&self) {
        self.dom.set_display("loading", "none");
    }
}

impl CatalogSurface for DomCatalogSurface {
    fn show_catalog(&self, view: &CatalogView) {
        self.dom.set_html("book-table", &view.table_html());
        self.dom
            .set_html("borrowBookId", &view.borrow_options_html());
        self.dom
            .set_html("returnBookId", &view.return_options_html());
    }

    fn show_graph(&self, graph: &GraphPresentation) {
        // Dropping the previous handle destroys the old network first.
        self.network.borrow_mut().take();
        match self.draw_network(graph) {
            Ok(handle) => *self.network.borrow_mut() = Some(handle),
            Err(err) => tracing::error!("Error drawing graph: {err}"),
        }
    }

    fn set_view_mode(&self, mode: ViewMode) {
        let (table, network) = mode.displays();
        self.dom.set_display("tableView", table);
        self.dom.set_display("network", network);
    }
}

/// Entity detail page.
pub struct DomViewerSurface {
    dom: Dom,
}

impl ViewerSurface for DomViewerSurface {
    fn show_entity(&self, view: &EntityView) {
        self.dom.set_html("content", &view.to_html());
    }

    fn show_description(&self, section: &DescriptionSection) {
        self.dom.set_html("description", &section.to_html());
    }

    fn show_error(&self, message: &str) {
        self.dom
            .set_html("error-message", &crate::html::escape(message));
        self.dom.set_display("error-message", "block");
    }
}

/// Chat box: message list, input and send button.
pub struct DomChatSurface {
    dom: Dom,
}

impl ChatSurface for DomChatSurface {
    fn append_message(&self, message: &ChatMessage) {
        if let Some(chat) = self.dom.element("chat") {
            if let Err(err) = chat.insert_adjacent_html("beforeend", &message.to_html()) {
                tracing::warn!("Could not append chat message: {err:?}");
            }
        }
    }

    fn set_input_enabled(&self, enabled: bool) {
        if let Some(send) = self.dom.element("chatbox-send") {
            let class = if enabled { "" } else { "disabled" };
            if let Err(err) = send.set_attribute("class", class) {
                tracing::warn!("Could not toggle chat input: {err:?}");
            }
        }
    }

    fn clear_input(&self) {
        self.dom.clear_value("chatbox-input");
    }

    fn scroll_to_bottom(&self) {
        let Ok(window) = window() else {
            return;
        };
        if let Some(body) = self.dom.document.body() {
            window.scroll_to_with_x_and_y(0.0, f64::from(body.scroll_height()));
        }
    }
}

/// SPARQL console page.
pub struct DomSparqlSurface {
    dom: Dom,
    prompter: BrowserPrompter,
}

impl Prompter for DomSparqlSurface {
    fn alert(&self, message: &str) {
        self.prompter.alert(message)
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompter.confirm(message)
    }
}

impl LoadingIndicator for DomSparqlSurface {
    fn show_loading(&self) {
        self.dom.set_display("loadingSpinner", "block");
    }

    fn hide_loading(&self) {
        self.dom.set_display("loadingSpinner", "none");
    }
}

impl SparqlSurface for DomSparqlSurface {
    fn clear_results(&self) {
        self.dom.set_html("resultsHead", "");
        self.dom.set_html("resultsBody", "");
        self.dom.set_display("resultsContainer", "none");
    }

    fn show_results(&self, table: &ResultTable) {
        self.dom.set_html("resultsHead", &table.head_html());
        self.dom.set_html("resultsBody", &table.body_html());
        self.dom.set_display("resultsContainer", "block");
    }
}

fn init_tracing() {
    // A second page script on the same document finds the subscriber already installed.
    if tracing_wasm::try_set_as_global_default().is_err() {
        console::debug_1(&"tracing already initialized".into());
    }
}

fn client() -> ApiClient<FetchTransport> {
    ApiClient::new(FetchTransport::new(&ClientConfig::same_origin()))
}

fn prevent_default(event: &Event) {
    event.prevent_default();
}

/// Wires the catalog page: initial table load, the view toggle, and the three forms.
#[wasm_bindgen(js_name = startCatalog)]
pub fn start_catalog() -> Result<(), JsValue> {
    init_tracing();
    let dom = Dom::new()?;
    let page = Rc::new(CatalogPage::new(
        client(),
        DomCatalogSurface::new(dom.clone()),
    ));

    {
        let page = Rc::clone(&page);
        spawn_local(async move {
            let _ = page.load_table().await;
        });
    }

    {
        let page = Rc::clone(&page);
        let toggle_dom = dom.clone();
        dom.listen("viewToggle", "change", move |_| {
            let mode = if toggle_dom.checked("viewToggle") {
                ViewMode::Graph
            } else {
                ViewMode::Table
            };
            let page = Rc::clone(&page);
            spawn_local(async move {
                let _ = page.set_view(mode).await;
            });
        })?;
    }

    {
        let page = Rc::clone(&page);
        let form_dom = dom.clone();
        dom.listen("borrowForm", "submit", move |event| {
            prevent_default(&event);
            let form = BorrowForm {
                book_id: form_dom.value("borrowBookId"),
                borrower_name: form_dom.value("borrowerName"),
                borrower_type: form_dom.value("borrowerType"),
                borrow_date: form_dom.value("borrowDate"),
            };
            let page = Rc::clone(&page);
            spawn_local(async move {
                page.borrow(form).await;
            });
        })?;
    }

    {
        let page = Rc::clone(&page);
        let form_dom = dom.clone();
        dom.listen("returnForm", "submit", move |event| {
            prevent_default(&event);
            let form = ReturnForm {
                book_id: form_dom.value("returnBookId"),
                return_date: form_dom.value("returnDate"),
            };
            let page = Rc::clone(&page);
            spawn_local(async move {
                page.return_book(form).await;
            });
        })?;
    }

    {
        let page = Rc::clone(&page);
        dom.listen("clearDataBtn", "click", move |_| {
            let page = Rc::clone(&page);
            spawn_local(async move {
                page.clear().await;
            });
        })?;
    }

    tracing::info!("Catalog page ready");
    Ok(())
}

/// Loads the entity named by the page's `?type=...&id=...` query.
#[wasm_bindgen(js_name = startViewer)]
pub fn start_viewer() -> Result<(), JsValue> {
    init_tracing();
    let query = window()?.location().search()?;
    let page = ViewerPage::new(client(), DomViewerSurface { dom: Dom::new()? });
    spawn_local(async move {
        let _ = page.open(&query).await;
    });
    Ok(())
}

/// Fetches the opening message, then sends on click or Enter.
#[wasm_bindgen(js_name = startChat)]
pub fn start_chat() -> Result<(), JsValue> {
    init_tracing();
    let dom = Dom::new()?;
    let widget = Rc::new(ChatWidget::new(
        client(),
        DomChatSurface { dom: dom.clone() },
    ));

    let send = {
        let widget = Rc::clone(&widget);
        let dom = dom.clone();
        Rc::new(move || {
            let input = dom.value("chatbox-input");
            let widget = Rc::clone(&widget);
            spawn_local(async move {
                if let Err(err) = widget.send(&input).await {
                    tracing::debug!("Chat message not delivered: {err}");
                }
            });
        })
    };

    {
        let send = Rc::clone(&send);
        dom.listen("chatbox-send", "click", move |_| send())?;
    }
    dom.listen("chatbox-input", "keydown", move |event| {
        let enter = event
            .dyn_ref::<KeyboardEvent>()
            .map(|key| key.key() == "Enter")
            .unwrap_or(false);
        if enter {
            prevent_default(&event);
            send();
        }
    })?;

    spawn_local(async move {
        let _ = widget.init().await;
    });
    Ok(())
}

/// Wires the SPARQL form.
#[wasm_bindgen(js_name = startSparql)]
pub fn start_sparql() -> Result<(), JsValue> {
    init_tracing();
    let dom = Dom::new()?;
    let config = ClientConfig::same_origin();
    let console = Rc::new(SparqlConsole::new(
        client(),
        DomSparqlSurface {
            dom: dom.clone(),
            prompter: BrowserPrompter,
        },
        config.sparql.encoding,
    ));

    let form_dom = dom.clone();
    dom.listen("sparqlForm", "submit", move |event| {
        prevent_default(&event);
        let form = SparqlForm::new(
            form_dom.value("sparqlEndpoint"),
            form_dom.value("sparqlQuery"),
        );
        let console = Rc::clone(&console);
        spawn_local(async move {
            console.submit(&form).await;
        });
    })?;
    Ok(())
}
