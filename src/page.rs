//! Controller for the catalog page: table, graph toggle and the three forms.
//!
//! What the page script kept in globals (the current graph, which view is showing) lives here as
//! fields. Methods take `&self` so DOM callbacks can share one controller behind an `Rc`.

use std::cell::{Cell, RefCell};

use crate::{
    api::{ApiClient, ApiTransport},
    catalog::{load_catalog, CatalogView},
    error::CatalogError,
    forms::{BorrowForm, FormAction, ReturnForm, Submission},
    graph::{load_graph, GraphPresentation},
    html::ViewerLink,
    ui::{LoadingIndicator, Prompter},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Table,
    Graph,
}

/// CSS `display` for the loading overlay while it is visible.
pub const LOADING_DISPLAY: &str = "flex";

impl ViewMode {
    /// CSS `display` values for the table and the network container, in that order.
    pub fn displays(self) -> (&'static str, &'static str) {
        match self {
            ViewMode::Table => ("table", "none"),
            ViewMode::Graph => ("none", "block"),
        }
    }
}

/// Where the catalog page draws.
pub trait CatalogSurface: Prompter + LoadingIndicator {
    fn show_catalog(&self, view: &CatalogView);
    fn show_graph(&self, graph: &GraphPresentation);
    fn set_view_mode(&self, mode: ViewMode);
}

pub struct CatalogPage<T, S> {
    client: ApiClient<T>,
    surface: S,
    mode: Cell<ViewMode>,
    graph: RefCell<Option<GraphPresentation>>,
}

impl<T: ApiTransport, S: CatalogSurface> CatalogPage<T, S> {
    pub fn new(client: ApiClient<T>, surface: S) -> Self {
        CatalogPage {
            client,
            surface,
            mode: Cell::new(ViewMode::Table),
            graph: RefCell::new(None),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn mode(&self) -> ViewMode {
        self.mode.get()
    }

    /// Reloads the table and both option lists. Failures are logged and leave the previous
    /// content in place.
    pub async fn load_table(&self) -> Result<(), CatalogError> {
        match load_catalog(&self.client, &self.surface).await {
            Ok(view) => {
                self.surface.show_catalog(&view);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Error fetching books: {err}");
                Err(err)
            }
        }
    }

    pub async fn render_graph(&self) -> Result<(), CatalogError> {
        match load_graph(&self.client, &self.surface).await {
            Ok(graph) => {
                self.surface.show_graph(&graph);
                *self.graph.borrow_mut() = Some(graph);
                Ok(())
            }
            Err(err) => {
                tracing::error!("Error fetching graph data: {err}");
                Err(err)
            }
        }
    }

    /// Switches views. Entering the graph view always fetches a fresh graph.
    pub async fn set_view(&self, mode: ViewMode) -> Result<(), CatalogError> {
        self.mode.set(mode);
        self.surface.set_view_mode(mode);
        match mode {
            ViewMode::Graph => self.render_graph().await,
            ViewMode::Table => Ok(()),
        }
    }

    /// Viewer link for a clicked graph node, if the node is viewable.
    pub fn open_node(&self, node_id: &str) -> Option<ViewerLink> {
        self.graph
            .borrow()
            .as_ref()
            .and_then(|graph| graph.link_for(node_id))
    }

    pub async fn borrow(&self, form: BorrowForm) -> Submission {
        self.run(FormAction::Borrow(form)).await
    }

    pub async fn return_book(&self, form: ReturnForm) -> Submission {
        self.run(FormAction::Return(form)).await
    }

    pub async fn clear(&self) -> Submission {
        self.run(FormAction::Clear).await
    }

    async fn run(&self, action: FormAction) -> Submission {
        let outcome = action.run(&self.client, &self.surface).await;
        if outcome.is_accepted() {
            self.refresh().await;
        }
        outcome
    }

    /// Reloads the table, and the graph when it is showing and has been drawn before. The two
    /// fetches run concurrently.
    async fn refresh(&self) {
        let graph_showing = self.mode.get() == ViewMode::Graph && self.graph.borrow().is_some();
        if graph_showing {
            let (_table, _graph) = futures::join!(self.load_table(), self.render_graph());
        } else {
            let _ = self.load_table().await;
        }
    }
}
