//! Ontology graph presentation for vis-network.
//!
//! Layout and interaction belong to the external library. This module only builds the
//! node/edge/options objects it consumes and maps node clicks back to viewer links.

use serde::Serialize;
use serde_json::json;
use std::str::FromStr;

use crate::{
    api::{ApiClient, ApiTransport},
    error::CatalogError,
    html::ViewerLink,
    model::{id_from_uri, EntityType, GraphEdge, GraphNode, OntologyGraph},
    ui::{LoadingGuard, LoadingIndicator},
};

/// Presentation group of a graph node. Anything unrecognised is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeGroup {
    Book,
    Author,
    Publisher,
    Genre,
    BorrowingEvent,
    Student,
    Faculty,
    Library,
    Other,
}

impl NodeGroup {
    pub const ALL: [NodeGroup; 9] = [
        NodeGroup::Book,
        NodeGroup::Author,
        NodeGroup::Publisher,
        NodeGroup::Genre,
        NodeGroup::BorrowingEvent,
        NodeGroup::Student,
        NodeGroup::Faculty,
        NodeGroup::Library,
        NodeGroup::Other,
    ];

    pub fn parse(group: Option<&str>) -> Self {
        group
            .and_then(|g| NodeGroup::from_str(g).ok())
            .unwrap_or(NodeGroup::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeGroup::Book => "Book",
            NodeGroup::Author => "Author",
            NodeGroup::Publisher => "Publisher",
            NodeGroup::Genre => "Genre",
            NodeGroup::BorrowingEvent => "BorrowingEvent",
            NodeGroup::Student => "Student",
            NodeGroup::Faculty => "Faculty",
            NodeGroup::Library => "Library",
            NodeGroup::Other => "Other",
        }
    }

    /// Background colour and vis shape.
    pub fn style(&self) -> (&'static str, &'static str) {
        match self {
            NodeGroup::Book => ("#FF5733", "box"),
            NodeGroup::Author => ("#33FF57", "ellipse"),
            NodeGroup::Publisher => ("#3357FF", "diamond"),
            NodeGroup::Genre => ("#F1C40F", "hexagon"),
            NodeGroup::BorrowingEvent => ("#FF6347", "triangle"),
            NodeGroup::Student => ("#8A2BE2", "circle"),
            NodeGroup::Faculty => ("#2E8B57", "circle"),
            NodeGroup::Library => ("#9B59B6", "star"),
            NodeGroup::Other => ("#7F8C8D", "circle"),
        }
    }

    /// Entity type the viewer opens for a node of this group, if any.
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            NodeGroup::Book => Some(EntityType::Book),
            NodeGroup::Author => Some(EntityType::Author),
            NodeGroup::Publisher => Some(EntityType::Publisher),
            NodeGroup::Genre => Some(EntityType::Genre),
            NodeGroup::BorrowingEvent
            | NodeGroup::Student
            | NodeGroup::Faculty
            | NodeGroup::Library
            | NodeGroup::Other => None,
        }
    }
}

impl FromStr for NodeGroup {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeGroup::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| CatalogError::NotFound(format!("unknown node group '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub group: &'static str,
    /// Tooltip.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisSmooth {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "forceDirection")]
    pub force_direction: &'static str,
    pub roundness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub label: String,
    pub arrows: &'static str,
    pub smooth: VisSmooth,
}

impl From<&GraphNode> for VisNode {
    fn from(node: &GraphNode) -> Self {
        let group = NodeGroup::parse(node.group.as_deref());
        VisNode {
            id: node.id.clone(),
            label: node.label.clone(),
            group: group.as_str(),
            title: format!("Group: {}", group.as_str()),
        }
    }
}

impl From<&GraphEdge> for VisEdge {
    fn from(edge: &GraphEdge) -> Self {
        VisEdge {
            from: edge.from.clone(),
            to: edge.to.clone(),
            label: edge.label.clone(),
            arrows: "to",
            smooth: VisSmooth {
                kind: "cubicBezier",
                force_direction: "horizontal",
                roundness: 0.4,
            },
        }
    }
}

/// Everything the network library needs to draw the ontology graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphPresentation {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

impl GraphPresentation {
    pub fn from_graph(graph: &OntologyGraph) -> Self {
        GraphPresentation {
            nodes: graph.nodes.iter().map(VisNode::from).collect(),
            edges: graph.edges.iter().map(VisEdge::from).collect(),
        }
    }

    /// `{nodes, edges}` data object.
    pub fn data(&self) -> serde_json::Value {
        json!({ "nodes": self.nodes, "edges": self.edges })
    }

    /// Network options, including the fixed group style table.
    pub fn options() -> serde_json::Value {
        let mut groups = serde_json::Map::new();
        for group in NodeGroup::ALL {
            let (background, shape) = group.style();
            groups.insert(
                group.as_str().to_string(),
                json!({ "color": { "background": background }, "shape": shape }),
            );
        }
        json!({
            "layout": { "hierarchical": false },
            "edges": {
                "arrows": { "to": { "enabled": true, "scaleFactor": 0.5 } },
                "font": { "align": "top" }
            },
            "physics": { "enabled": true, "stabilization": { "iterations": 1000 } },
            "interaction": { "hover": true, "navigationButtons": true, "keyboard": true },
            "groups": groups
        })
    }

    /// Viewer link for a clicked node. Nodes outside the viewable groups, and ids that are not
    /// in the graph, yield `None`.
    pub fn link_for(&self, node_id: &str) -> Option<ViewerLink> {
        let node = self.nodes.iter().find(|n| n.id == node_id)?;
        let entity_type = NodeGroup::from_str(node.group).ok()?.entity_type()?;
        Some(ViewerLink::new(entity_type, id_from_uri(node_id)))
    }
}

/// Fetches `/api/ontology_graph` with the loading indicator up for the duration of the request.
pub async fn load_graph<T, L>(
    client: &ApiClient<T>,
    loading: &L,
) -> Result<GraphPresentation, CatalogError>
where
    T: ApiTransport,
    L: LoadingIndicator + ?Sized,
{
    let _loading = LoadingGuard::new(loading);
    let graph = client.ontology_graph().await?;
    tracing::debug!(
        "Loaded graph with {} nodes and {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(GraphPresentation::from_graph(&graph))
}
