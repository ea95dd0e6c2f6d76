//! Node palette offered by the editor

use serde::Serialize;

use super::node::NodeKind;

/// One draggable entry of the palette
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaletteItem {
    pub id: &'static str,
    pub kind: NodeKind,
    pub name: &'static str,
    pub description: &'static str,
}

impl PaletteItem {
    /// Case-insensitive match on name or description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.description.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub items: Vec<PaletteItem>,
}

const AGENT_ITEMS: &[PaletteItem] = &[
    PaletteItem {
        id: "main-agent",
        kind: NodeKind::Main,
        name: "Main Agent",
        description: "Primary agent that orchestrates other specialized agents",
    },
    PaletteItem {
        id: "web-agent",
        kind: NodeKind::Web,
        name: "Web Agent",
        description: "Browses and interacts with web content",
    },
    PaletteItem {
        id: "chat-agent",
        kind: NodeKind::Chat,
        name: "Chat Agent",
        description: "Handles conversations and natural language interactions",
    },
    PaletteItem {
        id: "code-agent",
        kind: NodeKind::Code,
        name: "Code Agent",
        description: "Generates and analyzes code",
    },
];

const DATA_ITEMS: &[PaletteItem] = &[
    PaletteItem {
        id: "data-source",
        kind: NodeKind::Data,
        name: "Data Source",
        description: "Connects to databases and data stores",
    },
    PaletteItem {
        id: "search-agent",
        kind: NodeKind::Search,
        name: "Search Agent",
        description: "Searches through documents and data",
    },
    PaletteItem {
        id: "document-processor",
        kind: NodeKind::Document,
        name: "Document Processor",
        description: "Processes text documents and extracts information",
    },
];

const INTEGRATION_ITEMS: &[PaletteItem] = &[PaletteItem {
    id: "api-connector",
    kind: NodeKind::Integration,
    name: "API Connector",
    description: "Connects to external APIs and services",
}];

const CATEGORIES: &[(&str, &str, &[PaletteItem])] = &[
    ("agents", "Agents", AGENT_ITEMS),
    ("data", "Data Processing", DATA_ITEMS),
    ("integrations", "Integrations", INTEGRATION_ITEMS),
];

/// Every palette entry across all categories
pub fn items() -> impl Iterator<Item = &'static PaletteItem> {
    CATEGORIES.iter().flat_map(|&(_, _, items)| items.iter())
}

pub fn find_item(id: &str) -> Option<&'static PaletteItem> {
    items().find(|item| item.id == id)
}

/// Categories holding at least one entry matching `query`
///
/// An empty query returns the full palette.
pub fn search(query: &str) -> Vec<PaletteCategory> {
    CATEGORIES
        .iter()
        .map(|&(id, name, items)| PaletteCategory {
            id,
            name,
            items: items.iter().filter(|item| item.matches(query)).copied().collect(),
        })
        .filter(|category| !category.items.is_empty())
        .collect()
}

pub fn categories() -> Vec<PaletteCategory> {
    search("")
}
