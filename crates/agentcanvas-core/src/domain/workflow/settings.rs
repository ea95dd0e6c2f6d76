//! Editable form for a selected node

use serde::{Deserialize, Serialize};

use super::node::{Node, NodeKind, Properties};

/// Working copy of a node's label, description and properties
///
/// Changes stay in the form until it is applied back to the graph; applying
/// overwrites exactly these three fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeSettings {
    pub node_id: String,
    pub kind: NodeKind,
    pub label: String,
    pub description: String,
    pub properties: Properties,
}

impl NodeSettings {
    pub fn from_node(node: &Node) -> Self {
        Self {
            node_id: node.id.clone(),
            kind: node.kind(),
            label: node.data.label.clone(),
            description: node.data.description.clone(),
            properties: node.data.properties.clone(),
        }
    }

    /// Name shown in the settings header
    pub fn type_name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Add an empty property named `property_<n+1>` and return its key
    ///
    /// If that name is already taken its value is reset to empty.
    pub fn add_property(&mut self) -> String {
        let key = format!("property_{}", self.properties.len() + 1);
        self.properties.insert(key.clone(), String::new());
        key
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn remove_property(&mut self, key: &str) -> bool {
        self.properties.shift_remove(key).is_some()
    }

    /// Write the form's fields onto `node`
    pub fn apply_to(&self, node: &mut Node) {
        node.data.label = self.label.clone();
        node.data.description = self.description.clone();
        node.data.properties = self.properties.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::Position;

    fn web_node() -> Node {
        Node::new("web-1", NodeKind::Web, "Web Agent", Position::new(0.0, 0.0))
            .with_description("Browses pages")
            .with_domain("finance")
            .with_property("url", "https://example.com")
    }

    #[test]
    fn test_form_copies_node_fields() {
        let form = NodeSettings::from_node(&web_node());

        assert_eq!(form.node_id, "web-1");
        assert_eq!(form.type_name(), "Web Agent");
        assert_eq!(form.label, "Web Agent");
        assert_eq!(form.description, "Browses pages");
        assert_eq!(form.properties.get("url").map(String::as_str), Some("https://example.com"));
    }

    #[test]
    fn test_add_property_numbers_from_count() {
        let mut form = NodeSettings::from_node(&web_node());

        assert_eq!(form.add_property(), "property_2");
        assert_eq!(form.add_property(), "property_3");
        assert!(form.remove_property("url"));
        assert!(!form.remove_property("url"));

        // Two properties left, so the next name collides with an existing one
        form.set_property("property_3", "kept?");
        assert_eq!(form.add_property(), "property_3");
        assert_eq!(form.properties.get("property_3").map(String::as_str), Some(""));
        assert_eq!(form.properties.len(), 2);
    }

    #[test]
    fn test_apply_overwrites_only_form_fields() {
        let mut node = web_node();
        let mut form = NodeSettings::from_node(&node);
        form.set_label("Scraper");
        form.set_description("");
        form.remove_property("url");
        form.set_property("depth", "2");

        form.apply_to(&mut node);

        assert_eq!(node.label(), "Scraper");
        assert_eq!(node.data.description, "");
        assert_eq!(node.data.properties.len(), 1);
        assert_eq!(node.data.domain.as_deref(), Some("finance"));
        assert_eq!(node.kind(), NodeKind::Web);
    }

    #[test]
    fn test_added_properties_stay_in_order() {
        let mut form = NodeSettings::from_node(&web_node());
        for _ in 0..10 {
            form.add_property();
        }
        form.remove_property("property_5");

        let keys: Vec<&str> = form.properties.keys().map(String::as_str).collect();
        assert_eq!(keys[0], "url");
        assert_eq!(keys[1], "property_2");
        assert_eq!(keys[8], "property_10");
        assert_eq!(keys[9], "property_11");
    }

    #[test]
    fn test_apply_keeps_unknown_type_tag() {
        let mut node = Node::new("a-1", NodeKind::Custom, "Analytics", Position::default());
        node.data.kind = "analytics".to_string();

        let mut form = NodeSettings::from_node(&node);
        assert_eq!(form.type_name(), "Node");
        form.set_label("Funnel");
        form.apply_to(&mut node);

        assert_eq!(node.type_tag(), "analytics");
        assert_eq!(node.label(), "Funnel");
    }

    #[test]
    fn test_unknown_kind_has_generic_name() {
        let node = Node::new("x", NodeKind::Custom, "Thing", Position::default());
        assert_eq!(NodeSettings::from_node(&node).type_name(), "Node");
    }
}
