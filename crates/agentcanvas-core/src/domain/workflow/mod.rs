//! Workflow graphs and the editor that mutates them
//!
//! # Architecture
//!
//! - **Graph**: `Node`, `Edge`, `WorkflowGraph` and its read-only `GraphReport`
//! - **Editor**: `WorkflowEditor`, a session over one agent's graph
//! - **Autosave**: `FlushSchedule` and the task that writes after a quiet period
//! - **Palette**: the node templates offered for dropping onto the canvas
//!
//! # Example
//!
//! ```ignore
//! use agentcanvas_core::domain::workflow::{MAIN_NODE_ID, NodeKind, WorkflowEditor};
//!
//! let mut editor = WorkflowEditor::open(&store, &agent_id, &config.editor).await?;
//! let web = editor.add_node(NodeKind::Web, "Web Agent", "", None)?;
//! editor.connect(MAIN_NODE_ID, None, &web, None)?;
//! editor.close().await?;
//! ```

pub mod autosave;
pub mod edge;
pub mod editor;
pub mod graph;
pub mod node;
pub mod palette;
pub mod settings;

pub use autosave::{Autosave, FlushSchedule};
pub use edge::{CUSTOM_EDGE_COMPONENT, EDGE_COLOR, Edge, EdgeMarker, EdgeStyle, MarkerType};
pub use editor::WorkflowEditor;
pub use graph::{GraphOrigin, GraphReport, RANDOM_PLACEMENT, WorkflowGraph};
pub use node::{AGENT_NODE_COMPONENT, MAIN_NODE_ID, Node, NodeData, NodeKind, Position, Properties};
pub use palette::{PaletteCategory, PaletteItem};
pub use settings::NodeSettings;
