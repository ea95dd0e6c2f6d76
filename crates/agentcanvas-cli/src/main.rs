//! AgentCanvas CLI - build and arrange AI agent workflows locally

use std::path::PathBuf;
use std::process::ExitCode;

use agentcanvas_core::commands::{SnapshotHealth, StoreLocation, Workspace, agent_cards};
use agentcanvas_core::config::Config;
use agentcanvas_core::domain::agents::{Agent, AgentStatus, AgentStore, AgentUpdate};
use agentcanvas_core::domain::wizard::{
    Advance, AgentWizard, CAPABILITIES, DESCRIPTION_SUGGESTIONS, DOMAINS, INTEGRATIONS,
};
use agentcanvas_core::domain::workflow::{
    GraphOrigin, NodeKind, Position, WorkflowEditor, WorkflowGraph, palette,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

#[derive(Parser)]
#[command(name = "agentcanvas")]
#[command(author, version, about = "Build and arrange AI agent workflows locally", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// SQLite database to use instead of the configured one
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "memory")]
    database: Option<PathBuf>,

    /// Keep agents in memory only; nothing is saved
    #[arg(long, global = true)]
    memory: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new agent (runs the creation wizard non-interactively)
    Create {
        /// Agent name
        #[arg(short, long)]
        name: String,
        /// What the agent should do
        #[arg(short, long)]
        description: String,
        /// Domain id (see `agentcanvas catalog domains`)
        #[arg(long)]
        domain: String,
        /// Focus sub-domain; repeat to pick several (default: all of the domain's)
        #[arg(long = "subdomain")]
        subdomains: Vec<String>,
        /// Capability id; repeat to pick several
        #[arg(short, long = "capability")]
        capabilities: Vec<String>,
        /// Integration id; repeat to pick several
        #[arg(short, long = "integration")]
        integrations: Vec<String>,
    },

    /// Manage agents
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Inspect and edit an agent's workflow graph
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },

    /// Browse the choices offered when building agents
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum AgentAction {
    /// List all agents
    List,
    /// Show agent details
    Show { id: String },
    /// Show the currently selected agent
    Current,
    /// Make an agent the current selection
    Select { id: String },
    /// Set an agent's status (draft, building, ready, deployed)
    Status { id: String, status: String },
    /// Delete an agent
    Delete { id: String },
}

#[derive(Subcommand)]
enum GraphAction {
    /// Show nodes and edges
    Show { agent: String },
    /// Add a node by kind (`web`) or palette entry (`web-agent`)
    AddNode {
        agent: String,
        kind: String,
        #[arg(short, long)]
        label: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, requires = "y", allow_negative_numbers = true)]
        x: Option<f64>,
        #[arg(long, requires = "x", allow_negative_numbers = true)]
        y: Option<f64>,
    },
    /// Connect two nodes
    Connect {
        agent: String,
        source: String,
        target: String,
        #[arg(long)]
        source_handle: Option<String>,
        #[arg(long)]
        target_handle: Option<String>,
    },
    /// Move a node
    Move {
        agent: String,
        node: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Edit a node's label, description and properties
    Edit {
        agent: String,
        node: String,
        #[arg(short, long)]
        label: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Set a property; repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
        /// Remove a property; repeatable
        #[arg(long = "unset", value_name = "KEY")]
        unset: Vec<String>,
    },
    /// Remove a node and every edge touching it
    RemoveNode { agent: String, node: String },
    /// Remove an edge
    RemoveEdge { agent: String, edge: String },
    /// Report dangling edges, self-loops and repeated connections
    Check { agent: String },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List domains and their sub-domains
    Domains,
    /// List capabilities
    Capabilities,
    /// List integrations
    Integrations,
    /// List node palette entries
    Nodes {
        /// Case-insensitive filter on name or description
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List description suggestions
    Suggestions,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset configuration to defaults
    Reset,
    /// Show config file path
    Path,
}

/// How results are printed
#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Print `value` as JSON, or run `text` for the text format
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }

    /// Confirmation line, suppressed by `--quiet` and JSON output
    fn note(&self, message: impl AsRef<str>) {
        if !self.quiet && !self.is_json() {
            println!("{}", message.as_ref());
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    let default_directive = if cli.quiet {
        "agentcanvas=warn"
    } else {
        "agentcanvas=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn report_error(error: &anyhow::Error) {
    match error.downcast_ref::<agentcanvas_core::Error>() {
        Some(core) => {
            eprintln!("Error [{}]: {}", core.code(), core);
            if let Some(suggestion) = core.suggestion() {
                eprintln!("  Try: {}", suggestion);
            }
        }
        None => eprintln!("Error: {:#}", error),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let out = Output {
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Config { action } => cmd_config(action, out),
        Commands::Catalog { action } => cmd_catalog(action, out),
        command => {
            let config = Config::load()?;
            let location = if cli.memory {
                StoreLocation::Memory
            } else if let Some(path) = cli.database {
                StoreLocation::Sqlite(path)
            } else {
                StoreLocation::from_config(&config)
            };
            debug!(%location, "Opening workspace");

            let workspace = Workspace::open(config, location).await?;
            let result = match command {
                Commands::Create {
                    name,
                    description,
                    domain,
                    subdomains,
                    capabilities,
                    integrations,
                } => {
                    let request = CreateRequest {
                        name,
                        description,
                        domain,
                        subdomains,
                        capabilities,
                        integrations,
                    };
                    cmd_create(workspace.store(), request, out).await
                }
                Commands::Agents { action } => cmd_agents(workspace.store(), action, out).await,
                Commands::Graph { action } => cmd_graph(&workspace, action, out).await,
                Commands::Doctor => cmd_doctor(&workspace, out).await,
                Commands::Config { .. } | Commands::Catalog { .. } => Ok(()),
            };
            workspace.close().await;
            result
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve an agent by full id or unique id prefix
async fn resolve_agent(store: &AgentStore, id: &str) -> anyhow::Result<Agent> {
    if let Some(agent) = store.get_agent(id).await {
        return Ok(agent);
    }

    let mut matches: Vec<Agent> = store
        .list_agents()
        .await
        .into_iter()
        .filter(|agent| agent.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => Err(agentcanvas_core::Error::AgentNotFound(id.to_string()).into()),
        1 => Ok(matches.remove(0)),
        n => Err(anyhow::anyhow!(
            "Agent id prefix '{}' is ambiguous ({} matches). Use more characters.",
            id,
            n
        )),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Split `KEY=VALUE`
fn parse_assignment(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow::anyhow!("Property key must not be empty in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

/// What to add for `graph add-node <kind>`
fn resolve_node_template(kind: &str) -> anyhow::Result<(NodeKind, &'static str, &'static str)> {
    if let Some(item) = palette::find_item(kind) {
        return Ok((item.kind, item.name, item.description));
    }
    match NodeKind::parse(kind) {
        Some(kind) => {
            let description = palette::items()
                .find(|item| item.kind == kind)
                .map(|item| item.description)
                .unwrap_or_default();
            Ok((kind, kind.display_name(), description))
        }
        None => Err(anyhow::anyhow!(
            "Unknown node kind '{}'. Run `agentcanvas catalog nodes` to see the palette.",
            kind
        )),
    }
}

fn print_agent(agent: &Agent, current: bool) {
    println!("Agent: {}{}", agent.name, if current { " (current)" } else { "" });
    println!("  ID: {}", agent.id);
    println!("  Status: {}", agent.status.label());
    println!("  Domain: {}", agent.domain);
    if !agent.description.is_empty() {
        println!("  Description: {}", agent.description);
    }
    if !agent.subdomains.is_empty() {
        println!("  Sub-domains: {}", agent.subdomains.join(", "));
    }
    if !agent.capabilities.is_empty() {
        println!("  Capabilities: {}", agent.capabilities.join(", "));
    }
    if !agent.integrations.is_empty() {
        println!("  Integrations: {}", agent.integrations.join(", "));
    }
    println!("  Graph: {} nodes, {} edges", agent.nodes.len(), agent.edges.len());
    println!("  Created: {}", agent.created_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Updated: {}", agent.updated_at.format("%Y-%m-%d %H:%M:%S"));
}

// ============================================================================
// Command Implementations
// ============================================================================

struct CreateRequest {
    name: String,
    description: String,
    domain: String,
    subdomains: Vec<String>,
    capabilities: Vec<String>,
    integrations: Vec<String>,
}

async fn cmd_create(store: &AgentStore, request: CreateRequest, out: Output) -> anyhow::Result<()> {
    let mut wizard = AgentWizard::new();

    wizard.select_domain(request.domain);
    if !request.subdomains.is_empty() {
        let preset = wizard.draft().subdomains.clone();
        for subdomain in preset.iter().filter(|s| !request.subdomains.contains(s)) {
            wizard.toggle_subdomain(subdomain);
        }
        for subdomain in request.subdomains.iter().filter(|s| !preset.contains(s)) {
            wizard.toggle_subdomain(subdomain);
        }
    }
    wizard.set_name(request.name);
    wizard.set_description(request.description);
    for capability in &request.capabilities {
        wizard.toggle_capability(capability);
    }
    for integration in &request.integrations {
        wizard.toggle_integration(integration);
    }

    let id = loop {
        match wizard.next(store).await? {
            Advance::Moved(step) => debug!(%step, "Wizard advanced"),
            Advance::Created(id) => break id,
            Advance::Invalid => {
                let messages: Vec<&str> = wizard.errors().values().map(String::as_str).collect();
                return Err(anyhow::anyhow!(
                    "Cannot create agent ({} step): {}",
                    wizard.step(),
                    messages.join("; ")
                ));
            }
        }
    };

    let agent = resolve_agent(store, &id).await?;
    out.emit(&agent, || {
        if out.quiet {
            println!("{}", agent.id);
        } else {
            println!("Agent created successfully!");
            println!("  ID: {}", agent.id);
            println!("  Name: {}", agent.name);
            println!("  Domain: {}", agent.domain);
            println!("\nNext steps:");
            println!("  1. Run `agentcanvas graph show {}` to see its workflow", short_id(&agent.id));
            println!("  2. Run `agentcanvas graph add-node {} web-agent` to add a node", short_id(&agent.id));
        }
    })
}

async fn cmd_agents(store: &AgentStore, action: AgentAction, out: Output) -> anyhow::Result<()> {
    match action {
        AgentAction::List => {
            let cards = agent_cards(store).await;
            out.emit(&cards, || {
                if cards.is_empty() {
                    if !out.quiet {
                        println!("No agents yet.");
                        println!("\nCreate one with: agentcanvas create --name <name> --description <text> --domain <domain> --capability <id>");
                    }
                    return;
                }
                if !out.quiet {
                    println!("Agents:");
                }
                for card in &cards {
                    println!(
                        "{} {} - {} [{}] {} ({} nodes) -> {}{}",
                        if card.current { "*" } else { " " },
                        short_id(&card.id),
                        card.name,
                        card.status_label,
                        card.updated,
                        card.node_count,
                        card.action.label(),
                        if card.action_enabled { "" } else { " (disabled)" }
                    );
                }
            })
        }
        AgentAction::Show { id } => {
            let agent = resolve_agent(store, &id).await?;
            let current = store.current_agent_id().await.as_deref() == Some(agent.id.as_str());
            out.emit(&agent, || print_agent(&agent, current))
        }
        AgentAction::Current => {
            let agent = store.current_agent().await;
            out.emit(&agent, || match &agent {
                Some(agent) => print_agent(agent, true),
                None => println!("No agent selected."),
            })
        }
        AgentAction::Select { id } => {
            let agent = resolve_agent(store, &id).await?;
            store.set_current_agent(agent.id.clone()).await?;
            out.emit(&json!({ "currentAgentId": agent.id }), || {
                out.note(format!("Selected agent '{}' ({}).", agent.name, short_id(&agent.id)))
            })
        }
        AgentAction::Status { id, status } => {
            let status = AgentStatus::parse(&status.to_lowercase()).ok_or_else(|| {
                let known: Vec<&str> = AgentStatus::ALL.iter().map(|s| s.as_str()).collect();
                anyhow::anyhow!("Unknown status '{}'. Expected one of: {}", status, known.join(", "))
            })?;
            let agent = resolve_agent(store, &id).await?;
            store
                .update_agent(&agent.id, AgentUpdate::new().status(status))
                .await?;
            out.emit(&json!({ "id": agent.id, "status": status }), || {
                out.note(format!("Agent '{}' is now {}.", agent.name, status.label()))
            })
        }
        AgentAction::Delete { id } => {
            let agent = resolve_agent(store, &id).await?;
            store.delete_agent(&agent.id).await?;
            out.emit(&json!({ "deleted": agent.id }), || {
                out.note(format!("Agent '{}' deleted.", agent.name))
            })
        }
    }
}

async fn cmd_graph(workspace: &Workspace, action: GraphAction, out: Output) -> anyhow::Result<()> {
    let store = workspace.store();
    let editor_config = &workspace.config().editor;

    match action {
        GraphAction::Show { agent } => {
            let agent = resolve_agent(store, &agent).await?;
            let main_position = Position::new(editor_config.default_node_x, editor_config.default_node_y);
            let (graph, origin) = WorkflowGraph::load(&agent, main_position);
            let value = json!({
                "agentId": agent.id,
                "seeded": origin == GraphOrigin::Seeded,
                "nodes": graph.nodes(),
                "edges": graph.edges(),
            });
            out.emit(&value, || {
                println!("Workflow: {} ({})", agent.name, short_id(&agent.id));
                if origin == GraphOrigin::Seeded {
                    println!("  (no saved graph yet; showing the starting node)");
                }
                println!("Nodes:");
                for node in graph.nodes() {
                    println!(
                        "  {} - {} [{}] at ({}, {})",
                        node.id,
                        node.label(),
                        node.type_tag(),
                        node.position.x,
                        node.position.y
                    );
                    for (key, value) in &node.data.properties {
                        println!("      {} = {}", key, value);
                    }
                }
                println!("Edges:");
                if graph.edges().is_empty() {
                    println!("  (none)");
                }
                for edge in graph.edges() {
                    println!("  {} -> {} ({})", edge.source, edge.target, edge.id);
                }
            })
        }
        GraphAction::AddNode {
            agent,
            kind,
            label,
            description,
            x,
            y,
        } => {
            let (kind, default_label, default_description) = resolve_node_template(&kind)?;
            let position = x.zip(y).map(|(x, y)| Position::new(x, y));
            let agent = resolve_agent(store, &agent).await?;

            let mut editor = WorkflowEditor::open(store, &agent.id, editor_config).await?;
            let node_id = editor.add_node(
                kind,
                label.unwrap_or_else(|| default_label.to_string()),
                description.unwrap_or_else(|| default_description.to_string()),
                position,
            )?;
            editor.close().await?;

            out.emit(&json!({ "nodeId": node_id }), || {
                if out.quiet {
                    println!("{}", node_id);
                } else {
                    println!("Added node {}", node_id);
                }
            })
        }
        GraphAction::Connect {
            agent,
            source,
            target,
            source_handle,
            target_handle,
        } => {
            let agent = resolve_agent(store, &agent).await?;
            let mut editor = WorkflowEditor::open(store, &agent.id, editor_config).await?;
            let edge_id = editor.connect(
                &source,
                source_handle.as_deref(),
                &target,
                target_handle.as_deref(),
            )?;
            editor.close().await?;

            out.emit(&json!({ "edgeId": edge_id }), || {
                if out.quiet {
                    println!("{}", edge_id);
                } else {
                    println!("Connected {} -> {} ({})", source, target, edge_id);
                }
            })
        }
        GraphAction::Move { agent, node, x, y } => {
            let agent = resolve_agent(store, &agent).await?;
            let mut editor = WorkflowEditor::open(store, &agent.id, editor_config).await?;
            editor.move_node(&node, Position::new(x, y))?;
            editor.close().await?;

            out.emit(&json!({ "nodeId": node, "position": { "x": x, "y": y } }), || {
                out.note(format!("Moved {} to ({}, {})", node, x, y))
            })
        }
        GraphAction::Edit {
            agent,
            node,
            label,
            description,
            set,
            unset,
        } => {
            let assignments = set
                .iter()
                .map(|raw| parse_assignment(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let agent = resolve_agent(store, &agent).await?;
            let mut editor = WorkflowEditor::open(store, &agent.id, editor_config).await?;

            let form = editor.select_node(&node)?;
            if let Some(label) = label {
                form.set_label(label);
            }
            if let Some(description) = description {
                form.set_description(description);
            }
            for key in &unset {
                form.remove_property(key);
            }
            for (key, value) in assignments {
                form.set_property(key, value);
            }
            let settings = form.clone();
            editor.save_settings()?;
            editor.close().await?;

            out.emit(&settings, || {
                out.note(format!("Updated {} ({})", settings.label, settings.node_id))
            })
        }
        GraphAction::RemoveNode { agent, node } => {
            let agent = resolve_agent(store, &agent).await?;
            let mut editor = WorkflowEditor::open(store, &agent.id, editor_config).await?;
            let removed_edges = editor.remove_node(&node)?;
            editor.close().await?;

            out.emit(&json!({ "nodeId": node, "removedEdges": removed_edges }), || {
                out.note(format!("Removed {} and {} connected edge(s)", node, removed_edges))
            })
        }
        GraphAction::RemoveEdge { agent, edge } => {
            let agent = resolve_agent(store, &agent).await?;
            let mut editor = WorkflowEditor::open(store, &agent.id, editor_config).await?;
            let removed = editor.remove_edge(&edge)?;
            editor.close().await?;

            if !removed {
                return Err(anyhow::anyhow!(
                    "Edge '{}' not found. Run `agentcanvas graph show {}` to see the agent's edges.",
                    edge,
                    short_id(&agent.id)
                ));
            }
            out.emit(&json!({ "edgeId": edge }), || out.note(format!("Removed edge {}", edge)))
        }
        GraphAction::Check { agent } => {
            let agent = resolve_agent(store, &agent).await?;
            let graph = WorkflowGraph::new(agent.nodes.clone(), agent.edges.clone());
            let report = graph.check();

            out.emit(&report, || {
                println!(
                    "{} nodes, {} edges",
                    report.node_count, report.edge_count
                );
                if report.is_clean() {
                    println!("[OK] No dangling edges, self-loops or repeated connections");
                    return;
                }
                for id in &report.dangling_edges {
                    println!("[!!] Dangling edge: {}", id);
                }
                for id in &report.self_loops {
                    println!("[--] Self-loop: {}", id);
                }
                for id in &report.parallel_edges {
                    println!("[--] Repeated connection: {}", id);
                }
            })
        }
    }
}

fn cmd_catalog(action: CatalogAction, out: Output) -> anyhow::Result<()> {
    match action {
        CatalogAction::Domains => out.emit(&DOMAINS, || {
            for domain in DOMAINS {
                println!("{} - {}", domain.id, domain.name);
                if !out.quiet {
                    for subdomain in domain.subdomains {
                        println!("    {}", subdomain);
                    }
                }
            }
        }),
        CatalogAction::Capabilities => out.emit(&CAPABILITIES, || {
            for capability in CAPABILITIES {
                println!("{} - {}: {}", capability.id, capability.name, capability.description);
            }
        }),
        CatalogAction::Integrations => out.emit(&INTEGRATIONS, || {
            for integration in INTEGRATIONS {
                println!(
                    "{} - {}{}",
                    integration.id,
                    integration.name,
                    if integration.popular { " (popular)" } else { "" }
                );
            }
        }),
        CatalogAction::Nodes { search } => {
            let categories = palette::search(search.as_deref().unwrap_or_default());
            out.emit(&categories, || {
                if categories.is_empty() {
                    println!("No nodes match.");
                }
                for category in &categories {
                    println!("{}:", category.name);
                    for item in &category.items {
                        println!("  {} [{}] - {}", item.id, item.kind, item.description);
                    }
                }
            })
        }
        CatalogAction::Suggestions => out.emit(&DESCRIPTION_SUGGESTIONS, || {
            for suggestion in DESCRIPTION_SUGGESTIONS {
                println!("{}", suggestion);
            }
        }),
    }
}

fn cmd_config(action: ConfigAction, out: Output) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            let mut map = serde_json::Map::new();
            map.insert(key, json!(value));
            out.emit(&map, || println!("{}", value))?;
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            out.note(format!("Set {} = {}", key, value));
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            let map: serde_json::Map<String, serde_json::Value> = items
                .iter()
                .map(|(key, value)| (key.clone(), json!(value)))
                .collect();
            out.emit(&map, || {
                for (key, value) in &items {
                    println!("{} = {}", key, value);
                }
            })?;
        }
        ConfigAction::Reset => {
            Config::reset()?;
            out.note("Configuration reset to defaults.");
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            out.emit(&json!({ "path": path }), || println!("{}", path.display()))?;
        }
    }
    Ok(())
}

async fn cmd_doctor(workspace: &Workspace, out: Output) -> anyhow::Result<()> {
    let report = workspace.doctor().await?;

    out.emit(&report, || {
        if out.quiet {
            println!("{}", if report.is_healthy() { "ok" } else { "unhealthy" });
            return;
        }

        println!("AgentCanvas Health Check");
        println!("========================");
        println!();

        match Config::config_path() {
            Ok(path) if path.exists() => println!("[OK] Config file: {}", path.display()),
            Ok(path) => println!("[--] Config file: {} (using defaults)", path.display()),
            Err(e) => println!("[!!] Config file: Error - {}", e),
        }

        match report.database_healthy {
            Some(true) => println!("[OK] Database: Connected"),
            Some(false) => println!("[!!] Database: Health check failed"),
            None => println!("[--] Database: none (in-memory session)"),
        }
        println!("     Location: {}", report.location);
        if let (Some(current), Some(target)) = (report.schema_version, report.target_schema_version) {
            if current == target {
                println!("[OK] Database: Schema v{}", current);
            } else {
                println!("[!!] Database: Migrations pending (v{} -> v{})", current, target);
            }
        }

        match &report.snapshot {
            SnapshotHealth::Ok { bytes } => {
                println!("[OK] Snapshot '{}': {} bytes", report.storage_key, bytes)
            }
            SnapshotHealth::Partial { bytes, skipped } => {
                println!(
                    "[!!] Snapshot '{}': {} bytes, {} record(s) skipped",
                    report.storage_key,
                    bytes,
                    skipped.len()
                );
                for reason in skipped {
                    println!("     - {}", reason);
                }
            }
            SnapshotHealth::Missing => {
                println!("[--] Snapshot '{}': not written yet", report.storage_key)
            }
            SnapshotHealth::Unreadable { reason } => {
                println!("[!!] Snapshot '{}': {}", report.storage_key, reason)
            }
        }
        println!("     Agents: {}", report.agent_count);
        if let Some(bytes) = report.corrupt_backup {
            println!(
                "[--] Backup '{}.corrupt': {} bytes kept from an unreadable snapshot",
                report.storage_key, bytes
            );
        }
        if report.dangling_edges > 0 {
            println!("[!!] Dangling edges: {}", report.dangling_edges);
        }

        println!();
        if report.is_healthy() {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    })
}
