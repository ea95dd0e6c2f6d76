//! Static choices offered while creating an agent

use serde::Serialize;

/// Domain id that carries no predefined sub-domains
pub const CUSTOM_DOMAIN: &str = "custom";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DomainOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub subdomains: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntegrationOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub popular: bool,
}

pub const DOMAINS: &[DomainOption] = &[
    DomainOption {
        id: "finance",
        name: "Finance Agents",
        description: "Smart financial automation, savings insights, and optimization",
        subdomains: &[
            "Expenditure Insights & Budgeting Agent",
            "Smart Portfolio Optimizer Agent",
            "Subscription & Recurring Expense Manager",
            "AI-Powered Financial Health Monitor",
        ],
    },
    DomainOption {
        id: "productivity",
        name: "Personal Productivity & App Automation",
        description: "Supercharging user interactions across email, messages, meetings, and more",
        subdomains: &[
            "Smart Email Summarizer & Auto-Responder",
            "Calendar & Meeting Intelligence Agent",
            "Thought-to-Task AI Assistant",
            "Social Media Engagement Analyzer",
        ],
    },
    DomainOption {
        id: "education",
        name: "Education Agents",
        description: "Personalized learning, career planning, and intelligent research",
        subdomains: &[
            "AI Research Summarizer & Reference Finder",
            "Career Pathway & Skill Growth Coach",
            "Adaptive Study Planner & Learning Tracker",
            "Exam & Assignment Scheduler Agent",
        ],
    },
    DomainOption {
        id: "sports",
        name: "Sports Intelligence Agents",
        description: "Performance, predictions, and player improvement",
        subdomains: &[
            "Athlete Performance & Biomechanics Analyzer",
            "Match Predictor & Strategy Analyzer",
            "Injury Risk & Load Management Agent",
        ],
    },
    DomainOption {
        id: "software-dev",
        name: "Software Development Agents",
        description: "Boosting developer productivity with intelligent automation",
        subdomains: &[
            "CI/CD Pipeline & DevOps Flow Optimizer",
            "AI Code Companion & Refactoring Agent",
            "API Documentation & Auto-Testing Agent",
            "Bug Tracker & Issue Prioritizer",
        ],
    },
    DomainOption {
        id: CUSTOM_DOMAIN,
        name: "Custom Domain",
        description: "Create a specialized agent for your unique needs",
        subdomains: &[],
    },
];

pub const CAPABILITIES: &[CapabilityOption] = &[
    CapabilityOption {
        id: "data-processing",
        name: "Data Processing",
        description: "Extract, transform, and analyze data from various sources",
    },
    CapabilityOption {
        id: "integration",
        name: "External Services Integration",
        description: "Connect and interact with external APIs and services",
    },
    CapabilityOption {
        id: "content-generation",
        name: "Content Generation",
        description: "Create text, images, or other media based on prompts",
    },
    CapabilityOption {
        id: "monitoring",
        name: "Monitoring & Alerts",
        description: "Monitor data sources and send alerts based on conditions",
    },
];

pub const INTEGRATIONS: &[IntegrationOption] = &[
    IntegrationOption {
        id: "google",
        name: "Google Workspace",
        description: "Integrate with Gmail, Google Drive, Calendar, and other Google services",
        popular: true,
    },
    IntegrationOption {
        id: "slack",
        name: "Slack",
        description: "Send notifications and interact with users through Slack",
        popular: true,
    },
    IntegrationOption {
        id: "github",
        name: "GitHub",
        description: "Manage repositories, issues, and pull requests",
        popular: false,
    },
    IntegrationOption {
        id: "notion",
        name: "Notion",
        description: "Create and update pages and databases in Notion",
        popular: true,
    },
    IntegrationOption {
        id: "zapier",
        name: "Zapier",
        description: "Connect to thousands of apps through Zapier",
        popular: false,
    },
    IntegrationOption {
        id: "twitter",
        name: "Twitter",
        description: "Post tweets and monitor mentions and hashtags",
        popular: false,
    },
    IntegrationOption {
        id: "database",
        name: "Database Connectors",
        description: "Connect to SQL, MongoDB, and other databases",
        popular: false,
    },
    IntegrationOption {
        id: "custom-api",
        name: "Custom API",
        description: "Connect to your own REST API endpoints",
        popular: false,
    },
];

/// Phrases that can be appended to an agent description
pub const DESCRIPTION_SUGGESTIONS: &[&str] = &[
    "Monitor my social media for mentions and respond",
    "Analyze financial data and create reports",
    "Schedule and manage my calendar events",
    "Extract data from websites and organize it",
    "Automate customer support replies",
    "Generate weekly summaries of news in my industry",
];

pub fn domain(id: &str) -> Option<&'static DomainOption> {
    DOMAINS.iter().find(|domain| domain.id == id)
}

pub fn capability(id: &str) -> Option<&'static CapabilityOption> {
    CAPABILITIES.iter().find(|capability| capability.id == id)
}

pub fn integration(id: &str) -> Option<&'static IntegrationOption> {
    INTEGRATIONS.iter().find(|integration| integration.id == id)
}

/// Integrations split into (popular, others), each in catalog order
pub fn integrations_by_popularity() -> (Vec<&'static IntegrationOption>, Vec<&'static IntegrationOption>) {
    INTEGRATIONS.iter().partition(|integration| integration.popular)
}
