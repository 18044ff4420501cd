//! Chooses which Harvest time report a query is asking for.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDimension {
    Clients,
    Tasks,
    Team,
    Projects,
}

impl ReportDimension {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Clients => "/reports/time/clients",
            Self::Tasks => "/reports/time/tasks",
            Self::Team => "/reports/time/team",
            Self::Projects => "/reports/time/projects",
        }
    }
}

impl fmt::Display for ReportDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// Checked top to bottom; the first rule with a matching phrase wins.
const RULES: [(&[&str], ReportDimension); 3] = [
    (&["by client", "for client"], ReportDimension::Clients),
    (&["by task", "tasks"], ReportDimension::Tasks),
    (&["by team", "by user"], ReportDimension::Team),
];

/// Routes a report query to its endpoint, defaulting to the project report.
pub fn route(text: &str) -> ReportDimension {
    let lowercase_text = text.to_lowercase();
    RULES
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| lowercase_text.contains(p)))
        .map_or(ReportDimension::Projects, |(_, dimension)| *dimension)
}
