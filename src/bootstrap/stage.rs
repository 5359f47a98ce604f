//! Bootstrap stages

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the bootstrap sequence. Stages run strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    SelectRuntime,
    Materialize,
    CreateEnv,
    InstallDeps,
    Launch,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::SelectRuntime,
        Stage::Materialize,
        Stage::CreateEnv,
        Stage::InstallDeps,
        Stage::Launch,
    ];

    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::SelectRuntime => Some(Stage::Materialize),
            Stage::Materialize => Some(Stage::CreateEnv),
            Stage::CreateEnv => Some(Stage::InstallDeps),
            Stage::InstallDeps => Some(Stage::Launch),
            Stage::Launch => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SelectRuntime => "select-runtime",
            Stage::Materialize => "materialize",
            Stage::CreateEnv => "create-env",
            Stage::InstallDeps => "install-deps",
            Stage::Launch => "launch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_walks_all_stages_in_order() {
        let mut walked = vec![Stage::SelectRuntime];
        while let Some(next) = walked.last().and_then(|s| s.next()) {
            walked.push(next);
        }
        assert_eq!(walked, Stage::ALL.to_vec());
    }

    #[test]
    fn test_ordering_matches_sequence() {
        assert!(Stage::Materialize < Stage::CreateEnv);
        assert!(Stage::InstallDeps < Stage::Launch);
        assert_eq!(Stage::ALL.last(), Some(&Stage::Launch));
    }

    #[test]
    fn test_display() {
        assert_eq!(Stage::InstallDeps.to_string(), "install-deps");
    }
}
