//! Analysis kinds exercised by the harness.
//!
//! Every fixture tree lives under `<test-root>/<kind-dir>/<name>/`; the kind
//! decides which tool is driven and how its output is captured.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of analysis categories, one executor each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Lexer,
    Parser,
    #[serde(rename = "simulink_parser")]
    ModelParser,
    ConfigParser,
    Style,
    Metrics,
    Lint,
    Sanity,
}

impl TestKind {
    /// Default discovery order when no suite is selected.
    pub const ALL: [TestKind; 8] = [
        TestKind::Lexer,
        TestKind::Parser,
        TestKind::ModelParser,
        TestKind::ConfigParser,
        TestKind::Style,
        TestKind::Metrics,
        TestKind::Lint,
        TestKind::Sanity,
    ];

    /// Directory under the test root holding this kind's fixtures. Also used
    /// as the kind component of coverage snapshot names.
    pub fn dir_name(self) -> &'static str {
        match self {
            TestKind::Lexer => "lexer",
            TestKind::Parser => "parser",
            TestKind::ModelParser => "simulink_parser",
            TestKind::ConfigParser => "config_parser",
            TestKind::Style => "style",
            TestKind::Metrics => "metrics",
            TestKind::Lint => "lint",
            TestKind::Sanity => "sanity",
        }
    }

    /// Label used in status lines (`Ran <label> test <name>`).
    pub fn label(self) -> &'static str {
        match self {
            TestKind::Lexer => "lexer",
            TestKind::Parser => "parser",
            TestKind::ModelParser => "simulink parser",
            TestKind::ConfigParser => "config parser",
            TestKind::Style => "style",
            TestKind::Metrics => "metrics",
            TestKind::Lint => "lint",
            TestKind::Sanity => "sanity",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
