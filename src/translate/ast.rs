//! LogQL / LogsQL Syntax Trees
//!
//! The subset of LogQL the bridge understands, and the flat LogsQL
//! conjunction it renders to.
//!
//! # Example
//!
//! ```text
//! {app="foo", env="prod"} | json | level="error"
//!   => app: "foo" and env: "prod" and level: "error"
//! ```

use std::fmt;

/// A parsed LogQL query: stream selector plus pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceQuery {
    /// Equality matchers from the `{...}` stream selector, in source order
    pub selector: Vec<Matcher>,
    /// Pipeline stages following the selector, in source order
    pub stages: Vec<Stage>,
}

impl SourceQuery {
    /// Lower the query to a LogsQL conjunction.
    ///
    /// Selector matchers come first, then stage filters. Format markers and
    /// unsupported stages contribute nothing.
    pub fn to_target(&self) -> TargetQuery {
        let selector_terms = self.selector.iter().map(Term::from);
        let stage_terms = self.stages.iter().filter_map(|stage| match stage {
            Stage::Filter(matcher) => Some(Term::from(matcher)),
            Stage::Format(_) | Stage::Unsupported(_) => None,
        });

        TargetQuery {
            terms: selector_terms.chain(stage_terms).collect(),
        }
    }
}

/// A `name = value` equality matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub name: String,
    pub value: String,
}

impl Matcher {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parser stages that only tell Loki how to read the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatMarker {
    Json,
    Logfmt,
}

impl FormatMarker {
    /// Match a stage against the known markers, ignoring case
    pub fn from_stage(stage: &str) -> Option<Self> {
        if stage.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else if stage.eq_ignore_ascii_case("logfmt") {
            Some(Self::Logfmt)
        } else {
            None
        }
    }
}

/// One `|`-separated pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// `json` / `logfmt`, a no-op for the backend
    Format(FormatMarker),
    /// `field="value"` label filter
    Filter(Matcher),
    /// Anything else; kept for diagnostics, never rendered
    Unsupported(String),
}

/// A single `field: "value"` LogsQL filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub field: String,
    pub value: String,
}

impl From<&Matcher> for Term {
    fn from(matcher: &Matcher) -> Self {
        Self {
            field: matcher.name.clone(),
            value: matcher.value.clone(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{}\"", self.field, self.value)
    }
}

/// A flat LogsQL conjunction of field filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetQuery {
    pub terms: Vec<Term>,
}

impl TargetQuery {
    /// An empty conjunction renders as the empty string (match everything)
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for TargetQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}
