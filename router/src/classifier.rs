use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// Which indexes a query should consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    StructuredOnly,
    SemanticOnly,
    Hybrid,
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoutingDecision::StructuredOnly => "structured_only",
            RoutingDecision::SemanticOnly => "semantic_only",
            RoutingDecision::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// Keyword and pattern hits extracted from a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySignals {
    /// Explicit tabular vocabulary: table, row, column, cell, exact
    pub structured_terms: usize,
    /// Financial or quantitative measures (EBITDA, revenue, ...)
    pub metric_terms: usize,
    /// Dates, periods and fiscal tokens
    pub temporal_tokens: usize,
    /// Verbs asking for prose: explain, summarize, why, describe, how
    pub explanatory_terms: usize,
    /// Digits, currency or percent signs
    pub numeric: bool,
}

impl QuerySignals {
    fn metric_with_period(&self) -> bool {
        self.metric_terms > 0 && self.temporal_tokens > 0
    }

    fn explanatory(&self) -> bool {
        self.explanatory_terms > 0
    }

    fn quantitative(&self) -> bool {
        self.metric_terms > 0 || self.numeric
    }
}

/// One row of the decision table
#[derive(Clone, Copy)]
pub struct RoutingRule {
    pub name: &'static str,
    pub predicate: fn(&QuerySignals) -> bool,
    pub decision: RoutingDecision,
}

impl fmt::Debug for RoutingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingRule")
            .field("name", &self.name)
            .field("decision", &self.decision)
            .finish()
    }
}

/// Rules in priority order; the first matching predicate decides.
static RULES: &[RoutingRule] = &[
    RoutingRule {
        name: "structured_lookup",
        predicate: |s| s.structured_terms > 0 || (s.metric_with_period() && !s.explanatory()),
        decision: RoutingDecision::StructuredOnly,
    },
    RoutingRule {
        name: "explanatory",
        predicate: |s| s.explanatory() && !s.metric_with_period(),
        decision: RoutingDecision::SemanticOnly,
    },
    RoutingRule {
        name: "quantitative_explanation",
        predicate: |s| s.quantitative() && s.explanatory(),
        decision: RoutingDecision::Hybrid,
    },
    RoutingRule {
        name: "default",
        predicate: |_| true,
        decision: RoutingDecision::Hybrid,
    },
];

/// Outcome of classification with the rule that fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub decision: RoutingDecision,
    pub rule: &'static str,
    pub signals: QuerySignals,
}

/// Pure keyword/pattern classifier. Never touches the network.
pub struct QueryClassifier {
    temporal_pattern: Regex,
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClassifier {
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            // Months, "may 2025", years, quarters/halves, fiscal years and period words.
            // Bare "may" is left out so the modal verb does not count as a date.
            temporal_pattern: Regex::new(
                r"\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?|may\s+\d{4}|(?:19|20)\d{2}|q[1-4]|h[12]|fy\s?\d{2,4}|ytd|qtd|mtd|quarter(?:ly)?|annual(?:ly)?|monthly|yearly|yoy)\b",
            )
            .expect("Valid regex"),
        }
    }

    /// The decision table, highest priority first
    pub fn rules() -> &'static [RoutingRule] {
        RULES
    }

    pub fn classify(&self, query: &str) -> RoutingDecision {
        self.classify_detailed(query).decision
    }

    /// Classify and report which rule fired
    pub fn classify_detailed(&self, query: &str) -> Classification {
        let signals = self.signals(query);
        let rule = RULES
            .iter()
            .find(|rule| (rule.predicate)(&signals))
            .unwrap_or(&RULES[RULES.len() - 1]);

        debug!(
            decision = %rule.decision,
            rule = rule.name,
            ?signals,
            "classified query"
        );

        Classification {
            decision: rule.decision,
            rule: rule.name,
            signals,
        }
    }

    /// Extract keyword and pattern signals
    pub fn signals(&self, query: &str) -> QuerySignals {
        let lower = query.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .map(|w| w.trim_matches('-'))
            .filter(|w| !w.is_empty())
            .collect();

        let count_in = |vocabulary: &[&str]| {
            words.iter().filter(|w| vocabulary.contains(*w)).count()
        };

        QuerySignals {
            structured_terms: count_in(Self::structured_keywords()),
            metric_terms: count_in(Self::metric_keywords())
                + Self::metric_phrases()
                    .iter()
                    .filter(|phrase| lower.contains(*phrase))
                    .count(),
            temporal_tokens: self.temporal_pattern.find_iter(&lower).count(),
            explanatory_terms: count_in(Self::explanatory_keywords()),
            numeric: lower
                .chars()
                .any(|c| c.is_ascii_digit() || c == '%' || c == '$'),
        }
    }

    fn structured_keywords() -> &'static [&'static str] {
        static KEYWORDS: &[&str] = &[
            "table", "tables", "row", "rows", "column", "columns", "cell", "cells", "exact",
            "exactly",
        ];
        KEYWORDS
    }

    fn explanatory_keywords() -> &'static [&'static str] {
        static KEYWORDS: &[&str] = &[
            "explain",
            "explains",
            "explaining",
            "explanation",
            "summarize",
            "summarise",
            "summary",
            "why",
            "describe",
            "describes",
            "description",
            "how",
        ];
        KEYWORDS
    }

    fn metric_keywords() -> &'static [&'static str] {
        static KEYWORDS: &[&str] = &[
            "ebitda",
            "ebit",
            "revenue",
            "revenues",
            "sales",
            "profit",
            "profits",
            "margin",
            "margins",
            "income",
            "earnings",
            "eps",
            "cost",
            "costs",
            "expense",
            "expenses",
            "opex",
            "capex",
            "budget",
            "headcount",
            "price",
            "volume",
            "growth",
            "total",
            "average",
            "count",
            "sum",
            "percentage",
            "rate",
            "balance",
            "debt",
            "assets",
            "liabilities",
        ];
        KEYWORDS
    }

    fn metric_phrases() -> &'static [&'static str] {
        static PHRASES: &[&str] = &[
            "cash flow",
            "gross margin",
            "net income",
            "operating income",
        ];
        PHRASES
    }
}

/// Classify with a shared default classifier
pub fn classify(query: &str) -> RoutingDecision {
    static CLASSIFIER: OnceLock<QueryClassifier> = OnceLock::new();
    CLASSIFIER.get_or_init(QueryClassifier::new).classify(query)
}
