//! Rule index.
//!
//! # Responsibilities
//! - Own every loaded [`Rule`] (arena, addressed by [`RuleId`])
//! - Group flat rules by raw full-URL pattern
//! - Group composite rules in a fixed-depth trie keyed by raw pattern
//!   (scheme → host → port → path → query)
//! - Return the candidate rules for a source URL
//!
//! # Design Decisions
//! - Built in one pass at startup, immutable afterwards (shared without locks)
//! - Trie nodes live in a `Vec` and refer to each other by index
//! - Leaves hold rule ids, not rule data
//! - Grouping only prunes work; the candidate set is exactly the set of
//!   rules whose own pattern(s) match

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::config::RouteConfig;
use crate::routing::matcher::SourcePattern;
use crate::routing::rule::{self, PatternCache, Rule, RuleError};
use crate::routing::source::{Component, SourceUrl};

/// Position of a rule in the index, in load order.
pub type RuleId = usize;

type NodeId = usize;

/// A rule that was rejected while building the index.
#[derive(Debug)]
pub struct LoadDiagnostic {
    /// Position of the record in the route file.
    pub position: usize,
    pub id: String,
    pub error: RuleError,
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load rule #{} ({:?}): {}", self.position, self.id, self.error)
    }
}

/// Flat rules sharing one raw full-URL pattern.
#[derive(Debug)]
struct UrlGroup {
    pattern: Regex,
    rules: Vec<RuleId>,
}

#[derive(Debug)]
struct TrieNode {
    pattern: Regex,
    /// Next-component nodes keyed by raw pattern.
    children: HashMap<String, NodeId>,
    /// Only populated on query-level (leaf) nodes.
    rules: Vec<RuleId>,
}

/// Immutable lookup structure over all loaded rules.
#[derive(Debug, Default)]
pub struct RuleIndex {
    rules: Vec<Rule>,
    url_groups: Vec<UrlGroup>,
    url_lookup: HashMap<String, usize>,
    nodes: Vec<TrieNode>,
    roots: HashMap<String, NodeId>,
}

impl RuleIndex {
    /// Compile and index every enabled record.
    ///
    /// Invalid records are skipped and reported; they never stop the load.
    pub fn build(records: &[RouteConfig]) -> (Self, Vec<LoadDiagnostic>) {
        let mut index = Self::default();
        let mut patterns = PatternCache::new();
        let mut diagnostics = Vec::new();

        for (position, record) in records.iter().enumerate() {
            if record.disabled {
                tracing::debug!(position, rule = %record.id, "Skipping disabled rule");
                continue;
            }

            match rule::compile(record, &mut patterns) {
                Ok(rule) => {
                    index.insert(rule);
                }
                Err(error) => {
                    let diagnostic = LoadDiagnostic {
                        position,
                        id: record.id.clone(),
                        error,
                    };
                    tracing::warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }
        }

        tracing::info!(
            loaded = index.len(),
            skipped = diagnostics.len(),
            patterns = patterns.len(),
            "Loaded {} rule(s)",
            index.len()
        );

        (index, diagnostics)
    }

    /// Register a compiled rule, reusing groups and nodes with equal raw patterns.
    pub fn insert(&mut self, rule: Rule) -> RuleId {
        let id = self.rules.len();

        match &rule.source {
            SourcePattern::Url(regex) => {
                let group = match self.url_lookup.get(regex.as_str()) {
                    Some(&group) => group,
                    None => {
                        let group = self.url_groups.len();
                        self.url_groups.push(UrlGroup {
                            pattern: regex.clone(),
                            rules: Vec::new(),
                        });
                        self.url_lookup.insert(regex.as_str().to_string(), group);
                        group
                    }
                };
                self.url_groups[group].rules.push(id);
            }
            SourcePattern::Composite(composite) => {
                let mut node = None;
                for component in Component::ALL {
                    node = Some(self.child(node, composite.pattern(component)));
                }
                if let Some(leaf) = node {
                    self.nodes[leaf].rules.push(id);
                }
            }
        }

        self.rules.push(rule);
        id
    }

    /// Find or create the child of `parent` (or a root) for `pattern`.
    fn child(&mut self, parent: Option<NodeId>, pattern: &Regex) -> NodeId {
        let siblings = match parent {
            Some(parent) => &self.nodes[parent].children,
            None => &self.roots,
        };
        if let Some(&id) = siblings.get(pattern.as_str()) {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(TrieNode {
            pattern: pattern.clone(),
            children: HashMap::new(),
            rules: Vec::new(),
        });
        let siblings = match parent {
            Some(parent) => &mut self.nodes[parent].children,
            None => &mut self.roots,
        };
        siblings.insert(pattern.as_str().to_string(), id);
        id
    }

    /// Ids of all rules whose source matches, in load order.
    pub fn candidates(&self, source: &SourceUrl) -> Vec<RuleId> {
        let mut found = Vec::new();

        for group in &self.url_groups {
            if group.pattern.is_match(source.as_str()) {
                found.extend_from_slice(&group.rules);
            }
        }
        self.descend(&self.roots, 0, source, &mut found);

        found.sort_unstable();
        found
    }

    fn descend(
        &self,
        children: &HashMap<String, NodeId>,
        depth: usize,
        source: &SourceUrl,
        found: &mut Vec<RuleId>,
    ) {
        let component = Component::ALL[depth];
        let text = source.component(component);

        for &id in children.values() {
            let node = &self.nodes[id];
            if !node.pattern.is_match(text) {
                continue;
            }
            if depth + 1 == Component::ALL.len() {
                found.extend_from_slice(&node.rules);
            } else {
                self.descend(&node.children, depth + 1, source, found);
            }
        }
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    /// All loaded rules, in load order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of distinct full-URL patterns.
    pub fn url_group_count(&self) -> usize {
        self.url_groups.len()
    }

    /// Number of composite trie nodes across all levels.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::Matcher;

    fn url_rule(id: &str, source: &str) -> RouteConfig {
        RouteConfig {
            id: id.into(),
            source_url: source.into(),
            destination_url: "https://example.com/".into(),
            ..Default::default()
        }
    }

    fn composite_rule(id: &str, parts: [&str; 5]) -> RouteConfig {
        let [scheme, host, port, path, query] = parts;
        RouteConfig {
            id: id.into(),
            source_scheme: scheme.into(),
            source_host: host.into(),
            source_port: port.into(),
            source_path: path.into(),
            source_query: query.into(),
            destination_url: "https://example.com/".into(),
            ..Default::default()
        }
    }

    fn ids(index: &RuleIndex, url: &str) -> Vec<String> {
        let src = SourceUrl::parse(url).unwrap();
        index
            .candidates(&src)
            .into_iter()
            .map(|id| index.rule(id).id.clone())
            .collect()
    }

    #[test]
    fn test_valid_rules_indexed_once_invalid_skipped() {
        let mut disabled = url_rule("off", "^http://");
        disabled.disabled = true;
        let records = vec![
            url_rule("a", "^http://"),
            url_rule("bad id!", "^http://"),
            disabled,
            url_rule("b", "("),
            composite_rule("c", ["^http$", "", "", "", ""]),
        ];

        let (index, diagnostics) = RuleIndex::build(&records);

        let loaded: Vec<&str> = index.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(loaded, ["a", "c"]);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].position, 1);
        assert_eq!(diagnostics[1].position, 3);
        assert_eq!(ids(&index, "http://x/"), ["a", "c"]);
    }

    #[test]
    fn test_disabled_rule_is_not_validated() {
        let mut broken = url_rule("", "(");
        broken.disabled = true;

        let (index, diagnostics) = RuleIndex::build(&[broken]);
        assert!(index.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_identical_patterns_share_groups_and_nodes() {
        let records = vec![
            url_rule("a", "^http://x/"),
            url_rule("b", "^http://x/"),
            url_rule("c", "^http://y/"),
            composite_rule("d", ["^https$", "^x$", "", "^/a$", ""]),
            composite_rule("e", ["^https$", "^x$", "", "^/b$", ""]),
            composite_rule("f", ["^https$", "^x$", "", "^/b$", ""]),
        ];

        let (index, _) = RuleIndex::build(&records);

        assert_eq!(index.len(), 6);
        assert_eq!(index.url_group_count(), 2);
        // scheme, host, port shared; two paths; one query under each path
        assert_eq!(index.node_count(), 3 + 2 + 2);
        assert_eq!(ids(&index, "http://x/z"), ["a", "b"]);
        assert_eq!(ids(&index, "https://x/b"), ["e", "f"]);
    }

    #[test]
    fn test_composite_pruning() {
        let records = vec![
            composite_rule("docs", ["", r"^docs\.x\.com$", "", "^/", ""]),
            composite_rule("tls", ["^https$", "", "", "", ""]),
            composite_rule("alt-port", ["", "", "^8080$", "", ""]),
            composite_rule("search", ["", "", "", "^/search$", "(^|&)q="]),
        ];
        let (index, _) = RuleIndex::build(&records);

        assert_eq!(ids(&index, "https://docs.x.com/a"), ["docs", "tls"]);
        assert_eq!(ids(&index, "http://docs.x.com:8080/"), ["docs", "alt-port"]);
        assert_eq!(ids(&index, "http://x.com/search?lang=en&q=rust"), ["search"]);
        assert!(ids(&index, "http://x.com/search?lang=en").is_empty());
    }

    #[test]
    fn test_candidates_equal_per_rule_matching() {
        let records = vec![
            url_rule("u1", r"^https?://x\.com/"),
            url_rule("u2", r"/docs/"),
            url_rule("u3", r"^http://x\.com/docs/"),
            url_rule("u4", r"\?"),
            composite_rule("c1", ["^https$", r"^x\.com$", "", "^/docs/", ""]),
            composite_rule("c2", ["", r"\.com$", "", "", "ref="]),
            composite_rule("c3", ["", "", "^8443$", "", ""]),
            composite_rule("c4", ["^http$", "", "", "", ""]),
        ];
        let (index, _) = RuleIndex::build(&records);

        let urls = [
            "http://x.com/",
            "https://x.com/docs/a",
            "http://x.com/docs/a?ref=1",
            "https://y.org:8443/docs/",
            "https://y.org/",
            "ftp://z/",
        ];

        for url in urls {
            let src = SourceUrl::parse(url).unwrap();
            let expected: Vec<RuleId> = index
                .rules()
                .iter()
                .enumerate()
                .filter(|(_, rule)| rule.source.matches(&src))
                .map(|(id, _)| id)
                .collect();
            assert_eq!(index.candidates(&src), expected, "candidates differ for {url}");
        }
    }

    #[test]
    fn test_no_rules_no_candidates() {
        let (index, _) = RuleIndex::build(&[]);
        assert!(ids(&index, "http://x/").is_empty());
    }
}
