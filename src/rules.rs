//! Source pre-processing: comment stripping and find/replace rules.
//!
//! Cards carry an optional rule text alongside the drawing source. Each
//! non-comment rule line holds whitespace-separated `source,target` pairs;
//! the pairs are literal substitutions applied globally to the source text,
//! in file order, before tokenizing. This is how authors define reusable
//! letter macros (`A,412223|`) without repeating byte sequences.

/// One literal find/replace pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub source: String,
    pub target: String,
}

/// An ordered rule list parsed from rule text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse rule text. Blank lines and `//` comment lines are skipped; a
    /// token contributes a rule only if it has a comma with text on both
    /// sides. Malformed tokens are ignored, not errors.
    pub fn parse(text: &str) -> Self {
        let mut rules = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") {
                continue;
            }
            for pair in line.split_whitespace() {
                if let Some(idx) = pair.find(',')
                    && idx > 0
                    && idx < pair.len() - 1
                {
                    rules.push(Rule {
                        source: pair[..idx].to_string(),
                        target: pair[idx + 1..].to_string(),
                    });
                }
            }
        }
        Self { rules }
    }

    /// Apply every rule to `text`, in order, replacing all occurrences.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = out.replace(&rule.source, &rule.target);
        }
        out
    }
}

/// Drop lines whose trimmed content starts with `//`.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full pre-pass applied to a card's input before tokenizing.
pub fn preprocess(input: &str, rule_text: &str) -> String {
    let stripped = strip_comments(input);
    if rule_text.trim().is_empty() {
        return stripped;
    }
    RuleSet::parse(rule_text).apply(&stripped)
}
