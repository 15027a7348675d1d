// Copyright 2026 the Sheetlink Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule lists for style elements.
//!
//! The reference host does not interpret declarations. It splits style text
//! into top-level rules (a block rule ends at its matching `}`, a statement
//! at-rule ends at `;`), normalizes whitespace, and keeps the rules in order.
//! That is enough to observe ordering, insertion and deletion.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::HostError;
use crate::rule::RuleOp;

/// An ordered list of normalized rule texts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RuleList {
    rules: Vec<String>,
}

impl RuleList {
    /// Parses style text into a rule list, dropping unterminated trailing
    /// input.
    pub(crate) fn parse(text: &str) -> Self {
        Self {
            rules: split_rules(text),
        }
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.rules
    }

    /// Applies `op`, returning the index it affected.
    pub(crate) fn apply(&mut self, op: &RuleOp) -> Result<usize, HostError> {
        match op {
            RuleOp::InsertRule { rule, index } => self.insert(op.name(), rule, *index),
            RuleOp::AddRule {
                selector,
                style,
                index,
            } => {
                let rule = alloc::format!("{selector} {{ {style} }}");
                self.insert(op.name(), &rule, index.unwrap_or(self.rules.len()))
            }
            RuleOp::DeleteRule { index } | RuleOp::RemoveRule { index } => {
                if *index >= self.rules.len() {
                    return Err(HostError::IndexSize {
                        api: op.name(),
                        index: *index,
                        len: self.rules.len(),
                    });
                }
                self.rules.remove(*index);
                Ok(*index)
            }
        }
    }

    fn insert(&mut self, api: &'static str, rule: &str, index: usize) -> Result<usize, HostError> {
        if index > self.rules.len() {
            return Err(HostError::IndexSize {
                api,
                index,
                len: self.rules.len(),
            });
        }
        let mut parsed = split_rules(rule);
        if parsed.len() != 1 {
            return Err(HostError::Syntax {
                api,
                rule: String::from(rule),
            });
        }
        self.rules.insert(index, parsed.remove(0));
        Ok(index)
    }
}

/// Splits `text` at top-level rule boundaries.
fn split_rules(text: &str) -> Vec<String> {
    let mut rules = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        // Comments never contribute to a rule.
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = '\0';
            for c in chars.by_ref() {
                if prev == '*' && c == '/' {
                    break;
                }
                prev = c;
            }
            continue;
        }
        current.push(c);
        match c {
            '{' => depth += 1,
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    push_rule(&mut rules, &mut current);
                }
            }
            ';' if depth == 0 => push_rule(&mut rules, &mut current),
            _ => {}
        }
    }
    rules
}

fn push_rule(rules: &mut Vec<String>, current: &mut String) {
    let normalized = normalize(current);
    if !normalized.is_empty() && normalized != ";" {
        rules.push(normalized);
    }
    current.clear();
}

/// Collapses whitespace runs to single spaces and trims the ends.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    #[test]
    fn parse_splits_top_level_rules() {
        let list = RuleList::parse(
            "
            h1 { color: tomato; }
            @media (min-width: 10px) { h2 { color: red; } }
            h3 {
                width: 4px;
            }
            ",
        );
        assert_eq!(
            list.as_slice(),
            &[
                "h1 { color: tomato; }".to_string(),
                "@media (min-width: 10px) { h2 { color: red; } }".to_string(),
                "h3 { width: 4px; }".to_string(),
            ]
        );
    }

    #[test]
    fn parse_keeps_statement_at_rules_and_drops_comments() {
        let list = RuleList::parse("/* lead */ @charset \"utf-8\"; a { b: c } /* tail");
        assert_eq!(
            list.as_slice(),
            &["@charset \"utf-8\";".to_string(), "a { b: c }".to_string()]
        );
    }

    #[test]
    fn parse_drops_unterminated_input() {
        let list = RuleList::parse("a { b: c } d { e: f");
        assert_eq!(list.as_slice().len(), 1);
    }

    #[test]
    fn insert_rule_checks_index_and_syntax() {
        let mut list = RuleList::parse("a { b: c }");
        let op = RuleOp::InsertRule {
            rule: "x { y: z }".to_string(),
            index: 0,
        };
        assert_eq!(list.apply(&op), Ok(0));
        assert_eq!(list.as_slice()[0], "x { y: z }");

        let too_far = RuleOp::InsertRule {
            rule: "x { y: z }".to_string(),
            index: 5,
        };
        assert!(matches!(
            list.apply(&too_far),
            Err(HostError::IndexSize { index: 5, len: 2, .. })
        ));

        let two = RuleOp::InsertRule {
            rule: "x {} y {}".to_string(),
            index: 0,
        };
        assert!(matches!(list.apply(&two), Err(HostError::Syntax { .. })));
    }

    #[test]
    fn add_rule_defaults_to_end() {
        let mut list = RuleList::parse("a { b: c }");
        let op = RuleOp::AddRule {
            selector: ".test".to_string(),
            style: "height: 82px;".to_string(),
            index: None,
        };
        assert_eq!(list.apply(&op), Ok(1));
        assert_eq!(
            list.as_slice(),
            &vec!["a { b: c }".to_string(), ".test { height: 82px; }".to_string()][..]
        );
    }

    #[test]
    fn delete_rule_out_of_range() {
        let mut list = RuleList::default();
        assert!(matches!(
            list.apply(&RuleOp::DeleteRule { index: 0 }),
            Err(HostError::IndexSize { len: 0, .. })
        ));
    }
}
