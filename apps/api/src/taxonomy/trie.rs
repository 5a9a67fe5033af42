//! Token trie over normalized taxonomy phrases.
//!
//! Nodes live in one arena `Vec` and children are keyed by whole tokens, so a
//! lookup walks one edge per document token and costs O(phrase length)
//! regardless of how many skills the taxonomy holds.

use std::collections::HashMap;

use crate::models::skill::FormKind;

/// What a complete phrase resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseEntry {
    pub skill: usize,
    pub kind: FormKind,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<String, usize>,
    entry: Option<PhraseEntry>,
}

#[derive(Debug, Clone)]
pub struct PhraseTrie {
    nodes: Vec<TrieNode>,
    phrases: usize,
}

impl Default for PhraseTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            phrases: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.phrases
    }

    /// Inserts a phrase. Returns the entry already stored under the same
    /// phrase, if any, and leaves it in place.
    pub fn insert(&mut self, phrase: &[String], entry: PhraseEntry) -> Option<PhraseEntry> {
        let mut node_idx = 0;
        for token in phrase {
            node_idx = match self.nodes[node_idx].children.get(token) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node_idx].children.insert(token.clone(), next);
                    next
                }
            };
        }

        match self.nodes[node_idx].entry {
            Some(existing) => Some(existing),
            None => {
                self.nodes[node_idx].entry = Some(entry);
                self.phrases += 1;
                None
            }
        }
    }

    /// Longest phrase starting at the head of `tokens`, as
    /// `(token count, entry)`.
    pub fn longest_prefix<'a, I>(&self, tokens: I) -> Option<(usize, PhraseEntry)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut node_idx = 0;
        let mut best = None;

        for (depth, token) in tokens.into_iter().enumerate() {
            match self.nodes[node_idx].children.get(token) {
                Some(&next) => node_idx = next,
                None => break,
            }
            if let Some(entry) = self.nodes[node_idx].entry {
                best = Some((depth + 1, entry));
            }
        }

        best
    }
}
