//! Aho-Corasick multi-pattern automaton.
//!
//! Nodes live in a flat arena indexed by `usize`; failure links are arena
//! indices, so there are no ownership cycles between a node and its
//! failure target. Positions are char offsets.

use std::collections::{HashMap, VecDeque};

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct Node {
    children: HashMap<char, usize>,
    fail: usize,
    outputs: Vec<usize>, // pattern ids ending here, after failure-link closure
}

/// Collects patterns; [`build`](Self::build) turns it into a scannable automaton.
#[derive(Debug, Clone)]
pub struct PatternAutomatonBuilder {
    nodes: Vec<Node>,
    pattern_count: usize,
}

impl Default for PatternAutomatonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternAutomatonBuilder {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            pattern_count: 0,
        }
    }

    /// Add a pattern under a caller-chosen id.
    ///
    /// Empty patterns have no characters to match and are ignored; callers
    /// decide separately what an empty pattern means for them.
    pub fn add(&mut self, pattern: &str, id: usize) -> &mut Self {
        if pattern.is_empty() {
            return self;
        }

        let mut state = ROOT;
        for c in pattern.chars() {
            state = match self.nodes[state].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[state].children.insert(c, next);
                    next
                }
            };
        }
        self.nodes[state].outputs.push(id);
        self.pattern_count += 1;
        self
    }

    /// Compute failure links and output closure breadth-first.
    pub fn build(mut self) -> PatternAutomaton {
        let mut queue: VecDeque<usize> = VecDeque::new();

        // Depth-1 nodes fail to the root
        let root_children: Vec<usize> = self.nodes[ROOT].children.values().copied().collect();
        for child in root_children {
            self.nodes[child].fail = ROOT;
            queue.push_back(child);
        }

        while let Some(state) = queue.pop_front() {
            let edges: Vec<(char, usize)> = self.nodes[state]
                .children
                .iter()
                .map(|(&c, &next)| (c, next))
                .collect();

            for (c, child) in edges {
                // Longest proper suffix of child's path that is also a trie path
                let mut fallback = self.nodes[state].fail;
                let fail = loop {
                    if let Some(&target) = self.nodes[fallback].children.get(&c) {
                        break target;
                    }
                    if fallback == ROOT {
                        break ROOT;
                    }
                    fallback = self.nodes[fallback].fail;
                };

                self.nodes[child].fail = fail;
                let inherited = self.nodes[fail].outputs.clone();
                let outputs = &mut self.nodes[child].outputs;
                outputs.extend(inherited);
                outputs.sort_unstable();
                outputs.dedup();

                queue.push_back(child);
            }
        }

        PatternAutomaton {
            nodes: self.nodes,
            pattern_count: self.pattern_count,
        }
    }
}

/// Immutable Aho-Corasick automaton.
#[derive(Debug, Clone)]
pub struct PatternAutomaton {
    nodes: Vec<Node>,
    pattern_count: usize,
}

impl PatternAutomaton {
    /// Number of non-empty patterns added.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Scan `text` once, calling `on_match(id, end_exclusive)` for every
    /// pattern occurrence, overlapping ones included.
    #[inline]
    pub fn scan<F: FnMut(usize, usize)>(&self, text: &str, on_match: F) {
        let chars: Vec<char> = text.chars().collect();
        self.scan_chars(&chars, on_match);
    }

    pub fn scan_chars<F: FnMut(usize, usize)>(&self, text: &[char], mut on_match: F) {
        let mut state = ROOT;

        for (i, c) in text.iter().enumerate() {
            state = self.step(state, *c);
            for &id in &self.nodes[state].outputs {
                on_match(id, i + 1);
            }
        }
    }

    /// All matches as `(id, end_exclusive)`, in scan order.
    pub fn find_all(&self, text: &str) -> Vec<(usize, usize)> {
        let mut matches = Vec::new();
        self.scan(text, |id, end| matches.push((id, end)));
        matches
    }

    #[inline]
    fn step(&self, mut state: usize, c: char) -> usize {
        loop {
            if let Some(&next) = self.nodes[state].children.get(&c) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state].fail;
        }
    }
}
