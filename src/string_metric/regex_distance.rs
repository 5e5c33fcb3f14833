// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Distance from a string to the language of a regex.
//!
//! The regex is parsed with `regex-syntax` and lowered to a Thompson NFA.
//! The distance is the minimum number of single-char insertions, deletions
//! and substitutions that turn the candidate into some string the regex
//! fully matches. It is computed column by column over the input:
//!
//! ```text
//! cost[s]  = cheapest way to be in NFA state s after consuming i input chars
//! delete   : stay in s, consume input            (+1)
//! match    : follow a class edge containing c    (+0)
//! subst    : follow a class edge not containing c (+1)
//! insert   : follow a class edge, consume nothing (+1)
//! epsilon  : follow an epsilon edge              (+0)
//! ```
//!
//! A `regex::Regex` fast path answers 0 for full matches without the DP.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use regex::Regex;
use regex_syntax::hir::{Class, Hir, HirKind};

use crate::error::{HeuristicsError, Result};

/// Default bound for unrolling counted repetitions (`x{n,m}`)
pub const DEFAULT_MAX_UNROLL: u32 = 32;

const UNREACHABLE: u64 = u64::MAX;

#[derive(Debug, Clone)]
enum Edge {
    Epsilon(usize),
    Class(Vec<(char, char)>, usize),
}

#[derive(Debug, Default)]
struct Nfa {
    states: Vec<Vec<Edge>>,
}

impl Nfa {
    fn add_state(&mut self) -> usize {
        self.states.push(Vec::new());
        self.states.len() - 1
    }

    fn epsilon(&mut self, from: usize, to: usize) {
        self.states[from].push(Edge::Epsilon(to));
    }

    fn class(&mut self, from: usize, ranges: Vec<(char, char)>, to: usize) {
        self.states[from].push(Edge::Class(ranges, to));
    }
}

/// Fragment of the NFA under construction: entry and exit state
type Fragment = (usize, usize);

struct Builder {
    nfa: Nfa,
    max_unroll: u32,
}

impl Builder {
    fn build(&mut self, hir: &Hir) -> Fragment {
        match hir.kind() {
            // Anchors and word boundaries are ignored: the distance is
            // always computed against a full match.
            HirKind::Empty | HirKind::Look(_) => self.empty(),
            HirKind::Literal(lit) => {
                let text = String::from_utf8_lossy(&lit.0).into_owned();
                let start = self.nfa.add_state();
                let mut current = start;
                for c in text.chars() {
                    let next = self.nfa.add_state();
                    self.nfa.class(current, vec![(c, c)], next);
                    current = next;
                }
                (start, current)
            }
            HirKind::Class(class) => {
                let ranges = class_ranges(class);
                let start = self.nfa.add_state();
                let end = self.nfa.add_state();
                if !ranges.is_empty() {
                    self.nfa.class(start, ranges, end);
                }
                (start, end)
            }
            HirKind::Capture(capture) => self.build(&capture.sub),
            HirKind::Concat(parts) => {
                let (start, mut end) = self.empty();
                for part in parts {
                    let (s, e) = self.build(part);
                    self.nfa.epsilon(end, s);
                    end = e;
                }
                (start, end)
            }
            HirKind::Alternation(branches) => {
                let start = self.nfa.add_state();
                let end = self.nfa.add_state();
                for branch in branches {
                    let (s, e) = self.build(branch);
                    self.nfa.epsilon(start, s);
                    self.nfa.epsilon(e, end);
                }
                (start, end)
            }
            HirKind::Repetition(rep) => {
                let min = rep.min.min(self.max_unroll);
                let max = rep.max.filter(|m| *m <= self.max_unroll);

                let (start, mut end) = self.empty();
                for _ in 0..min {
                    let (s, e) = self.build(&rep.sub);
                    self.nfa.epsilon(end, s);
                    end = e;
                }

                match max {
                    None => {
                        // Kleene star on a fresh copy
                        let (s, e) = self.build(&rep.sub);
                        let exit = self.nfa.add_state();
                        self.nfa.epsilon(end, s);
                        self.nfa.epsilon(end, exit);
                        self.nfa.epsilon(e, s);
                        self.nfa.epsilon(e, exit);
                        (start, exit)
                    }
                    Some(max) => {
                        let exit = self.nfa.add_state();
                        for _ in min..max {
                            let (s, e) = self.build(&rep.sub);
                            self.nfa.epsilon(end, exit);
                            self.nfa.epsilon(end, s);
                            end = e;
                        }
                        self.nfa.epsilon(end, exit);
                        (start, exit)
                    }
                }
            }
        }
    }

    fn empty(&mut self) -> Fragment {
        let start = self.nfa.add_state();
        let end = self.nfa.add_state();
        self.nfa.epsilon(start, end);
        (start, end)
    }
}

fn class_ranges(class: &Class) -> Vec<(char, char)> {
    match class {
        Class::Unicode(unicode) => unicode
            .ranges()
            .iter()
            .map(|r| (r.start(), r.end()))
            .collect(),
        Class::Bytes(bytes) => bytes
            .ranges()
            .iter()
            .map(|r| (r.start() as char, r.end() as char))
            .collect(),
    }
}

fn class_contains(ranges: &[(char, char)], c: char) -> bool {
    ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi)
}

/// A compiled regex ready to measure distances against many candidates.
#[derive(Debug)]
pub struct RegexDistance {
    matcher: Regex,
    nfa: Nfa,
    start: usize,
    accept: usize,
}

impl RegexDistance {
    /// Compile `regex` with the default repetition bound
    pub fn compile(regex: &str) -> Result<Self> {
        Self::compile_bounded(regex, DEFAULT_MAX_UNROLL)
    }

    /// Compile `regex`, unrolling counted repetitions up to `max_unroll`
    pub fn compile_bounded(regex: &str, max_unroll: u32) -> Result<Self> {
        let invalid = |reason: String| HeuristicsError::InvalidRegex {
            regex: regex.to_string(),
            reason,
        };

        let hir = regex_syntax::Parser::new()
            .parse(regex)
            .map_err(|e| invalid(e.to_string()))?;
        let matcher = Regex::new(&format!("^(?:{regex})$")).map_err(|e| invalid(e.to_string()))?;

        let mut builder = Builder {
            nfa: Nfa::default(),
            max_unroll,
        };
        let (start, accept) = builder.build(&hir);

        Ok(Self {
            matcher,
            nfa: builder.nfa,
            start,
            accept,
        })
    }

    /// Edit distance from `candidate` to the closest full match.
    ///
    /// Returns `f64::MAX` when the regex language is empty.
    pub fn distance(&self, candidate: &str) -> f64 {
        if self.matcher.is_match(candidate) {
            return 0.0;
        }

        let mut cost = vec![UNREACHABLE; self.nfa.states.len()];
        cost[self.start] = 0;
        self.close(&mut cost);

        for c in candidate.chars() {
            let mut next = vec![UNREACHABLE; cost.len()];
            for (state, &current) in cost.iter().enumerate() {
                if current == UNREACHABLE {
                    continue;
                }
                // delete the input char
                next[state] = next[state].min(current + 1);
                for edge in &self.nfa.states[state] {
                    if let Edge::Class(ranges, to) = edge {
                        let step = if class_contains(ranges, c) { 0 } else { 1 };
                        next[*to] = next[*to].min(current + step);
                    }
                }
            }
            self.close(&mut next);
            cost = next;
        }

        match cost[self.accept] {
            UNREACHABLE => f64::MAX,
            // a clamped repetition accepted a string the regex rejects
            0 => 1.0,
            d => d as f64,
        }
    }

    /// Relax epsilon (+0) and insertion (+1) edges to a fixpoint
    fn close(&self, cost: &mut [u64]) {
        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = cost
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != UNREACHABLE)
            .map(|(s, c)| Reverse((*c, s)))
            .collect();

        while let Some(Reverse((d, state))) = heap.pop() {
            if d > cost[state] {
                continue;
            }
            for edge in &self.nfa.states[state] {
                let (to, step) = match edge {
                    Edge::Epsilon(to) => (*to, 0),
                    Edge::Class(_, to) => (*to, 1),
                };
                if d + step < cost[to] {
                    cost[to] = d + step;
                    heap.push(Reverse((d + step, to)));
                }
            }
        }
    }
}

/// Edit distance from `candidate` to the closest full match of `regex`
pub fn regex_match_distance(candidate: &str, regex: &str) -> Result<f64> {
    Ok(RegexDistance::compile(regex)?.distance(candidate))
}
