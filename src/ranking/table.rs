//! Insertion-ordered per-query tables.
//!
//! Both rankings and judgments remember the order in which their keys first
//! arrived. Rankings use it as the tie-break when sorting by score, and
//! judgment balancing uses it to pick the "first k" members of a class.

use super::ids::{CandidateId, QueryId};
use std::collections::{HashMap, HashSet};

/// Candidate -> value map that remembers first-arrival order.
#[derive(Debug, Clone)]
pub struct CandidateMap<C, V> {
    entries: Vec<(C, V)>,
    index: HashMap<C, usize>,
}

impl<C: CandidateId, V: Copy> CandidateMap<C, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert or overwrite. An overwritten candidate keeps its original position.
    pub fn insert(&mut self, candidate: C, value: V) {
        match self.index.get(&candidate) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(candidate.clone(), self.entries.len());
                self.entries.push((candidate, value));
            }
        }
    }

    pub fn get(&self, candidate: &C) -> Option<V> {
        self.index.get(candidate).map(|&pos| self.entries[pos].1)
    }

    pub fn contains(&self, candidate: &C) -> bool {
        self.index.contains_key(candidate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&C, V)> + '_ {
        self.entries.iter().map(|(c, v)| (c, *v))
    }

    pub fn candidates(&self) -> impl Iterator<Item = &C> + '_ {
        self.entries.iter().map(|(c, _)| c)
    }

    pub fn candidate_set(&self) -> HashSet<C> {
        self.candidates().cloned().collect()
    }

    /// New map with the entries accepted by `keep`, arrival order preserved.
    pub fn retain_to_new<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&C, V) -> bool,
    {
        let mut out = Self::new();
        for (c, v) in self.iter() {
            if keep(c, v) {
                out.insert(c.clone(), v);
            }
        }
        out
    }
}

impl<C: CandidateId> CandidateMap<C, f64> {
    /// Candidates by score descending; equal scores keep arrival order.
    pub fn ranked(&self) -> Vec<(&C, f64)> {
        let mut ordered: Vec<(usize, &C, f64)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(pos, (c, s))| (pos, c, *s))
            .collect();
        ordered.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));
        ordered.into_iter().map(|(_, c, s)| (c, s)).collect()
    }
}

impl<C: PartialEq, V: PartialEq> PartialEq for CandidateMap<C, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<C: CandidateId, V: Copy> Default for CandidateMap<C, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CandidateId, V: Copy> FromIterator<(C, V)> for CandidateMap<C, V> {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (c, v) in iter {
            map.insert(c, v);
        }
        map
    }
}

/// Query -> T map that remembers first-arrival order of queries.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTable<T> {
    order: Vec<QueryId>,
    queries: HashMap<QueryId, T>,
}

impl<T> QueryTable<T> {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            queries: HashMap::new(),
        }
    }

    /// Insert or replace a query's value; a replaced query keeps its position.
    pub fn insert(&mut self, query: QueryId, value: T) {
        if !self.queries.contains_key(&query) {
            self.order.push(query.clone());
        }
        self.queries.insert(query, value);
    }

    /// Mutable access to a query's value, creating it with `T::default()` first if absent.
    pub fn entry_or_default(&mut self, query: QueryId) -> &mut T
    where
        T: Default,
    {
        if !self.queries.contains_key(&query) {
            self.order.push(query.clone());
        }
        self.queries.entry(query).or_default()
    }

    pub fn get(&self, query: &QueryId) -> Option<&T> {
        self.queries.get(query)
    }

    pub fn contains(&self, query: &QueryId) -> bool {
        self.queries.contains_key(query)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn query_ids(&self) -> impl Iterator<Item = &QueryId> + '_ {
        self.order.iter()
    }

    /// Queries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&QueryId, &T)> + '_ {
        self.order.iter().map(move |q| (q, &self.queries[q]))
    }
}

impl<T> Default for QueryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(QueryId, T)> for QueryTable<T> {
    fn from_iter<I: IntoIterator<Item = (QueryId, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (q, v) in iter {
            table.insert(q, v);
        }
        table
    }
}

impl<C: CandidateId, V: Copy> QueryTable<CandidateMap<C, V>> {
    /// Record one (query, candidate, value) triple; last value wins per pair.
    pub fn insert_candidate(&mut self, query: QueryId, candidate: C, value: V) {
        self.entry_or_default(query).insert(candidate, value);
    }

    /// Total candidate rows over all queries.
    pub fn total_candidates(&self) -> usize {
        self.iter().map(|(_, m)| m.len()).sum()
    }
}
