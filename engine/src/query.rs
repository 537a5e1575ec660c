use crate::index::{DocId, FieldIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Uppercase token joining its neighbours into a disjunction.
pub const OR_OPERATOR: &str = "OR";

/// How whitespace-separated clauses are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(String),
    And(Vec<Query>),
    Or(Vec<Query>),
}

impl Query {
    /// Documents satisfying the boolean structure. An empty group matches nothing.
    pub fn matches(&self, field: &FieldIndex) -> BTreeSet<DocId> {
        match self {
            Query::Term(t) => field.postings_for(t).iter().map(|p| p.doc_id).collect(),
            Query::And(clauses) => {
                let mut iter = clauses.iter();
                let Some(first) = iter.next() else { return BTreeSet::new() };
                let mut acc = first.matches(field);
                for clause in iter {
                    if acc.is_empty() {
                        break;
                    }
                    let next = clause.matches(field);
                    acc.retain(|d| next.contains(d));
                }
                acc
            }
            Query::Or(clauses) => clauses.iter().flat_map(|c| c.matches(field)).collect(),
        }
    }

    /// Every term in the query, repeated terms included.
    pub fn terms(&self) -> Vec<&str> {
        match self {
            Query::Term(t) => vec![t.as_str()],
            Query::And(clauses) | Query::Or(clauses) => clauses.iter().flat_map(Query::terms).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms().is_empty()
    }
}

/// Parses tag queries. Terms are taken verbatim and joined with the default
/// group; an uppercase `OR` between two terms makes them a disjunction.
pub struct QueryParser {
    group: Group,
}

impl QueryParser {
    pub fn new(group: Group) -> Self {
        Self { group }
    }

    pub fn parse(&self, text: &str) -> Query {
        let mut clauses: Vec<Query> = Vec::new();
        let mut pending_or = false;
        for token in text.split_whitespace() {
            if token == OR_OPERATOR {
                pending_or = !clauses.is_empty();
                continue;
            }
            let q = Query::Term(token.to_string());
            match clauses.pop() {
                Some(prev) if pending_or => clauses.push(match prev {
                    Query::Or(mut alts) => {
                        alts.push(q);
                        Query::Or(alts)
                    }
                    other => Query::Or(vec![other, q]),
                }),
                Some(prev) => {
                    clauses.push(prev);
                    clauses.push(q);
                }
                None => clauses.push(q),
            }
            pending_or = false;
        }
        if clauses.len() == 1 {
            return clauses.remove(0);
        }
        match self.group {
            Group::And => Query::And(clauses),
            Group::Or => Query::Or(clauses),
        }
    }
}
