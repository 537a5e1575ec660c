use crate::evaluate::ExperimentResult;
use anyhow::Result;
use std::fmt::{self, Write};

/// Flat results log: one block per strategy, then the MAP ranking.
pub fn render_text(result: &ExperimentResult) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_text(&mut out, result);
    out
}

fn write_text(out: &mut String, result: &ExperimentResult) -> fmt::Result {
    for r in &result.strategies {
        writeln!(out, "{}", r.strategy)?;
        if let Some(failure) = &r.failure {
            writeln!(out, "  failed: {failure}")?;
            continue;
        }
        for q in &r.per_query {
            writeln!(out, "  {}: {:.6}", q.query, q.average_precision)?;
        }
        writeln!(out, "  evaluated queries: {} (excluded {})", r.per_query.len(), r.excluded.len())?;
        match r.mean_average_precision() {
            Some(map) => writeln!(out, "  Mean Average Precision: {map:.6}")?,
            None => writeln!(out, "  Mean Average Precision: n/a")?,
        }
    }
    let ranking = result.ranking();
    if !ranking.is_empty() {
        writeln!(out, "ranking (relevance threshold {})", result.threshold)?;
        for (pos, (strategy, map)) in ranking.iter().enumerate() {
            writeln!(out, "  {}. {strategy} {map:.6}", pos + 1)?;
        }
    }
    Ok(())
}

pub fn render_json(result: &ExperimentResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
