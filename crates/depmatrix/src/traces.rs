//! Trace input: one trace per line, activities separated by commas.

use crate::types::{DependencyError, DependencyResult};

/// Parse newline-delimited trace text.
///
/// Blank lines and lines that hold only separators are skipped. A line with
/// an empty activity between two named ones (`A,,B`) is malformed.
pub fn parse_traces(text: &str) -> DependencyResult<Vec<Vec<String>>> {
    let mut traces = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        if tokens.iter().all(|t| t.is_empty()) {
            continue;
        }
        let first = tokens.iter().position(|t| !t.is_empty()).unwrap_or(0);
        let last = tokens.iter().rposition(|t| !t.is_empty()).unwrap_or(0);
        if tokens[first..=last].iter().any(|t| t.is_empty()) {
            return Err(DependencyError::InputError(format!(
                "Malformed trace on line {}: empty activity name",
                index + 1
            )));
        }
        traces.push(tokens[first..=last].iter().map(|t| t.to_string()).collect());
    }
    Ok(traces)
}

/// Trim activity names, drop empty names, and drop traces left empty.
pub fn normalize_traces(traces: &[Vec<String>]) -> Vec<Vec<String>> {
    traces
        .iter()
        .map(|trace| {
            trace
                .iter()
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|trace| !trace.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let traces = parse_traces("A, B ,C\n\nA,B,D\n").unwrap();
        assert_eq!(traces, vec![vec!["A", "B", "C"], vec!["A", "B", "D"]]);
    }

    #[test]
    fn test_separator_only_lines_ignored() {
        let traces = parse_traces(" , ,\nA\n,B,\n").unwrap();
        assert_eq!(traces, vec![vec!["A"], vec!["B"]]);
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let err = parse_traces("A,B\nA,,B").unwrap_err();
        assert!(matches!(err, DependencyError::InputError(ref m) if m.contains("line 2")));
    }

    #[test]
    fn test_normalize_drops_empty() {
        let raw = vec![
            vec![" A ".to_string(), "".to_string()],
            vec!["  ".to_string()],
            vec![],
        ];
        assert_eq!(normalize_traces(&raw), vec![vec!["A".to_string()]]);
    }
}
