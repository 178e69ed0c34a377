//! Splitting transaction scripts into executable steps.

use std::fmt;

/// Savepoint used to bracket a script that runs inside an open transaction.
/// A plain `BEGIN` is rejected by `SQLite` while a transaction is open.
pub(super) const SAVEPOINT_NAME: &str = "storekit_tx";

/// One step of a transaction script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ScriptStep<'a> {
    /// Opens the bracketing savepoint.
    Open,
    /// A statement from the caller's script with its line index.
    Line { index: usize, sql: &'a str },
    /// Releases the bracketing savepoint.
    Release,
}

impl ScriptStep<'_> {
    pub(super) fn sql(&self) -> String {
        match self {
            Self::Open => format!("SAVEPOINT {SAVEPOINT_NAME}"),
            Self::Line { sql, .. } => (*sql).to_string(),
            Self::Release => format!("RELEASE {SAVEPOINT_NAME}"),
        }
    }
}

impl fmt::Display for ScriptStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("savepoint"),
            Self::Line { index, .. } => write!(f, "line {index}"),
            Self::Release => f.write_str("release"),
        }
    }
}

/// Splits `script` on newlines. Blank lines are skipped but still count
/// towards the line index, which is what parameter sets and row callbacks are
/// keyed by. When `bracket` is set the steps are wrapped in a savepoint.
pub(super) fn plan(script: &str, bracket: bool) -> Vec<ScriptStep<'_>> {
    let mut steps: Vec<ScriptStep<'_>> = script
        .split('\n')
        .enumerate()
        .map(|(index, line)| (index, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, sql)| ScriptStep::Line { index, sql })
        .collect();
    if bracket {
        steps.insert(0, ScriptStep::Open);
        steps.push(ScriptStep::Release);
    }
    steps
}

/// Literal, case-sensitive `SELECT` prefix check. Not a parser: a `WITH ...
/// SELECT` statement is treated as an update.
pub(super) fn is_select(sql: &str) -> bool {
    sql.trim_start().starts_with("SELECT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_keeps_line_indexes_across_blank_lines() {
        let steps = plan("INSERT INTO t VALUES (1)\n\n  \r\nSELECT * FROM t\n", false);
        assert_eq!(
            steps,
            vec![
                ScriptStep::Line {
                    index: 0,
                    sql: "INSERT INTO t VALUES (1)"
                },
                ScriptStep::Line {
                    index: 3,
                    sql: "SELECT * FROM t"
                },
            ]
        );
    }

    #[test]
    fn test_plan_brackets_with_savepoint() {
        let steps = plan("DELETE FROM t", true);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].sql(), "SAVEPOINT storekit_tx");
        assert_eq!(steps[2].sql(), "RELEASE storekit_tx");
    }

    #[test]
    fn test_is_select_is_a_literal_prefix_check() {
        assert!(is_select("SELECT 1"));
        assert!(is_select("   SELECT 1"));
        assert!(!is_select("select 1"));
        assert!(!is_select("WITH x AS (SELECT 1) SELECT * FROM x"));
    }
}
