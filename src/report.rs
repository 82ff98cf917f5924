//! Outcome collection and end-of-run reporting

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use crate::rules::RuleSet;

/// How one action against one file (or one whole rule) ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The external command exited with status zero.
    Success,
    /// The external command exited non-zero or could not be started.
    CommandFailure,
    /// Reserved for stricter placeholder expansion modes; the current
    /// expander is permissive and never produces this.
    SubstitutionFailure,
    /// The rule could not be matched against the directory at all (no
    /// input extension, or the directory was unreadable).
    MatchFailure,
}

/// The recorded result of attempting one action. Created once, when the
/// action completes or fails to start, and never mutated.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub rule: usize,
    /// `None` for rule-level match failures.
    pub file: Option<PathBuf>,
    pub exit_code: Option<i32>,
    pub kind: OutcomeKind,
    pub detail: Option<String>,
}

impl ExecutionOutcome {
    #[must_use]
    pub fn success(rule: usize, file: PathBuf) -> Self {
        Self {
            rule,
            file: Some(file),
            exit_code: Some(0),
            kind: OutcomeKind::Success,
            detail: None,
        }
    }

    #[must_use]
    pub fn command_failure(
        rule: usize,
        file: PathBuf,
        exit_code: Option<i32>,
        detail: Option<String>,
    ) -> Self {
        Self {
            rule,
            file: Some(file),
            exit_code,
            kind: OutcomeKind::CommandFailure,
            detail,
        }
    }

    #[must_use]
    pub fn match_failure(rule: usize, detail: impl Into<String>) -> Self {
        Self {
            rule,
            file: None,
            exit_code: None,
            kind: OutcomeKind::MatchFailure,
            detail: Some(detail.into()),
        }
    }
}

/// Aggregated results of one full pass over a rule set.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<ExecutionOutcome>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn record(&mut self, outcome: ExecutionOutcome) {
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }

    /// The `CommandFailure` outcomes, in the order they were recorded.
    #[must_use]
    pub fn failures(&self) -> Vec<&ExecutionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::CommandFailure)
            .collect()
    }

    /// Non-zero iff any command invocation failed. Match failures are
    /// reported but do not flip the exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(self.count(OutcomeKind::CommandFailure) > 0)
    }

    /// Print the end-of-run summary to stderr: per-rule counts, the failed
    /// files with their exit statuses, and a total line.
    pub fn print_summary(&self, sty: &Style, rules: &RuleSet) {
        let mut by_rule: BTreeMap<usize, Vec<&ExecutionOutcome>> = BTreeMap::new();
        for outcome in &self.outcomes {
            by_rule.entry(outcome.rule).or_default().push(outcome);
        }

        eprintln!();
        for (index, outcomes) in &by_rule {
            let passed = outcomes
                .iter()
                .filter(|o| o.kind == OutcomeKind::Success)
                .count();
            let failed = outcomes
                .iter()
                .filter(|o| {
                    matches!(
                        o.kind,
                        OutcomeKind::CommandFailure | OutcomeKind::SubstitutionFailure
                    )
                })
                .count();
            let skipped = outcomes
                .iter()
                .filter(|o| o.kind == OutcomeKind::MatchFailure)
                .count();

            let mut parts = Vec::new();
            if passed > 0 {
                parts.push(sty.green(&format!("{passed} passed")));
            }
            if failed > 0 {
                parts.push(sty.red(&format!("{failed} failed")));
            }
            if skipped > 0 {
                parts.push(sty.yellow("not applicable"));
            }
            let label = rules
                .rules
                .get(*index)
                .map_or_else(String::new, |r| format!(" `{}`", r.command));
            eprintln!(
                "{}{} {}",
                sty.bold(&format!("rule #{index}")),
                sty.dim(&label),
                parts.join(&sty.dim(", "))
            );
        }

        let failures = self.failures();
        if !failures.is_empty() {
            eprintln!("{}", sty.bold("failed:"));
            for outcome in failures {
                let path = outcome
                    .file
                    .as_ref()
                    .map_or_else(String::new, |p| p.display().to_string());
                let status = outcome.exit_code.map_or_else(
                    || "failed to start".to_string(),
                    |code| format!("exit {code}"),
                );
                match &outcome.detail {
                    Some(detail) => eprintln!("  {path} ({status}: {detail})"),
                    None => eprintln!("  {path} ({status})"),
                }
            }
        }

        let mut parts = Vec::new();
        let passed = self.count(OutcomeKind::Success);
        let failed =
            self.count(OutcomeKind::CommandFailure) + self.count(OutcomeKind::SubstitutionFailure);
        let skipped = self.count(OutcomeKind::MatchFailure);
        if passed > 0 {
            parts.push(sty.green(&format!("{passed} passed")));
        }
        if failed > 0 {
            parts.push(sty.red(&format!("{failed} failed")));
        }
        if skipped > 0 {
            parts.push(sty.yellow(&format!("{skipped} skipped")));
        }
        if parts.is_empty() {
            parts.push(sty.dim("nothing to do"));
        }

        eprintln!(
            "{} {} {}",
            sty.bold(&format!("{} actions:", self.outcomes.len())),
            parts.join(&sty.dim(", ")),
            sty.dim(&format!("({})", format_duration(self.elapsed)))
        );
    }
}

/// ANSI color helpers — only emit escape codes when stderr is a terminal.
pub struct Style {
    color: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Style {
    #[must_use]
    pub fn new() -> Self {
        Self {
            color: std::io::stderr().is_terminal(),
        }
    }

    fn style(&self, code: &str, s: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }

    #[must_use]
    pub fn bold(&self, s: &str) -> String {
        self.style("1", s)
    }

    #[must_use]
    pub fn green(&self, s: &str) -> String {
        self.style("32", s)
    }

    #[must_use]
    pub fn red(&self, s: &str) -> String {
        self.style("31", s)
    }

    #[must_use]
    pub fn yellow(&self, s: &str) -> String {
        self.style("33", s)
    }

    #[must_use]
    pub fn dim(&self, s: &str) -> String {
        self.style("2", s)
    }
}

pub(crate) fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let millis = d.subsec_millis();
    if total_secs < 60 {
        let tenths = millis / 100;
        format!("{total_secs}.{tenths}s")
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let tenths = millis / 100;
        format!("{mins}m {secs}.{tenths}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_reflects_command_failures_only() {
        let mut report = RunReport::default();
        report.record(ExecutionOutcome::success(0, PathBuf::from("a.txt")));
        report.record(ExecutionOutcome::match_failure(1, "no input_extension"));
        assert_eq!(report.exit_code(), 0);

        report.record(ExecutionOutcome::command_failure(
            2,
            PathBuf::from("b.txt"),
            Some(1),
            None,
        ));
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_counts_by_kind() {
        let mut report = RunReport::default();
        report.record(ExecutionOutcome::success(0, PathBuf::from("a.txt")));
        report.record(ExecutionOutcome::success(0, PathBuf::from("b.txt")));
        report.record(ExecutionOutcome::command_failure(
            0,
            PathBuf::from("c.txt"),
            Some(2),
            None,
        ));
        report.record(ExecutionOutcome {
            rule: 1,
            file: Some(PathBuf::from("d.txt")),
            exit_code: None,
            kind: OutcomeKind::SubstitutionFailure,
            detail: Some("unresolvable placeholder".to_string()),
        });

        assert_eq!(report.count(OutcomeKind::Success), 2);
        assert_eq!(report.count(OutcomeKind::CommandFailure), 1);
        assert_eq!(report.count(OutcomeKind::SubstitutionFailure), 1);
        assert_eq!(report.count(OutcomeKind::MatchFailure), 0);
        assert_eq!(report.failures().len(), 1);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(61)), "1m 1.0s");
    }
}
