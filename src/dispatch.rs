//! One full pass over a rule set: match files, expand templates, execute

use std::io::Write;
use std::path::Path;
use std::process::Command as ProcessCommand;
use std::time::Instant;

use log::{debug, info, warn};

use crate::matcher::{self, FileCandidate};
use crate::report::{ExecutionOutcome, RunReport, Style, format_duration};
use crate::rules::RuleSet;
use crate::substitute::TokenExpander;

/// Result of executing a single command with its exit status and, in
/// capturing modes, its output.
pub(crate) struct CommandResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: std::time::Duration,
}

/// Execute one concrete command. The first element of `argv` is the
/// executable, the rest are its arguments. With `capture` the standard
/// streams are collected into the result; without it they are inherited.
pub(crate) fn execute_command(argv: &[String], capture: bool) -> CommandResult {
    let start = Instant::now();
    let Some((program, args)) = argv.split_first() else {
        return CommandResult {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: "empty command".to_string(),
            duration: start.elapsed(),
        };
    };

    if capture {
        match ProcessCommand::new(program).args(args).output() {
            Ok(o) => CommandResult {
                success: o.status.success(),
                exit_code: o.status.code(),
                stdout: String::from_utf8_lossy(&o.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&o.stderr).into_owned(),
                duration: start.elapsed(),
            },
            Err(e) => CommandResult {
                success: false,
                exit_code: None,
                stdout: String::new(),
                stderr: e.to_string(),
                duration: start.elapsed(),
            },
        }
    } else {
        match ProcessCommand::new(program).args(args).status() {
            Ok(s) => CommandResult {
                success: s.success(),
                exit_code: s.code(),
                stdout: String::new(),
                stderr: String::new(),
                duration: start.elapsed(),
            },
            Err(e) => CommandResult {
                success: false,
                exit_code: None,
                stdout: String::new(),
                stderr: e.to_string(),
                duration: start.elapsed(),
            },
        }
    }
}

fn outcome_from(rule: usize, file: &FileCandidate, result: &CommandResult) -> ExecutionOutcome {
    if result.success {
        ExecutionOutcome::success(rule, file.path.clone())
    } else {
        // On spawn failure there is no exit code; the io error text is in stderr
        let detail = result
            .exit_code
            .is_none()
            .then(|| result.stderr.trim().to_string());
        ExecutionOutcome::command_failure(rule, file.path.clone(), result.exit_code, detail)
    }
}

fn dump_captured(result: &CommandResult) {
    let _ = std::io::stderr().write_all(result.stdout.as_bytes());
    let _ = std::io::stderr().write_all(result.stderr.as_bytes());
}

/// Run every rule in declaration order against `directory`, collecting one
/// outcome per (rule, file) pair plus one per rule that could not be
/// matched. Failures never abort the remaining files or rules.
///
/// With `jobs > 1` the files of a single rule are executed on a bounded
/// worker pool; rules themselves stay sequential, so a rule always matches
/// against the directory state its predecessors left behind. With
/// `mute_success` command output is captured and only shown for failures.
#[must_use]
pub fn run(rules: &RuleSet, directory: &Path, jobs: usize, mute_success: bool) -> RunReport {
    let sty = Style::new();
    let expander = TokenExpander::default();
    let mut report = RunReport::default();
    let start = Instant::now();

    for (index, rule) in rules.iter().enumerate() {
        let header = format!("rule #{index} `{}`", rule.command);

        let Some(extension) = rule.input_extension.as_deref() else {
            warn!("rule #{index}: no input_extension, cannot apply this command to files");
            eprintln!(
                "{} {}",
                sty.bold(&header),
                sty.yellow("SKIP (no input extension)")
            );
            report.record(ExecutionOutcome::match_failure(
                index,
                "rule has no input_extension",
            ));
            continue;
        };

        let files = match matcher::files_with_extension(directory, extension) {
            Ok(files) => files,
            Err(e) => {
                warn!("rule #{index}: {e}");
                eprintln!("{} {}", sty.bold(&header), sty.red(&format!("SKIP ({e})")));
                report.record(ExecutionOutcome::match_failure(index, e.to_string()));
                continue;
            }
        };

        info!("rule #{index}: {} file(s) match `{extension}`", files.len());
        debug!(
            "rule #{index} files: {:?}",
            files.iter().map(|f| &f.path).collect::<Vec<_>>()
        );
        if files.is_empty() {
            continue;
        }

        eprintln!("{}", sty.bold(&header));
        let argv = rule.argv();
        let outcomes = if jobs > 1 && files.len() > 1 {
            run_parallel(index, &argv, &files, &expander, &sty, jobs, mute_success)
        } else {
            run_sequential(index, &argv, &files, &expander, &sty, mute_success)
        };
        for outcome in outcomes {
            report.record(outcome);
        }
    }

    report.elapsed = start.elapsed();
    report
}

fn run_sequential(
    rule_index: usize,
    argv: &[String],
    files: &[FileCandidate],
    expander: &TokenExpander,
    sty: &Style,
    mute_success: bool,
) -> Vec<ExecutionOutcome> {
    let total = files.len();
    let counter_width = total.to_string().len();

    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let concrete = expander.expand(argv, file);
            let idx = i + 1;
            let prefix = format!("[{idx:>counter_width$}/{total}]");
            eprint!("{} {} ", sty.bold(&prefix), concrete.join(" "));
            let _ = std::io::stderr().flush();

            let result = execute_command(&concrete, mute_success);
            if result.success {
                eprintln!(
                    "{} {}",
                    sty.green("PASS"),
                    sty.dim(&format_duration(result.duration))
                );
            } else {
                eprintln!(
                    "{} {}",
                    sty.red("FAIL"),
                    sty.dim(&format_duration(result.duration))
                );
                dump_captured(&result);
            }

            outcome_from(rule_index, file, &result)
        })
        .collect()
}

/// Execute one rule's files on up to `jobs` worker threads. Workers always
/// capture output so the progress lines stay whole; the collecting thread
/// re-emits captured output and restores match order before returning.
fn run_parallel(
    rule_index: usize,
    argv: &[String],
    files: &[FileCandidate],
    expander: &TokenExpander,
    sty: &Style,
    jobs: usize,
    mute_success: bool,
) -> Vec<ExecutionOutcome> {
    let total = files.len();
    let counter_width = total.to_string().len();
    let workers = jobs.min(total);

    let (task_tx, task_rx) = crossbeam_channel::unbounded::<(usize, &FileCandidate)>();
    let (done_tx, done_rx) = crossbeam_channel::unbounded::<(usize, Vec<String>, CommandResult)>();
    for task in files.iter().enumerate() {
        let _ = task_tx.send(task);
    }
    drop(task_tx);

    let mut collected: Vec<(usize, ExecutionOutcome)> = Vec::with_capacity(total);
    std::thread::scope(|scope| {
        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                while let Ok((i, file)) = task_rx.recv() {
                    let concrete = expander.expand(argv, file);
                    let result = execute_command(&concrete, true);
                    let _ = done_tx.send((i, concrete, result));
                }
            });
        }
        drop(done_tx);

        let mut done = 0usize;
        while let Ok((i, concrete, result)) = done_rx.recv() {
            done += 1;
            let prefix = format!("[{done:>counter_width$}/{total}]");
            let status = if result.success {
                sty.green("PASS")
            } else {
                sty.red("FAIL")
            };
            eprintln!(
                "{} {} {} {}",
                sty.bold(&prefix),
                concrete.join(" "),
                status,
                sty.dim(&format_duration(result.duration))
            );
            if !result.success || !mute_success {
                dump_captured(&result);
            }
            collected.push((i, outcome_from(rule_index, &files[i], &result)));
        }
    });

    collected.sort_by_key(|(i, _)| *i);
    collected.into_iter().map(|(_, outcome)| outcome).collect()
}
