//! Running an exercise's test suite.

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read},
    process::{Command, Stdio},
};

use crate::{
    error::EngineError,
    result::{RunResult, RunStatus, TestOutcome},
    workdir::ExerciseRef,
};

/// Executes the tests of one exercise.
///
/// `progress` receives `(fraction, message)` events while the run is in
/// flight; a `None` fraction means there is nothing to measure yet. All
/// events are delivered before `run_tests` returns.
pub trait ExecutionEngine {
    fn run_tests(
        &self,
        exercise: &ExerciseRef,
        progress: &mut dyn FnMut(Option<f64>, &str),
    ) -> Result<RunResult, EngineError>;
}

/// Runs `cargo test` inside the exercise directory and parses libtest output.
pub struct CargoTestEngine {
    program: String,
}

impl CargoTestEngine {
    pub fn new() -> Self {
        Self::with_program(std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string()))
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CargoTestEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionEngine for CargoTestEngine {
    fn run_tests(
        &self,
        exercise: &ExerciseRef,
        progress: &mut dyn FnMut(Option<f64>, &str),
    ) -> Result<RunResult, EngineError> {
        progress(None, &format!("Compiling {}", exercise.name));
        tracing::debug!(
            program = %self.program,
            dir = %exercise.path.display(),
            "spawning test runner"
        );

        let mut child = Command::new(&self.program)
            .args(["test", "--color", "never", "--", "--color", "never"])
            .current_dir(&exercise.path)
            .env("CARGO_TERM_COLOR", "never")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(EngineError::Spawn)?;

        // Drain stderr concurrently so a chatty compiler cannot block stdout.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                stderr
                    .read_to_end(&mut bytes)
                    .map(|_| String::from_utf8_lossy(&bytes).into_owned())
            })
        });

        let mut parser = OutputParser::default();
        if let Some(stdout) = child.stdout.take() {
            if let Err(err) = stream_output(stdout, &mut parser, &exercise.name, progress) {
                tracing::warn!(error = %err, "reading test runner output failed");
                // The child may already be gone; only the reap matters here.
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        }

        let status = child.wait()?;
        let stderr = match stderr_reader {
            Some(handle) => handle
                .join()
                .map_err(|_| EngineError::Crashed("stderr reader panicked".to_string()))??,
            None => String::new(),
        };
        tracing::debug!(?status, tests = parser.outcomes.len(), "test runner exited");

        let tests = parser.into_outcomes();
        if status.code().is_none() {
            return Ok(RunResult {
                status: RunStatus::TestrunInterrupted,
                tests,
                logs: Some(stderr),
            });
        }
        if status.success() {
            return Ok(RunResult::from_tests(tests));
        }
        if tests.is_empty() {
            if stderr.contains("error") {
                return Ok(RunResult {
                    status: RunStatus::CompileFailed,
                    tests,
                    logs: Some(stderr),
                });
            }
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
            return Err(EngineError::Crashed(
                last_line.unwrap_or("no output").trim().to_string(),
            ));
        }
        if tests.iter().all(|t| t.passed) {
            return Ok(RunResult {
                status: RunStatus::GenericError,
                tests,
                logs: Some(stderr),
            });
        }
        Ok(RunResult::from_tests(tests))
    }
}

/// Feeds runner stdout to `parser` line by line. Bytes that are not valid
/// UTF-8 are replaced rather than treated as a read failure.
fn stream_output(
    stdout: impl Read,
    parser: &mut OutputParser,
    exercise_name: &str,
    progress: &mut dyn FnMut(Option<f64>, &str),
) -> std::io::Result<()> {
    for line in BufReader::new(stdout).split(b'\n') {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        match parser.feed(line.trim_end_matches('\r')) {
            Some(ParseEvent::Started) => {
                progress(Some(parser.fraction()), &format!("Testing {exercise_name}"))
            }
            Some(ParseEvent::Finished(name)) => progress(Some(parser.fraction()), &name),
            None => {}
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ParseEvent {
    Started,
    Finished(String),
}

/// Incremental parser for libtest's human readable output.
#[derive(Default)]
struct OutputParser {
    expected: usize,
    finished: usize,
    outcomes: Vec<TestOutcome>,
    messages: HashMap<String, String>,
    capture: Option<(String, Vec<String>)>,
}

impl OutputParser {
    fn feed(&mut self, line: &str) -> Option<ParseEvent> {
        if let Some(name) = line
            .strip_prefix("---- ")
            .and_then(|rest| rest.strip_suffix(" stdout ----"))
        {
            self.flush_capture();
            self.capture = Some((name.to_string(), Vec::new()));
            return None;
        }
        if line == "failures:" || line.starts_with("test result:") {
            self.flush_capture();
            return None;
        }
        if let Some((_, lines)) = &mut self.capture {
            if !line.starts_with("note: run with `RUST_BACKTRACE") {
                lines.push(line.to_string());
            }
            return None;
        }

        if let Some(count) = line
            .strip_prefix("running ")
            .and_then(|rest| rest.strip_suffix(" tests").or_else(|| rest.strip_suffix(" test")))
            .and_then(|count| count.parse::<usize>().ok())
        {
            self.expected += count;
            return Some(ParseEvent::Started);
        }

        let (name, verdict) = line.strip_prefix("test ")?.rsplit_once(" ... ")?;
        let outcome = match verdict {
            "ok" => TestOutcome::passed(name),
            "FAILED" => TestOutcome::failed(name, None),
            v if v.starts_with("ignored") => {
                self.finished += 1;
                return Some(ParseEvent::Finished(name.to_string()));
            }
            _ => return None,
        };
        self.finished += 1;
        self.outcomes.push(outcome);
        Some(ParseEvent::Finished(name.to_string()))
    }

    fn fraction(&self) -> f64 {
        if self.expected == 0 {
            0.0
        } else {
            self.finished as f64 / self.expected as f64
        }
    }

    fn flush_capture(&mut self) {
        if let Some((name, lines)) = self.capture.take() {
            let message = lines.join("\n").trim().to_string();
            if !message.is_empty() {
                self.messages.insert(name, message);
            }
        }
    }

    fn into_outcomes(mut self) -> Vec<TestOutcome> {
        self.flush_capture();
        let mut messages = self.messages;
        self.outcomes
            .into_iter()
            .map(|mut outcome| {
                if !outcome.passed {
                    outcome.message = messages.remove(&outcome.name);
                }
                outcome
            })
            .collect()
    }
}
