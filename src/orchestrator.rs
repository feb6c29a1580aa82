//! Runs the tests of every selected exercise, one after another.

use crate::{
    color::Color,
    engine::ExecutionEngine,
    error::BatchError,
    printer::{passed_tests_bar, ResultPrinter},
    progress::ProgressReporter,
    result::{tally, BatchTally},
    terminal::Io,
    workdir::{ExerciseRef, WorkspaceResolver},
};

/// Outcome of a batch that got as far as running exercises.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub tally: BatchTally,
    /// Exercises the engine failed to run, in run order.
    pub failed_exercises: Vec<String>,
}

impl BatchReport {
    /// Failing tests do not count, only exercises that could not be run.
    pub fn is_success(&self) -> bool {
        self.failed_exercises.is_empty()
    }
}

pub struct Orchestrator<'a> {
    resolver: &'a dyn WorkspaceResolver,
    engine: &'a dyn ExecutionEngine,
    printer: ResultPrinter,
    filled_color: Color,
    empty_color: Color,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        resolver: &'a dyn WorkspaceResolver,
        engine: &'a dyn ExecutionEngine,
        printer: ResultPrinter,
        filled_color: Color,
        empty_color: Color,
    ) -> Self {
        Self {
            resolver,
            engine,
            printer,
            filled_color,
            empty_color,
        }
    }

    /// Resolve `arguments` and test each exercise in order.
    ///
    /// Resolution problems are printed and returned before anything runs.
    /// A failing engine only marks its exercise as failed; the rest of the
    /// batch still runs.
    pub fn run_batch(
        &self,
        io: &mut dyn Io,
        arguments: &[String],
    ) -> Result<BatchReport, BatchError> {
        let exercises = match self.resolve(arguments) {
            Ok(exercises) => exercises,
            Err(err) => {
                match &err {
                    BatchError::InvalidExercise(_) => io.println(&format!("Error: {err}"))?,
                    _ => io.println(&err.to_string())?,
                }
                return Err(err);
            }
        };

        let is_only_exercise = exercises.len() == 1;
        let mut report = BatchReport::default();

        for exercise in &exercises {
            io.println(&Color::Yellow.paint(&format!("Testing: {}", exercise.name)))?;
            tracing::info!(
                exercise = %exercise.name,
                course = exercise.course_name.as_deref().unwrap_or("-"),
                "running tests"
            );

            let outcome = {
                let mut reporter = ProgressReporter::new(io, self.filled_color, self.empty_color);
                let outcome = self.engine.run_tests(exercise, &mut |fraction, message| {
                    reporter.observe(fraction, message)
                });
                reporter.finish()?;
                outcome
            };

            match outcome {
                Ok(result) => {
                    let (passed, total) = tally(&result.tests);
                    report.tally = report.tally.accumulate(passed, total);
                    tracing::debug!(
                        exercise = %exercise.name,
                        passed,
                        total,
                        status = ?result.status,
                        "exercise tested"
                    );
                    self.printer.print_run_result(
                        io,
                        &result,
                        is_only_exercise,
                        self.filled_color,
                        self.empty_color,
                    )?;
                }
                Err(err) => {
                    tracing::error!(exercise = %exercise.name, error = ?err, "failed to run tests");
                    io.println(&Color::Red.paint(&format!(
                        "Failed to run tests for {}: {err}",
                        exercise.name
                    )))?;
                    report.tally = report.tally.accumulate(0, 0);
                    report.failed_exercises.push(exercise.name.clone());
                }
            }
        }

        if report.tally.exercise_count > 1 {
            let BatchTally {
                passed_tests,
                total_tests,
                ..
            } = report.tally;
            io.println("")?;
            io.println(&format!("Total tests passed: {passed_tests}/{total_tests}"))?;
            let line = passed_tests_bar(
                passed_tests,
                total_tests,
                self.filled_color,
                self.empty_color,
                io.width(),
            );
            io.println(&line)?;
        }

        Ok(report)
    }

    fn resolve(&self, arguments: &[String]) -> Result<Vec<ExerciseRef>, BatchError> {
        let mut exercises: Vec<ExerciseRef> = Vec::new();
        if arguments.is_empty() {
            exercises = self.resolver.exercises_in_scope();
        }
        for argument in arguments {
            let exercise = self
                .resolver
                .resolve(argument)
                .ok_or_else(|| BatchError::InvalidExercise(argument.clone()))?;
            if !exercises.contains(&exercise) {
                exercises.push(exercise);
            }
        }

        if exercises.is_empty() {
            return Err(BatchError::NoExercises);
        }
        Ok(exercises)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap, path::PathBuf};

    use super::*;
    use crate::{
        error::EngineError,
        printer::PrintOptions,
        result::{RunResult, TestOutcome},
        terminal::BufferIo,
    };

    struct StubResolver {
        exercises: HashMap<String, ExerciseRef>,
        scope: Vec<ExerciseRef>,
    }

    impl StubResolver {
        fn new(names: &[&str]) -> Self {
            let exercises = names
                .iter()
                .map(|name| (name.to_string(), exercise(name)))
                .collect();
            Self {
                exercises,
                scope: Vec::new(),
            }
        }
    }

    impl WorkspaceResolver for StubResolver {
        fn resolve(&self, argument: &str) -> Option<ExerciseRef> {
            self.exercises.get(argument.trim_end_matches('/')).cloned()
        }

        fn exercises_in_scope(&self) -> Vec<ExerciseRef> {
            self.scope.clone()
        }

        fn course_name(&self) -> Option<String> {
            Some("course".to_string())
        }
    }

    /// Engine returning canned `(passed, total)` results; `None` fails.
    struct StubEngine {
        results: HashMap<String, Option<(usize, usize)>>,
        calls: RefCell<Vec<String>>,
    }

    impl StubEngine {
        fn new(results: &[(&str, Option<(usize, usize)>)]) -> Self {
            Self {
                results: results
                    .iter()
                    .map(|(name, result)| (name.to_string(), *result))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ExecutionEngine for StubEngine {
        fn run_tests(
            &self,
            exercise: &ExerciseRef,
            progress: &mut dyn FnMut(Option<f64>, &str),
        ) -> Result<RunResult, EngineError> {
            self.calls.borrow_mut().push(exercise.name.clone());
            progress(None, &format!("Compiling {}", exercise.name));

            let Some((passed, total)) = self.results[&exercise.name] else {
                return Err(EngineError::Crashed("runner exploded".to_string()));
            };
            let tests = (0..total)
                .map(|i| {
                    progress(Some((i + 1) as f64 / total as f64), &format!("case {i}"));
                    if i < passed {
                        TestOutcome::passed(format!("case {i}"))
                    } else {
                        TestOutcome::failed(format!("case {i}"), None)
                    }
                })
                .collect();
            Ok(RunResult::from_tests(tests))
        }
    }

    fn exercise(name: &str) -> ExerciseRef {
        ExerciseRef {
            name: name.to_string(),
            course_name: Some("course".to_string()),
            path: PathBuf::from("/course").join(name),
        }
    }

    fn args(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn run(
        resolver: &StubResolver,
        engine: &StubEngine,
        arguments: &[String],
    ) -> (Result<BatchReport, BatchError>, String) {
        let mut io = BufferIo::new(50);
        let orchestrator = Orchestrator::new(
            resolver,
            engine,
            ResultPrinter::new(PrintOptions::default()),
            Color::None,
            Color::None,
        );
        let result = orchestrator.run_batch(&mut io, arguments);
        (result, io.out().to_string())
    }

    #[test]
    fn test_invalid_argument_runs_nothing() {
        let resolver = StubResolver::new(&["a", "b"]);
        let engine = StubEngine::new(&[("a", Some((1, 1))), ("b", Some((1, 1)))]);

        let (result, out) = run(&resolver, &engine, &args(&["a", "bogus", "b"]));

        assert!(matches!(result, Err(BatchError::InvalidExercise(ref arg)) if arg == "bogus"));
        assert!(engine.calls.borrow().is_empty());
        assert_eq!(out, "Error: bogus is not a valid exercise.\n");
    }

    #[test]
    fn test_outside_course_directory() {
        let resolver = StubResolver::new(&[]);
        let engine = StubEngine::new(&[]);

        let (result, out) = run(&resolver, &engine, &[]);

        assert!(matches!(result, Err(BatchError::NoExercises)));
        assert!(out.contains("You have to be in a course directory to run tests"));
    }

    #[test]
    fn test_no_arguments_uses_exercises_in_scope() {
        let mut resolver = StubResolver::new(&[]);
        resolver.scope = vec![exercise("x"), exercise("y")];
        let engine = StubEngine::new(&[("x", Some((1, 1))), ("y", Some((0, 1)))]);

        let (result, _) = run(&resolver, &engine, &[]);

        assert!(result.unwrap().is_success());
        assert_eq!(*engine.calls.borrow(), vec!["x", "y"]);
    }

    #[test]
    fn test_single_exercise_has_no_summary() {
        let resolver = StubResolver::new(&["a"]);
        let engine = StubEngine::new(&[("a", Some((1, 2)))]);

        let (result, out) = run(&resolver, &engine, &args(&["a"]));

        let report = result.unwrap();
        assert!(report.is_success());
        assert_eq!(report.tally.exercise_count, 1);
        assert!(!out.contains("Total tests passed"));
        assert!(out.contains("Test results: 1/2 tests passed"));
        assert_eq!(out.matches(" 50%[").count(), 2);
    }

    #[test]
    fn test_summary_after_multiple_exercises() {
        let resolver = StubResolver::new(&["a", "b"]);
        let engine = StubEngine::new(&[("a", Some((2, 2))), ("b", Some((1, 2)))]);

        let (result, out) = run(&resolver, &engine, &args(&["b", "a"]));

        let report = result.unwrap();
        assert_eq!(*engine.calls.borrow(), vec!["b", "a"]);
        assert_eq!(report.tally.passed_tests, 3);
        assert_eq!(report.tally.total_tests, 4);
        assert!(out.contains("\nTotal tests passed: 3/4\n 75%["));
        assert!(out.find("Testing: b").unwrap() < out.find("Testing: a").unwrap());
    }

    #[test]
    fn test_engine_failure_does_not_stop_the_batch() {
        let resolver = StubResolver::new(&["a", "b", "c"]);
        let engine = StubEngine::new(&[("a", Some((1, 1))), ("b", None), ("c", Some((2, 3)))]);

        let (result, out) = run(&resolver, &engine, &args(&["a", "b", "c"]));

        let report = result.unwrap();
        assert_eq!(*engine.calls.borrow(), vec!["a", "b", "c"]);
        assert!(!report.is_success());
        assert_eq!(report.failed_exercises, vec!["b"]);
        assert_eq!(
            report.tally,
            BatchTally {
                total_tests: 4,
                passed_tests: 3,
                exercise_count: 3,
            }
        );
        assert!(out.contains(
            "Failed to run tests for b: test runner exited without results: runner exploded"
        ));
        assert!(out.contains("Total tests passed: 3/4"));
    }

    #[test]
    fn test_duplicate_arguments_run_once() {
        let resolver = StubResolver::new(&["a"]);
        let engine = StubEngine::new(&[("a", Some((1, 1)))]);

        let (result, out) = run(&resolver, &engine, &args(&["a", "a/"]));

        assert_eq!(result.unwrap().tally.exercise_count, 1);
        assert_eq!(*engine.calls.borrow(), vec!["a"]);
        assert!(!out.contains("Total tests passed"));
    }

    #[test]
    fn test_progress_is_drawn_before_results() {
        let resolver = StubResolver::new(&["a", "b"]);
        let engine = StubEngine::new(&[("a", Some((0, 1))), ("b", Some((1, 1)))]);

        let (_, out) = run(&resolver, &engine, &args(&["a", "b"]));

        let progress_a = out.find("\rCompiling a").unwrap();
        let result_a = out.find("Failed: case 0").unwrap();
        let testing_b = out.find("Testing: b").unwrap();
        assert!(progress_a < result_a);
        assert!(out[..result_a].contains("100%["));
        assert!(result_a < testing_b);
    }
}
