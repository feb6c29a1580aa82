//! Test results of single exercise runs and the totals across a batch.

/// How a run of an exercise's test suite ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    TestsFailed,
    CompileFailed,
    TestrunInterrupted,
    GenericError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    pub name: String,
    pub passed: bool,
    pub message: Option<String>,
    pub points: Vec<String>,
}

impl TestOutcome {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: None,
            points: Vec::new(),
        }
    }

    pub fn failed(name: impl Into<String>, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message,
            points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub status: RunStatus,
    pub tests: Vec<TestOutcome>,
    /// Output captured from the test runner, shown with `--details`.
    pub logs: Option<String>,
}

impl RunResult {
    /// Build a result whose status follows from the outcomes.
    pub fn from_tests(tests: Vec<TestOutcome>) -> Self {
        let status = if tests.iter().all(|t| t.passed) {
            RunStatus::Passed
        } else {
            RunStatus::TestsFailed
        };
        Self {
            status,
            tests,
            logs: None,
        }
    }

    pub fn total(&self) -> usize {
        self.tests.len()
    }

    pub fn passed(&self) -> usize {
        tally(&self.tests).0
    }
}

/// Count passing tests. Returns `(passed, total)`.
pub fn tally(tests: &[TestOutcome]) -> (usize, usize) {
    let passed = tests.iter().filter(|t| t.passed).count();
    (passed, tests.len())
}

/// Running totals over every exercise tested in one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub total_tests: usize,
    pub passed_tests: usize,
    pub exercise_count: usize,
}

impl BatchTally {
    /// Add one exercise's counts. Totals never decrease.
    pub fn accumulate(self, passed: usize, total: usize) -> Self {
        debug_assert!(passed <= total);
        Self {
            total_tests: self.total_tests + total,
            passed_tests: self.passed_tests + passed.min(total),
            exercise_count: self.exercise_count + 1,
        }
    }
}
