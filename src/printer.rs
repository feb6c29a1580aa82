//! Human readable rendering of exercise run results.

use std::io;

use crate::{
    color::Color,
    progress::{bar, bar_cells},
    result::{RunResult, RunStatus, TestOutcome},
    terminal::Io,
};

const DETAIL_INDENT: &str = "        ";

/// Flags of the `test` command that affect rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    /// Print passing tests too, not just failures.
    pub show_all: bool,
    /// Print failure messages, points and runner logs.
    pub show_details: bool,
}

pub struct ResultPrinter {
    options: PrintOptions,
}

impl ResultPrinter {
    pub fn new(options: PrintOptions) -> Self {
        Self { options }
    }

    pub fn print_run_result(
        &self,
        io: &mut dyn Io,
        result: &RunResult,
        is_only_exercise: bool,
        filled_color: Color,
        empty_color: Color,
    ) -> io::Result<()> {
        for test in &result.tests {
            self.print_test(io, test)?;
        }

        match result.status {
            RunStatus::CompileFailed => {
                io.println(&Color::Red.paint("Failed to compile project"))?;
                self.print_logs(io, result)?;
            }
            RunStatus::TestrunInterrupted => {
                io.println(&Color::Red.paint("Test run was interrupted"))?;
            }
            RunStatus::GenericError => {
                io.println(&Color::Red.paint("Failed due to an internal error"))?;
                self.print_logs(io, result)?;
            }
            RunStatus::Passed | RunStatus::TestsFailed => {}
        }

        let (passed, total) = (result.passed(), result.total());
        if total > 0 {
            io.println(&format!("Test results: {passed}/{total} tests passed"))?;
            if is_only_exercise {
                let line = passed_tests_bar(passed, total, filled_color, empty_color, io.width());
                io.println(&line)?;
            }
            if result.status == RunStatus::Passed {
                io.println(&Color::Green.paint("All tests passed!"))?;
            }
        }
        Ok(())
    }

    fn print_test(&self, io: &mut dyn Io, test: &TestOutcome) -> io::Result<()> {
        if test.passed {
            if self.options.show_all {
                io.println(&Color::Green.paint(&format!("  Passed: {}", test.name)))?;
            }
            return Ok(());
        }

        io.println(&Color::Red.paint(&format!("  Failed: {}", test.name)))?;
        if !self.options.show_details {
            return Ok(());
        }
        if let Some(message) = &test.message {
            for line in message.lines() {
                io.println(&format!("{DETAIL_INDENT}{line}"))?;
            }
        }
        if !test.points.is_empty() {
            io.println(&format!("{DETAIL_INDENT}Points: {}", test.points.join(", ")))?;
        }
        Ok(())
    }

    fn print_logs(&self, io: &mut dyn Io, result: &RunResult) -> io::Result<()> {
        if !self.options.show_details {
            return Ok(());
        }
        if let Some(logs) = &result.logs {
            for line in logs.lines() {
                io.println(line)?;
            }
        }
        Ok(())
    }
}

/// Bar showing the share of passed tests, sized to `width` columns.
///
/// A batch without any tests renders as 0%.
pub fn passed_tests_bar(
    passed: usize,
    total: usize,
    filled_color: Color,
    empty_color: Color,
    width: usize,
) -> String {
    let fraction = if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    };
    bar(fraction, bar_cells(width), filled_color, empty_color)
}
