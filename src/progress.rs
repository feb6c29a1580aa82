//! Live progress line for a single running exercise.

use console::{measure_text_width, pad_str, truncate_str, Alignment};

use crate::{color::Color, terminal::Io};

pub const FILLED_CELL: char = '█';
pub const EMPTY_CELL: char = '░';

const ELLIPSIS: &str = "...";
/// Columns taken by the percentage and the two brackets.
const BAR_FRAME_WIDTH: usize = 6;
/// Message truncation keeps at least this many bar cells visible.
const MIN_BAR_CELLS: usize = 10;

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// Four column, right aligned percentage, e.g. `"  6%"`.
pub fn percentage(fraction: f64) -> String {
    let percent = (clamp_fraction(fraction) * 100.0).round() as u32;
    format!("{percent:>3}%")
}

/// `"<pct>[<filled><empty>]"` with `cells` bar cells between the brackets.
pub fn bar(fraction: f64, cells: usize, filled_color: Color, empty_color: Color) -> String {
    let fraction = clamp_fraction(fraction);
    let filled = ((fraction * cells as f64).round() as usize).min(cells);

    let filled_part: String = std::iter::repeat(FILLED_CELL).take(filled).collect();
    let empty_part: String = std::iter::repeat(EMPTY_CELL).take(cells - filled).collect();

    format!(
        "{}[{}{}]",
        percentage(fraction),
        filled_color.paint(&filled_part),
        empty_color.paint(&empty_part)
    )
}

/// Cuts `message` down to `width` columns, ending in `...` when there is room
/// for it.
fn fit_message(message: &str, width: usize) -> std::borrow::Cow<'_, str> {
    let tail = if width >= ELLIPSIS.len() { ELLIPSIS } else { "" };
    truncate_str(message, width, tail)
}

/// Number of bar cells that fit in `width` columns next to nothing else.
pub fn bar_cells(width: usize) -> usize {
    width.saturating_sub(BAR_FRAME_WIDTH)
}

/// Renders progress events of one exercise run onto a single terminal line.
///
/// Every call redraws the line from scratch using the width reported by the
/// [`Io`] at that moment.
pub struct ProgressReporter<'a> {
    io: &'a mut dyn Io,
    filled_color: Color,
    empty_color: Color,
    drawn: bool,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(io: &'a mut dyn Io, filled_color: Color, empty_color: Color) -> Self {
        Self {
            io,
            filled_color,
            empty_color,
            drawn: false,
        }
    }

    /// Show a plain status message padded or truncated to the terminal width.
    pub fn report_message(&mut self, message: &str) -> std::io::Result<()> {
        let width = self.io.width();
        let fitted = fit_message(message, width);
        let line = pad_str(&fitted, width, Alignment::Left, None);
        self.draw(&line)
    }

    /// Show `message` next to a percentage bar for `fraction`.
    pub fn report_progress(&mut self, fraction: f64, message: &str) -> std::io::Result<()> {
        let width = self.io.width();
        let budget = width.saturating_sub(BAR_FRAME_WIDTH + 1 + MIN_BAR_CELLS);
        let message = fit_message(message, budget);
        let line = if message.is_empty() {
            bar(fraction, bar_cells(width), self.filled_color, self.empty_color)
        } else {
            let cells = width.saturating_sub(BAR_FRAME_WIDTH + 1 + measure_text_width(&message));
            format!(
                "{} {}",
                bar(fraction, cells, self.filled_color, self.empty_color),
                message
            )
        };
        self.draw(&line)
    }

    /// Callback entry point for the execution engine.
    ///
    /// Terminal write failures are logged and otherwise ignored so that a
    /// broken pipe never aborts the test run itself.
    pub fn observe(&mut self, fraction: Option<f64>, message: &str) {
        let result = match fraction {
            Some(fraction) => self.report_progress(fraction, message),
            None => self.report_message(message),
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to draw progress line");
        }
    }

    /// Leave the last drawn line on screen and move to the next one.
    pub fn finish(mut self) -> std::io::Result<()> {
        if self.drawn {
            self.drawn = false;
            self.io.finish_line()?;
        }
        Ok(())
    }

    fn draw(&mut self, line: &str) -> std::io::Result<()> {
        self.io.overwrite_line(line)?;
        self.drawn = true;
        Ok(())
    }
}
