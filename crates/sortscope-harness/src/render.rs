#![forbid(unsafe_code)]

//! Bar-chart rendering of an [`ArrayModel`].
//!
//! [`BarChart::layout`] turns the array into a [`Frame`]: one column per
//! element, scaled so the largest value fills the chart height. The frame
//! knows which columns the last event touched. [`Frame::to_text`] gives a
//! plain rendering for tests and logs; [`TerminalChart`] paints frames with
//! crossterm colors and redraws in place.
//!
//! # Invariants
//!
//! - A column's filled height is in `0..=height`.
//! - Any positive value gets at least one filled cell.
//! - Negative values render as empty columns.

use std::io::{self, Write};

use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use sortscope_core::ArrayModel;

/// Default chart height in rows.
pub const DEFAULT_CHART_HEIGHT: u16 = 12;

const BAR_GLYPH: char = '█';
const HIGHLIGHT_COLOR: Color = Color::Red;
const BAR_COLOR: Color = Color::Blue;

/// One bar of a laid-out frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub filled: u16,
    pub highlighted: bool,
}

/// A laid-out chart, ready to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    height: u16,
    bar_width: u16,
    columns: Vec<Column>,
}

impl Frame {
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Whether row `row` (0 is the top) is filled for `column`.
    fn is_filled(&self, row: u16, column: &Column) -> bool {
        column.filled >= self.height - row
    }

    /// Plain rendering: `#` for bars, `*` for highlighted bars.
    ///
    /// Rows are separated by `\n`, with no trailing newline.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for row in 0..self.height {
            if row > 0 {
                text.push('\n');
            }
            for (idx, column) in self.columns.iter().enumerate() {
                if idx > 0 {
                    text.push(' ');
                }
                let glyph = match (self.is_filled(row, column), column.highlighted) {
                    (false, _) => ' ',
                    (true, false) => '#',
                    (true, true) => '*',
                };
                for _ in 0..self.bar_width {
                    text.push(glyph);
                }
            }
        }
        text
    }
}

/// Scales array values into bar heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarChart {
    height: u16,
    bar_width: u16,
}

impl Default for BarChart {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_HEIGHT)
    }
}

impl BarChart {
    /// A chart `height` rows tall (at least 1) with one-cell-wide bars.
    #[must_use]
    pub fn new(height: u16) -> Self {
        Self {
            height: height.max(1),
            bar_width: 1,
        }
    }

    #[must_use]
    pub fn with_bar_width(mut self, bar_width: u16) -> Self {
        self.bar_width = bar_width.max(1);
        self
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Lay out `array`, highlighting the pair from the last event.
    pub fn layout(&self, array: &ArrayModel, highlighted: Option<(usize, usize)>) -> Frame {
        let max = i64::from(array.max_value().unwrap_or(0).max(1));
        let height = i64::from(self.height);
        let columns = array
            .values()
            .iter()
            .enumerate()
            .map(|(idx, &value)| {
                let value = i64::from(value.max(0));
                // Ceiling division keeps small positive values visible.
                let filled = ((value * height + max - 1) / max).min(height);
                Column {
                    filled: u16::try_from(filled).unwrap_or(self.height),
                    highlighted: highlighted.is_some_and(|(i, j)| idx == i || idx == j),
                }
            })
            .collect();
        Frame {
            height: self.height,
            bar_width: self.bar_width,
            columns,
        }
    }
}

/// Paints frames to a terminal, overwriting the previous frame.
#[derive(Debug, Clone, Default)]
pub struct TerminalChart {
    chart: BarChart,
    drawn_rows: u16,
}

impl TerminalChart {
    #[must_use]
    pub fn new(chart: BarChart) -> Self {
        Self {
            chart,
            drawn_rows: 0,
        }
    }

    /// Draw `array` followed by a one-line `status`.
    pub fn draw<W: Write>(
        &mut self,
        out: &mut W,
        array: &ArrayModel,
        highlighted: Option<(usize, usize)>,
        status: &str,
    ) -> io::Result<()> {
        let frame = self.chart.layout(array, highlighted);

        if self.drawn_rows > 0 {
            crossterm::queue!(
                out,
                MoveUp(self.drawn_rows),
                MoveToColumn(0),
                Clear(ClearType::FromCursorDown)
            )?;
        }

        let bar: String = std::iter::repeat_n(BAR_GLYPH, usize::from(frame.bar_width)).collect();
        let gap: String = " ".repeat(usize::from(frame.bar_width));
        for row in 0..frame.height {
            for (idx, column) in frame.columns.iter().enumerate() {
                if idx > 0 {
                    crossterm::queue!(out, Print(' '))?;
                }
                if frame.is_filled(row, column) {
                    let color = if column.highlighted {
                        HIGHLIGHT_COLOR
                    } else {
                        BAR_COLOR
                    };
                    crossterm::queue!(out, SetForegroundColor(color), Print(&bar))?;
                } else {
                    crossterm::queue!(out, Print(&gap))?;
                }
            }
            crossterm::queue!(out, ResetColor, Print('\n'))?;
        }
        crossterm::queue!(out, Print(status), Print('\n'))?;
        out.flush()?;

        self.drawn_rows = frame.height.saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled(frame: &Frame) -> Vec<u16> {
        frame.columns().iter().map(|c| c.filled).collect()
    }

    #[test]
    fn tallest_value_fills_height() {
        let array = ArrayModel::from_values(vec![5, 10, 1]);
        let frame = BarChart::new(10).layout(&array, None);
        assert_eq!(filled(&frame), vec![5, 10, 1]);
    }

    #[test]
    fn small_values_stay_visible() {
        let array = ArrayModel::from_values(vec![1, 189]);
        let frame = BarChart::new(4).layout(&array, None);
        assert_eq!(filled(&frame), vec![1, 4]);
    }

    #[test]
    fn negative_and_zero_values_are_empty() {
        let array = ArrayModel::from_values(vec![-3, 0, 2]);
        let frame = BarChart::new(2).layout(&array, None);
        assert_eq!(filled(&frame), vec![0, 0, 2]);
    }

    #[test]
    fn zero_height_is_clamped() {
        assert_eq!(BarChart::new(0).height(), 1);
    }

    #[test]
    fn highlights_both_indices() {
        let array = ArrayModel::from_values(vec![1, 2, 3]);
        let frame = BarChart::new(3).layout(&array, Some((2, 0)));
        let flags: Vec<bool> = frame.columns().iter().map(|c| c.highlighted).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn text_rendering() {
        let array = ArrayModel::from_values(vec![1, 3, 2]);
        let frame = BarChart::new(3).layout(&array, Some((1, 2)));
        assert_eq!(frame.to_text(), "  *  \n  * *\n# * *");
    }

    #[test]
    fn text_rendering_respects_bar_width() {
        let array = ArrayModel::from_values(vec![2, 1]);
        let frame = BarChart::new(2).with_bar_width(2).layout(&array, None);
        assert_eq!(frame.to_text(), "##   \n## ##");
    }

    #[test]
    fn terminal_chart_paints_colors_and_status() {
        let array = ArrayModel::from_values(vec![1, 2]);
        let mut chart = TerminalChart::new(BarChart::new(2));
        let mut out = Vec::new();
        chart
            .draw(&mut out, &array, Some((0, 1)), "compare(0, 1)")
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(BAR_GLYPH));
        assert!(text.ends_with("compare(0, 1)\n"));
        // Red foreground escape for highlighted bars.
        assert!(text.contains("\u{1b}[38;5;9m"));
    }

    #[test]
    fn terminal_chart_redraws_in_place() {
        let array = ArrayModel::from_values(vec![1, 2]);
        let mut chart = TerminalChart::new(BarChart::new(2));
        let mut first = Vec::new();
        chart.draw(&mut first, &array, None, "ready").unwrap();
        assert!(!String::from_utf8(first).unwrap().contains("\u{1b}[3A"));

        let mut second = Vec::new();
        chart.draw(&mut second, &array, None, "done").unwrap();
        // Two chart rows plus the status line.
        assert!(String::from_utf8(second).unwrap().starts_with("\u{1b}[3A"));
    }
}
