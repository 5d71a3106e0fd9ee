//! Help screen: win probability table.

use fair_dice_core::ProbabilityMatrix;
use std::fmt;

const CORNER: &str = "User dice \\ Computer dice";

/// The matrix with the user's die as rows and the computer's as columns.
/// The diagonal shows each die's computed tie probability against itself.
pub struct Table<'a> {
    matrix: &'a ProbabilityMatrix,
}

impl<'a> Table<'a> {
    pub fn new(matrix: &'a ProbabilityMatrix) -> Self {
        Self { matrix }
    }

    fn cells(&self) -> Vec<Vec<String>> {
        self.matrix
            .rows()
            .enumerate()
            .map(|(i, (_, odds))| {
                odds.iter()
                    .enumerate()
                    .map(|(j, odds)| {
                        if i == j {
                            format!("- ({:.4})", odds.tie_probability())
                        } else {
                            format!("{:.4}", odds.win_probability())
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.matrix.dice().iter().map(|d| d.to_string()).collect();
        let rows = self.cells();
        let width = labels
            .iter()
            .map(String::len)
            .chain(rows.iter().flatten().map(String::len))
            .chain(std::iter::once(CORNER.len()))
            .max()
            .unwrap_or(0);

        let columns = labels.len() + 1;
        rule(f, columns, width)?;
        writeln!(f)?;
        row(f, CORNER, &labels, width)?;
        rule(f, columns, width)?;
        writeln!(f)?;
        for (label, cells) in labels.iter().zip(&rows) {
            row(f, label, cells, width)?;
        }
        rule(f, columns, width)
    }
}

fn rule(f: &mut fmt::Formatter<'_>, columns: usize, width: usize) -> fmt::Result {
    f.write_str("+")?;
    for _ in 0..columns {
        write!(f, "{}+", "-".repeat(width + 2))?;
    }
    Ok(())
}

fn row(f: &mut fmt::Formatter<'_>, first: &str, rest: &[String], width: usize) -> fmt::Result {
    write!(f, "| {:<width$} |", first, width = width)?;
    for cell in rest {
        write!(f, " {:<width$} |", cell, width = width)?;
    }
    writeln!(f)
}
