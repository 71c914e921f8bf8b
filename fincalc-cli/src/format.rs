//! Text and JSON rendering of results.
//!
//! Amounts follow South African convention: a space between thousands and a
//! decimal comma (`R 1 234 567,89`).

use fincalc_core::calculations::common::{HUNDRED, round_half_up};
use rust_decimal::Decimal;
use serde::Serialize;

const LABEL_WIDTH: usize = 34;
const VALUE_WIDTH: usize = 20;
const COLUMN_WIDTH: usize = 16;

/// Formats a rand amount, rounded to cents.
pub fn format_rand(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
    format!("{sign}R {},{cents}", group_thousands(whole))
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    grouped
}

/// Formats a rate fraction as a percentage with two decimals.
pub fn format_rate(rate: Decimal) -> String {
    format!("{:.2}%", (rate * HUNDRED).round_dp(2)).replace('.', ",")
}

/// Formats an annual percentage that is already in `[0, 100]`.
pub fn format_percent(percent: Decimal) -> String {
    format_rate(percent / HUNDRED)
}

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Heading(String),
    Row(String, String),
    Table(Vec<String>),
    Note(String),
}

/// A titled block of output with a JSON twin.
#[derive(Debug, Clone)]
pub struct Report {
    title: String,
    lines: Vec<Line>,
    json: serde_json::Value,
}

impl Report {
    /// Starts a report whose JSON form is `result` serialized.
    pub fn new<T: Serialize>(
        title: impl Into<String>,
        result: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            title: title.into(),
            lines: Vec::new(),
            json: serde_json::to_value(result)?,
        })
    }

    pub fn heading(
        mut self,
        text: impl Into<String>,
    ) -> Self {
        self.lines.push(Line::Heading(text.into()));
        self
    }

    pub fn row(
        mut self,
        label: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.lines.push(Line::Row(label.into(), value.into()));
        self
    }

    pub fn rand(
        self,
        label: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        self.row(label, format_rand(amount))
    }

    pub fn table_row<I, S>(
        mut self,
        cells: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines
            .push(Line::Table(cells.into_iter().map(Into::into).collect()));
        self
    }

    pub fn note(
        mut self,
        text: impl Into<String>,
    ) -> Self {
        self.lines.push(Line::Note(text.into()));
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn json(&self) -> &serde_json::Value {
        &self.json
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&"=".repeat(self.title.chars().count()));
        out.push('\n');

        for line in &self.lines {
            match line {
                Line::Heading(text) => {
                    out.push('\n');
                    out.push_str(text);
                    out.push('\n');
                }
                Line::Row(label, value) => {
                    out.push_str(&format!("{label:<LABEL_WIDTH$}{value:>VALUE_WIDTH$}\n"));
                }
                Line::Table(cells) => {
                    let row: String = cells
                        .iter()
                        .map(|cell| format!("{cell:>COLUMN_WIDTH$}"))
                        .collect();
                    out.push_str(row.trim_end());
                    out.push('\n');
                }
                Line::Note(text) => {
                    out.push_str("note: ");
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        out
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.json)
    }

    pub fn render(
        &self,
        json: bool,
    ) -> Result<String, serde_json::Error> {
        if json {
            self.render_json()
        } else {
            Ok(self.render_text())
        }
    }
}
