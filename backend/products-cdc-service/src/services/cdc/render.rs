//! One-line, human-readable summaries of change events

use std::fmt;
use std::io::Write;

use super::models::{ChangeEvent, RowChange};

impl fmt::Display for RowChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (verb, row) = match self {
            RowChange::Create(row) => ("Created", row),
            RowChange::Update(row) => ("Updated", row),
            RowChange::Read(row) => ("Read", row),
            RowChange::Delete(key) => return write!(f, "Deleted id: {}", key.id),
        };
        write!(
            f,
            "{} id: {}, name: {}, price: {:.2}",
            verb, row.id, row.name, row.price
        )
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.change, f)
    }
}

/// Write the summary line for `event` to `out`.
pub fn render<W: Write>(out: &mut W, event: &ChangeEvent) -> std::io::Result<()> {
    writeln!(out, "{}", event)
}
