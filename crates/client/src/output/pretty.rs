//! Pretty output formatting.

use didit_core::confirm::ConfirmPhase;
use didit_core::entry::Entry;
use didit_core::view::EntriesView;

/// Format an entry for display.
pub fn format_entry(entry: &Entry) -> String {
    format!(
        "#{}  {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Format an entry row, marking it when a delete is awaiting confirmation.
pub fn format_row(entry: &Entry, phase: ConfirmPhase) -> String {
    match phase {
        ConfirmPhase::Idle => format_entry(entry),
        ConfirmPhase::Confirming => format!("{}  [confirm delete?]", format_entry(entry)),
    }
}

/// Format entries for display.
pub fn format_entries(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return "No entries yet.".to_string();
    }
    let mut output = format!("ENTRIES ({})\n", entries.len());
    output.push_str(&"-".repeat(40));
    for entry in entries {
        output.push_str(&format!("\n{}", format_entry(entry)));
    }
    output
}

/// Format the derived view for display.
pub fn format_view(view: &EntriesView) -> String {
    match view {
        EntriesView::LoggedOut => "Not logged in. Pass --user <NAME> to log in.".to_string(),
        EntriesView::Loading { user, rows } => {
            let mut output = format!("Hello {}!\nLoading…", user);
            if let Some(rows) = rows {
                output.push('\n');
                output.push_str(&format_entries(rows));
            }
            output
        }
        EntriesView::Error { user, message } => {
            format!("Hello {}!\nError: {}", user, message)
        }
        EntriesView::Ready { user, rows, .. } => {
            format!("Hello {}!\n{}", user, format_entries(rows))
        }
    }
}
