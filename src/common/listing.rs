use crate::{
    common::{AppEntry, SyncMessage},
    error::Result,
};
use itertools::Itertools;
use serde::Serialize;
use std::io::Write;
use tabled::{
    settings::{themes::Colorization, Alignment, Color, Padding, Style},
    Table, Tabled,
};

/// Internal helper struct for turning an `AppEntry` into tabular data
#[derive(Tabled, Serialize)]
struct AppEntryRow {
    name: String,
    package: String,
    component: String,
    #[tabled(display_with = "display_optional")]
    data: Option<String>,
    #[tabled(rename = "type", display_with = "display_optional")]
    #[serde(rename = "type")]
    mime_type: Option<String>,
    #[tabled(display_with("Self::display_categories", self))]
    categories: Vec<String>,
    /// Size of the encoded icon, the image itself is never printed
    icon_bytes: usize,
    #[tabled(skip)]
    #[serde(skip_serializing)]
    separator: &'static str,
}

impl AppEntryRow {
    fn new(entry: &AppEntry, separator: &'static str) -> Self {
        let launch = &entry.launch;
        Self {
            name: entry.display_name.clone(),
            package: entry.package_id.clone(),
            component: format!(
                "{}/{}",
                launch.component.package, launch.component.class
            ),
            data: launch.data.clone(),
            mime_type: launch.mime_type.as_ref().map(|m| m.to_string()),
            categories: launch.categories.clone(),
            icon_bytes: entry.icon.len(),
            separator,
        }
    }

    fn display_categories(&self) -> String {
        self.categories.iter().join(self.separator)
    }
}

fn display_optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Render a table from a vector of instances of Tabled structs
pub fn render_table<T: Tabled>(rows: &[T], terminal_output: bool) -> String {
    let mut table = Table::new(rows);

    if terminal_output {
        table
            .with(Style::sharp())
            .with(Colorization::rows([Color::FG_WHITE, Color::BG_BLACK]))
    } else {
        // Piped output is tab-delimited so it stays easy to parse
        table
            .with(Style::empty().vertical('\t'))
            .with(Alignment::left())
            .with(Padding::zero())
    }
    .to_string()
}

/// Write a list of application entries as a table or as json
pub fn entry_table<W: Write>(
    writer: &mut W,
    entries: &[AppEntry],
    output_json: bool,
    terminal_output: bool,
) -> Result<()> {
    let separator = if terminal_output { ",\n" } else { ", " };
    let rows = entries
        .iter()
        .map(|e| AppEntryRow::new(e, separator))
        .collect_vec();

    let output = if output_json {
        serde_json::to_string(&rows)?
    } else {
        render_table(&rows, terminal_output)
    };

    writeln!(writer, "{output}")?;
    Ok(())
}

/// Write the contents of an application list message
///
/// As json, the message is written on a single line in the form
/// `{"added": [...], "removed": [...]}`.
pub fn message_table<W: Write>(
    writer: &mut W,
    message: &SyncMessage,
    output_json: bool,
    terminal_output: bool,
) -> Result<()> {
    if output_json {
        let separator = ", ";
        let added = message
            .added
            .iter()
            .map(|e| AppEntryRow::new(e, separator))
            .collect_vec();
        let output = serde_json::json!({
            "added": added,
            "removed": message.removed,
        });
        writeln!(writer, "{output}")?;
        return Ok(());
    }

    if !message.added.is_empty() {
        entry_table(writer, &message.added, false, terminal_output)?;
    }
    for package in &message.removed {
        writeln!(writer, "removed\t{package}")?;
    }

    Ok(())
}
