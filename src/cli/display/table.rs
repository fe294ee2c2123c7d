//! Table builder around comfy-table for the live record page.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

use super::colors::colorize_level;
use crate::cli::output::truncate;
use crate::domain::models::{LiveView, LogRow, RecordId};

const DESCRIPTION_WIDTH: usize = 60;

/// Table of rows, the followed row marked with `>`.
pub fn record_table(rows: &[LogRow], followed: Option<RecordId>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["", "#", "EVENT ON", "LEVEL", "DEVICE", "DESCRIPTION"]
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left)),
        );

    for row in rows {
        let record = &row.record;
        let marker = if Some(record.id) == followed { ">" } else { "" };
        table.add_row(vec![
            Cell::new(marker),
            Cell::new(row.index).set_alignment(CellAlignment::Right),
            Cell::new(record.event_on.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(colorize_level(record.level)),
            Cell::new(record.device.as_deref().unwrap_or("-")),
            Cell::new(truncate(
                record.description.as_deref().unwrap_or(""),
                DESCRIPTION_WIDTH,
            )),
        ]);
    }
    table
}

/// Header line plus the current page of the view.
pub fn render_page(view: &LiveView) -> String {
    let header = format!(
        "{}  {} records  {} errors  {} warnings  page {}/{}",
        style(view.subject()).bold(),
        view.len(),
        style(view.error_count()).red(),
        style(view.warning_count()).yellow(),
        view.page_index() + 1,
        view.page_count(),
    );
    if view.is_empty() {
        return format!("{header}\nNo records.");
    }
    format!("{header}\n{}", record_table(view.page(), view.followed()))
}
