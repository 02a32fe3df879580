//! Backup and table status formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::storage::{BackupInfo, TableStatus};

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Taken")]
    created_at: String,
    #[tabled(rename = "Size")]
    size: String,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Table")]
    name: &'static str,
    #[tabled(rename = "File")]
    path: String,
    #[tabled(rename = "Present")]
    exists: &'static str,
    #[tabled(rename = "Other layout")]
    other_exists: &'static str,
    #[tabled(rename = "Backups")]
    backups: usize,
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format the backups of one table, newest first
pub fn format_backup_list(table: &str, backups: &[BackupInfo]) -> String {
    if backups.is_empty() {
        return format!("No backups of {}.\n", table);
    }

    let rows: Vec<BackupRow> = backups
        .iter()
        .enumerate()
        .map(|(index, backup)| BackupRow {
            position: index + 1,
            filename: backup.filename.clone(),
            created_at: backup.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            size: format_size(backup.size_bytes),
        })
        .collect();

    let mut table_view = Table::new(rows);
    table_view
        .with(Style::psql())
        .modify(Columns::new(3..), Alignment::right());
    format!("{}\n{} backup(s)\n", table_view, backups.len())
}

/// Format the storage status of every table
pub fn format_table_status(statuses: &[TableStatus]) -> String {
    let rows: Vec<StatusRow> = statuses
        .iter()
        .map(|status| StatusRow {
            name: status.name,
            path: status.path.display().to_string(),
            exists: yes_no(status.exists),
            other_exists: yes_no(status.other_exists),
            backups: status.backups,
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_format_empty_backup_list() {
        assert_eq!(format_backup_list("inventory", &[]), "No backups of inventory.\n");
    }
}
