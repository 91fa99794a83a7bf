//! Server report export.
//!
//! `excel` writes the server table as an HTML document with a spreadsheet
//! extension (spreadsheet apps open it as a sheet); `pdf` is the print path
//! and renders a plain-text table to the given writer.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use fleetwatch_common::ServerRecord;

pub const EXCEL_MIME_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.12";
pub const EXCEL_FILE_NAME: &str = "server-report.xls";

const COLUMNS: [&str; 6] = ["ID", "IP Address", "Name", "Memory", "Type", "Status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Excel,
    Pdf,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report format '{0}', expected excel or pdf")]
    UnknownFormat(String),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" | "xls" => Ok(ReportFormat::Excel),
            "pdf" | "print" => Ok(ReportFormat::Pdf),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Where a finished export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exported {
    File(PathBuf),
    Printed,
}

pub fn export(
    format: ReportFormat,
    servers: &[ServerRecord],
    out_dir: &Path,
    printer: &mut impl Write,
) -> Result<Exported, ReportError> {
    match format {
        ReportFormat::Excel => write_excel(servers, out_dir).map(Exported::File),
        ReportFormat::Pdf => {
            printer.write_all(render_text_table(servers).as_bytes())?;
            printer.flush()?;
            Ok(Exported::Printed)
        }
    }
}

pub fn write_excel(servers: &[ServerRecord], out_dir: &Path) -> Result<PathBuf, ReportError> {
    let path = out_dir.join(EXCEL_FILE_NAME);
    std::fs::write(&path, render_html_table(servers))?;
    tracing::info!(path = %path.display(), servers = servers.len(), mime = EXCEL_MIME_TYPE, "report exported");
    Ok(path)
}

pub fn render_html_table(servers: &[ServerRecord]) -> String {
    let mut html = String::from("<table id=\"servers-table\">\n<thead><tr>");
    for col in COLUMNS {
        let _ = write!(html, "<th>{col}</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for srv in servers {
        html.push_str("<tr>");
        for cell in cells(srv) {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn render_text_table(servers: &[ServerRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<16} {:<28} {:<10} {:<16} {:<12}",
        COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5]
    );
    let _ = writeln!(out, "{:-<93}", "");
    for srv in servers {
        let [id, ip, name, memory, kind, status] = cells(srv);
        let _ = writeln!(
            out,
            "{:<6} {:<16} {:<28} {:<10} {:<16} {:<12}",
            id, ip, name, memory, kind, status
        );
    }
    out
}

fn cells(srv: &ServerRecord) -> [String; 6] {
    [
        srv.id.to_string(),
        srv.ip_address.clone(),
        srv.name.clone(),
        srv.memory.clone(),
        srv.server_type.clone(),
        srv.status.label().to_string(),
    ]
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetwatch_common::ServerStatus;

    fn servers() -> Vec<ServerRecord> {
        vec![
            ServerRecord {
                id: 2,
                ip_address: "192.168.1.58".to_string(),
                name: "Fedora <Tower>".to_string(),
                memory: "16 GB".to_string(),
                server_type: "Dell Tower".to_string(),
                status: ServerStatus::Down,
            },
            ServerRecord {
                id: 1,
                ip_address: "192.168.1.160".to_string(),
                name: "Ubuntu Linux".to_string(),
                memory: "16 GB".to_string(),
                server_type: "Personal PC".to_string(),
                status: ServerStatus::Up,
            },
        ]
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("EXCEL".parse::<ReportFormat>().unwrap(), ReportFormat::Excel);
        assert_eq!("pdf".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert!(matches!(
            "csv".parse::<ReportFormat>(),
            Err(ReportError::UnknownFormat(f)) if f == "csv"
        ));
    }

    #[test]
    fn test_html_table_escapes_cells() {
        let html = render_html_table(&servers());
        assert!(html.starts_with("<table id=\"servers-table\">"));
        assert!(html.contains("<td>Fedora &lt;Tower&gt;</td>"));
        assert!(html.contains("<td>SERVER UP</td>"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_excel_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = Vec::new();
        let out = export(ReportFormat::Excel, &servers(), dir.path(), &mut sink).unwrap();
        let path = dir.path().join(EXCEL_FILE_NAME);
        assert_eq!(out, Exported::File(path.clone()));
        assert!(std::fs::read_to_string(path).unwrap().contains("192.168.1.160"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_print_export_renders_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = Vec::new();
        let out = export(ReportFormat::Pdf, &servers(), dir.path(), &mut sink).unwrap();
        assert_eq!(out, Exported::Printed);

        let text = String::from_utf8(sink).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2 "));
        assert!(lines[3].contains("SERVER UP"));
        assert!(!dir.path().join(EXCEL_FILE_NAME).exists());
    }
}
