use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_stream::StreamExt;

use fleetwatch_common::{ServerDraft, StatusFilter};
use fleetwatch_dashboard::{report, Exported, ReportFormat, StateProjector};

use crate::output::print_state;

const HELP: &str = "\
commands:
  list                                      reload the server list
  ping <ip>                                 ping a server
  filter <ALL|SERVER_UP|SERVER_DOWN>        filter the list by status
  delete <id>                               delete a server
  save <ip>, <name>, <memory>, <type>[, <status>]
  report <excel|pdf> [dir]                  export the current list
  /quit                                     leave";

/// Interactive session: actions are dispatched without waiting, state and
/// signal changes are printed as they are broadcast.
pub async fn run_console(projector: &StateProjector) -> Result<()> {
    println!("fleetwatch console: type help for commands, /quit to exit");

    let mut states = projector.states();
    let mut pinging = projector.filter_status().stream();
    let mut saving = projector.loading().stream();
    let mut last = Some(projector.state());
    let printer = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(state) = states.next() => {
                    if last.as_ref() != Some(&state) {
                        print_state(&state);
                        last = Some(state);
                    }
                }
                Some(ip) = pinging.next() => {
                    if !ip.is_empty() {
                        println!("⟳ pinging {ip}");
                    }
                }
                Some(busy) = saving.next() => {
                    if busy {
                        println!("⟳ saving server");
                    }
                }
                else => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b">>> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" || line == "/exit" {
            break;
        }
        if let Err(err) = dispatch(projector, line) {
            eprintln!("✗ {err}");
        }
    }

    printer.abort();
    Ok(())
}

fn dispatch(projector: &StateProjector, line: &str) -> Result<()> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match cmd {
        "help" => println!("{HELP}"),
        "list" => {
            projector.load();
        }
        "ping" => {
            if rest.is_empty() {
                anyhow::bail!("ping expects an ip address");
            }
            projector.ping(rest);
        }
        "filter" => {
            let status: StatusFilter = rest.parse()?;
            projector.filter(status);
        }
        "delete" => {
            let id: i64 = rest
                .parse()
                .map_err(|_| anyhow::anyhow!("delete expects a numeric id, got '{rest}'"))?;
            projector.delete(id);
        }
        "save" => {
            projector.save(parse_draft(rest)?);
        }
        "report" => {
            let (format, dir) = rest.split_once(' ').unwrap_or((rest, "."));
            let format: ReportFormat = format.parse()?;
            let dir = PathBuf::from(dir.trim());
            match report::export(format, &projector.visible_servers(), &dir, &mut std::io::stdout())? {
                Exported::File(path) => println!("✓ Report written to {}", path.display()),
                Exported::Printed => {}
            }
        }
        other => anyhow::bail!("unknown command '{other}', type help"),
    }
    Ok(())
}

fn parse_draft(raw: &str) -> Result<ServerDraft> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [ip_address, name, memory, server_type, rest @ ..] = fields.as_slice() else {
        anyhow::bail!("save expects: <ip>, <name>, <memory>, <type>[, <status>]");
    };
    let status = match rest {
        [] => Default::default(),
        [status] => status.parse()?,
        _ => anyhow::bail!("save takes at most five fields"),
    };
    Ok(ServerDraft {
        ip_address: ip_address.to_string(),
        name: name.to_string(),
        memory: memory.to_string(),
        server_type: server_type.to_string(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use fleetwatch_client::MemoryServerApi;
    use fleetwatch_common::ServerStatus;
    use fleetwatch_dashboard::TracingNotifier;

    async fn sample_projector() -> StateProjector {
        let projector =
            StateProjector::new(Arc::new(MemoryServerApi::sample()), Arc::new(TracingNotifier));
        projector.load().settled().await.unwrap();
        projector
    }

    fn exported_rows(dir: &std::path::Path) -> usize {
        let html = std::fs::read_to_string(dir.join(report::EXCEL_FILE_NAME)).unwrap();
        html.matches("<tr>").count() - 1
    }

    #[tokio::test]
    async fn test_report_exports_filtered_view() {
        let projector = sample_projector().await;
        let dir = tempfile::tempdir().unwrap();
        let line = format!("report excel {}", dir.path().display());

        dispatch(&projector, &line).unwrap();
        assert_eq!(exported_rows(dir.path()), 4);

        projector
            .filter(StatusFilter::Only(ServerStatus::Up))
            .settled()
            .await
            .unwrap();
        dispatch(&projector, &line).unwrap();
        assert_eq!(exported_rows(dir.path()), 2);
    }

    #[tokio::test]
    async fn test_unknown_commands_are_rejected() {
        let projector = sample_projector().await;
        assert!(dispatch(&projector, "reboot everything").is_err());
        assert!(dispatch(&projector, "ping").is_err());
        assert!(dispatch(&projector, "delete abc").is_err());
        assert!(dispatch(&projector, "filter SIDEWAYS").is_err());
    }

    #[test]
    fn test_parse_draft() {
        let draft = parse_draft("10.0.0.9, Arch Linux, 8 GB, Build Server, SERVER_UP").unwrap();
        assert_eq!(draft.ip_address, "10.0.0.9");
        assert_eq!(draft.name, "Arch Linux");
        assert_eq!(draft.server_type, "Build Server");
        assert_eq!(draft.status, ServerStatus::Up);

        let draft = parse_draft("10.0.0.9, db, 8 GB, Mail Server").unwrap();
        assert_eq!(draft.status, ServerStatus::Down);
    }

    #[test]
    fn test_parse_draft_rejects_short_input() {
        assert!(parse_draft("10.0.0.9, db").is_err());
        assert!(parse_draft("10.0.0.9, db, 8 GB, Mail, SERVER_UP, extra").is_err());
        assert!(parse_draft("10.0.0.9, db, 8 GB, Mail, SIDEWAYS").is_err());
    }
}
