use std::fmt::Write as _;

use fleetwatch_common::{ResponseEnvelope, ServerStatus};
use fleetwatch_dashboard::{AppState, NotificationLevel, Notifier};

pub fn print_state(state: &AppState) {
    if let Some(text) = render_state(state) {
        print!("{text}");
    }
}

/// Text for a state change. Errors render nothing: the notifier has
/// already shown them.
pub fn render_state(state: &AppState) -> Option<String> {
    match state {
        AppState::Loading => Some("… loading servers\n".to_string()),
        AppState::Loaded(env) => Some(render_servers(env)),
        AppState::Error(_) => None,
    }
}

pub fn render_servers(env: &ResponseEnvelope) -> String {
    let mut out = String::from("\n=== Servers ===\n\n");
    if env.servers().is_empty() {
        out.push_str("No servers to display.\n\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<6} {:<16} {:<28} {:<10} {:<16} {:<12}",
        "ID", "IP Address", "Name", "Memory", "Type", "Status"
    );
    let _ = writeln!(out, "{:-<93}", "");
    for srv in env.servers() {
        let status = match srv.status {
            ServerStatus::Up => "● SERVER UP",
            ServerStatus::Down => "○ SERVER DOWN",
        };
        let _ = writeln!(
            out,
            "{:<6} {:<16} {:<28} {:<10} {:<16} {:<12}",
            srv.id, srv.ip_address, srv.name, srv.memory, srv.server_type, status
        );
    }
    out.push('\n');
    out
}

/// Prints notifications as one-line toasts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Default => println!("• {message}"),
            NotificationLevel::Success => println!("✓ {message}"),
            NotificationLevel::Error => eprintln!("✗ {message}"),
        }
    }
}
