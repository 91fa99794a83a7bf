use fleetwatch_common::{ResponseEnvelope, StatusFilter};

/// Narrow `envelope` to the servers matching `status`, keeping cache order.
///
/// `ALL` passes the envelope through with only its message replaced.
pub fn filter_envelope(status: StatusFilter, envelope: &ResponseEnvelope) -> ResponseEnvelope {
    let wanted = match status {
        StatusFilter::All => {
            return envelope.with_message(format!("Servers filtered by {status} status"));
        }
        StatusFilter::Only(s) => s,
    };

    let matching: Vec<_> = envelope
        .servers()
        .iter()
        .filter(|srv| srv.status == wanted)
        .cloned()
        .collect();

    let message = if matching.is_empty() {
        format!("No servers of {wanted} found")
    } else {
        format!("Servers filtered by {} status", wanted.label())
    };

    tracing::debug!(filter = %status, matched = matching.len(), "filtered cached servers");
    envelope.with_servers(matching).with_message(message)
}
