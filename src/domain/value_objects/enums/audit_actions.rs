use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    RequestReceived,
    ProcessCompleted,
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            AuditAction::RequestReceived => "REQUEST_RECEIVED",
            AuditAction::ProcessCompleted => "PROCESS_COMPLETED",
        };
        write!(f, "{}", action)
    }
}
