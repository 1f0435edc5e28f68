use crate::coach::CoachStatus;

#[derive(Debug, Clone)]
pub enum AppEvent {
    CoachReply(String),
    CoachStatus(CoachStatus),
    Diagnostic(String),
}
