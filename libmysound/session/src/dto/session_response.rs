use super::session_status::SessionStatus;

#[derive(Clone, Debug)]
pub(crate) enum SessionResponse {
    Status(SessionStatus),
    Stopped,
}
