pub(crate) mod accent_color;
pub(crate) mod command;
pub(crate) mod connection_state;
pub(crate) mod playback_state;
pub(crate) mod queue_item;
pub(crate) mod session_event;
pub(crate) mod session_response;
pub(crate) mod session_status;
