use strum::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Where the controller is in its engine binding lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum AttachmentState {
    #[default]
    Unattached,
    Connecting,
    Attached,
}
