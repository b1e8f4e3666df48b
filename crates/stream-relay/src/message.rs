/// One item of the relay queue.
///
/// A stream is zero or more `Delta`s followed by at most one terminal item (`End` or `Error`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    /// A non-empty piece of response text, in arrival order.
    Delta(String),
    /// Every provider failed; carries the cause for logging.
    Error(String),
    /// The response completed successfully.
    End,
}
