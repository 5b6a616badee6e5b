/// What travels over a pipeline queue: a payload, or one of the two
/// terminal markers.
///
/// Each stage sends exactly one terminal message before it exits. A send
/// that fails because the downstream stage has already gone is not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum StageMessage<T> {
    Item(T),
    /// Upstream finished normally.
    End,
    /// Upstream could not continue; carries the reason.
    Failed(String),
}

impl<T> StageMessage<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StageMessage::Item(_))
    }
}
