/// Dialogue state for inputs that take a follow-up message.
#[derive(Clone, Default, Debug)]
pub enum State {
    #[default]
    Start,
    AwaitingAmount,
    AwaitingNewRate,
}
