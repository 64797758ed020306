/// What a host wants to happen to a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, poise::ChoiceParameter)]
pub enum RoundAction {
    #[name = "start"]
    Start,
    #[name = "finish"]
    Finish,
    #[name = "reopen"]
    Reopen,
    #[name = "rescore"]
    Rescore,
}
