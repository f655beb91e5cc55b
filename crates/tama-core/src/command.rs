/// Everything the key mapping layer can ask the session to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SubmitText(String),
    EnterCompose,
    ExitCompose,
    Interrupt,
    NavigateNext,
    NavigatePrevious,
    ScrollTop,
    ScrollBottom,
    ScrollBy(isize),
    ScrollPage(isize),
    ResetSession,
    Terminate,
}

/// Submitted text is either a prompt or one of the typed session commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputAction {
    Prompt(String),
    Reset,
    Quit,
}

pub fn parse_input(text: &str) -> InputAction {
    let trimmed = text.trim();
    match trimmed {
        "clear" => InputAction::Reset,
        "exit" | "quit" => InputAction::Quit,
        _ => InputAction::Prompt(trimmed.to_string()),
    }
}
