use thiserror::Error;

/// Local rejections. None of these change session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("nothing to send")]
    InvalidInput,

    #[error("waiting for response")]
    DispatchActive,

    #[error("navigation is only available in review mode")]
    NotInReviewMode,

    #[error("text can only be submitted in compose mode")]
    NotInComposeMode,
}
