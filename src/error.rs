use thiserror::Error;

/// Errors that abort a whole test batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{0} is not a valid exercise.")]
    InvalidExercise(String),
    #[error("You have to be in a course directory to run tests")]
    NoExercises,
    #[error("writing to the terminal failed: {0}")]
    Output(#[from] std::io::Error),
}

/// Failure of the execution engine for a single exercise.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not launch the test runner: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("reading test runner output failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("test runner exited without results: {0}")]
    Crashed(String),
}

/// Errors from the TMC server client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("incorrect username or password")]
    Unauthorized,
    #[error("server responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
