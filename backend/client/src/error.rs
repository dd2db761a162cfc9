use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response status: {0}")]
    Status(reqwest::StatusCode),
}
