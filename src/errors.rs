use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetmapError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("dataset fetch returned HTTP status {0}")]
    HttpStatus(u16),

    #[error(
        "retention statistic is not finite (stability={stability}, decay={decay}, \
         elapsed_days={elapsed_days})"
    )]
    NonFiniteStatistic {
        stability: f64,
        decay: f64,
        elapsed_days: f64,
    },

    #[error("typeset error: {0}")]
    Typeset(String),

    #[error("content agent closed")]
    AgentClosed,

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<std::io::Error> for RetmapError {
    fn from(error: std::io::Error) -> Self {
        RetmapError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for RetmapError {
    fn from(error: reqwest::Error) -> Self {
        RetmapError::Reqwest(Box::new(error))
    }
}
