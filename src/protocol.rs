use candy_engine::{Direction, Position, Snake};
use serde::{Deserialize, Serialize};

/// One turn as read from stdin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TurnRequest {
    pub you: Snake,
    pub opponents: Vec<Snake>,
    #[serde(default)]
    pub candies: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TurnResponse {
    Move {
        r#move: Direction,
    },
    Error {
        error: String,
    },
}

pub fn decode_state(line: &str) -> color_eyre::Result<TurnRequest> {
    Ok(serde_json::from_str(line)?)
}
