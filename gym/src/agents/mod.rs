mod random_agent;

pub use candy_engine::{Agent, Engine};
pub use random_agent::RandomAgent;
