pub mod game;
pub mod times;

pub use game::Game;
pub use times::{Category, GameTime, LookupResult, ReviewAverage};
