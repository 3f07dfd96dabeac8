pub mod level;
pub mod score;
pub mod session;

pub use level::{catalog, level_by_id, next_level, Difficulty, Level, LevelConstraints, LevelInfo, Reward};
pub use score::{efficiency, innovation, level_score, Submission};
pub use session::{GameSession, Metrics};
