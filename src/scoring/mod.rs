pub mod scorer;

pub use scorer::{ExitChoice, ExitScore, ScoreError, score_exits, select_exit};
