pub mod sink;
pub mod train;

pub use sink::{ConsoleScoreSink, FrameSink, NoopFrameSink, NoopScoreSink, ScoreSink};
pub use train::{TrainConfig, TrainMode};
