pub mod engine;
pub mod outcome;
pub mod overrides;

pub use engine::{classify, classify_value, summarize};
pub use outcome::{AnalysisResult, BoundsSource, ClassifiedResult, Prediction, Unclassified};
