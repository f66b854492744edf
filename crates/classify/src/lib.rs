pub mod classifier;
pub mod stage;

pub use classifier::{ClassifyError, MockClassifier, SpamClassifier, StubClassifier};
pub use stage::{ClassificationOutcome, TextClassifier};
