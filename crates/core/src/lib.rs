pub mod image;
pub mod session;
pub mod text;

pub use image::{AcquiredImage, Acquisition, ImageSource};
pub use session::{ScanPhase, SessionError, SessionEvent, SessionState, Transition};
pub use text::{RecognizedText, Verdict};
