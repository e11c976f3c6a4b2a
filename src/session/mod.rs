pub mod controller;
pub mod prompt;
pub mod surface;

pub use controller::{PracticeController, PracticeError, PracticeMode, SessionState};
pub use prompt::Prompt;
pub use surface::{PracticeSurface, Surface};
