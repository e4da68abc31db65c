pub mod config;
pub mod deck;
pub mod driver;
pub mod error;
pub mod runner;
pub mod session;
pub mod slides;
pub mod state;
pub mod summary;
pub mod trial;

pub use config::{ConfigError, StroopConfig};
pub use deck::build_deck;
pub use driver::{HeadlessRun, Responder, dispatch, run_headless};
pub use error::StroopError;
pub use runner::{Advance, RunContext};
pub use session::{Cursor, PracticeCounters, Session};
pub use slides::{BlankSlide, BlankTiming, BreakSlide, FeedbackSlide, ReadySlide, Slide, SlideStatus, SlideStep};
pub use state::{Frame, StroopStateMachine};
pub use summary::ResultSummary;
pub use trial::{TrialDurations, TrialSlide};
