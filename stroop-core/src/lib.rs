pub mod host;
pub mod input;
pub mod phase;
pub mod screen;
pub mod stimulus;
pub mod surface;
pub mod trial;

pub use host::{DataSink, Effect, HostControls, MemorySink, NoopHost, SinkError};
pub use input::{Key, KeyBuffer};
pub use phase::StroopPhase;
pub use screen::{Screen, Verdict};
pub use stimulus::{InkColor, StroopStimulus};
pub use surface::{Rgba, Surface};
pub use trial::{TrialRecord, TrialState};
