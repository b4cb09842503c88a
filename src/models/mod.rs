pub mod brainwaves;
pub mod mental_state;
pub mod session;
pub mod snapshot;
pub mod test_result;

pub use brainwaves::Brainwaves;
pub use mental_state::{MentalState, MentalStateUpdate};
pub use session::Session;
pub use snapshot::{ConsciousnessSnapshot, EmotionalState, EnvironmentalFactors, TimeOfDay};
pub use test_result::{
    ColorTrial, ImprovementPattern, MemoryRound, TestMetrics, TestOutcome, TestResult, TestType,
    TrialData,
};
