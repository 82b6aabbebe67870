// Generation Module - Acronym generation from captured text
//
// Components:
// - mining: Repeated phrase extraction over captured entries
// - synthesis: Deterministic label synthesis with rotating strategies
// - similarity: Fingerprint cache, similarity gate, and feedback adjustment
// - orchestrator: One generation pass end to end
// - worker: Background task serializing generation requests

pub mod mining;
pub mod orchestrator;
pub mod similarity;
pub mod synthesis;
pub mod worker;

pub use mining::{PhraseCandidate, PhraseMiner};
pub use orchestrator::{GenerationError, GenerationOrchestrator, GenerationReport, LabelChoice};
pub use similarity::{Fingerprinter, LetterFrequency, SimilarityGate};
pub use synthesis::{synthesize, Strategy};
pub use worker::{GenerationHandle, GenerationWorker};
