//! DevOps Escape Room core
//!
//! Platform-agnostic logic for the escape-room tutorial: the mission
//! catalog, the per-mission validators, the player progress store, the
//! persistence/sync layer and the instructor aggregator. No UI or
//! platform-specific dependencies live here; the browser shell plugs in
//! through the [`ProgressStorage`] and [`Clock`] traits.

pub mod constants;
pub mod difficulty;
pub mod instructor;
pub mod missions;
pub mod persist;
pub mod player;
pub mod token;
pub mod validators;

// Re-export commonly used types
pub use difficulty::{Difficulty, DifficultySettings};
pub use instructor::{ImportError, InstructorBoard, PlayerSummary};
pub use missions::{
    BlockCategory, BuildMetricsSpec, ConfigFieldsSpec, IncidentSpec, JobGraphSpec, LogErrorsSpec,
    MISSION_COUNT, MissionDefinition, OptimizationDef, OrderedBlocksSpec, RiskTier, StrategyDef,
    ValidationSpec, catalog, mission,
};
pub use persist::{FixedClock, MemoryStorage, PersistError, SaveFile, SharedEntry, SystemClock};
pub use player::{MissionProgress, PlayerError, PlayerRecord, ProgressStore, ProgressUpdate};
pub use token::{TokenError, TokenPayload, decode_token, encode_token};
pub use validators::{
    BuildMetricsSubmission, DeployConfig, IncidentSubmission, JobGraphSubmission, JobSubmission,
    LogErrorsSubmission, OrderedBlocksSubmission, Submission, ValidationDetail,
    ValidationInputError, ValidationResult, validate,
};

/// Trait for abstracting the durable key/value medium progress is saved to.
/// The browser shell backs this with `localStorage`; tests use
/// [`MemoryStorage`].
pub trait ProgressStorage {
    type Error: std::error::Error + 'static;

    /// Read the raw document stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn read(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write the raw document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (unavailable,
    /// quota exceeded).
    fn write(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Trait for abstracting wall-clock reads. Shared-namespace entries and
/// the instructor's staleness computation are stamped with epoch millis
/// obtained through this seam so tests can pin time.
pub trait Clock {
    /// Current time as milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}
