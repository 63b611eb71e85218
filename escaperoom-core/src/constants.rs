//! Centralized scoring and tuning constants for the escape-room core.
//!
//! These values define the deterministic math for mission scoring and
//! the sync layer. Keeping them together ensures that balance can only
//! be adjusted via code changes reviewed in version control.

// Storage keys -------------------------------------------------------------
pub(crate) const SAVE_KEY: &str = "escaperoom.save";
pub(crate) const SHARED_KEY: &str = "escaperoom.shared";

// Instructor dashboard -----------------------------------------------------
/// Recommended polling cadence for the instructor view. The board itself
/// holds no timer; the UI layer owns scheduling and teardown.
pub const POLL_INTERVAL_MS: u64 = 2_000;
/// A player is "active" while their last shared update is younger than this.
pub const STALENESS_THRESHOLD_MS: u64 = 5 * 60 * 1_000;

// Ordered-block mission ----------------------------------------------------
pub(crate) const ORDER_POINTS_PER_SLOT: i32 = 20;
pub(crate) const ORDER_ALL_FILLED_BONUS: i32 = 10;

// Build-metric mission -----------------------------------------------------
pub(crate) const BUILD_CHECK_POINTS: i32 = 30;
pub(crate) const BUILD_OPT_BONUS: i32 = 10;
/// Simulated build time cannot drop below this, no matter the optimizations.
pub(crate) const BUILD_TIME_FLOOR_S: u32 = 15;
/// Simulated image size floor in megabytes.
pub(crate) const BUILD_SIZE_FLOOR_MB: u32 = 150;

// Job-graph mission --------------------------------------------------------
pub(crate) const JOB_PRESENCE_WEIGHT: f32 = 40.0;
pub(crate) const JOB_DEPENDENCY_WEIGHT: f32 = 20.0;
pub(crate) const JOB_YAML_WEIGHT: f32 = 40.0;
pub(crate) const JOB_MISSING_PENALTY: f32 = 15.0;

// Log-error mission --------------------------------------------------------
pub(crate) const LOG_VISIBLE_WEIGHT: i32 = 40;
pub(crate) const LOG_FIXED_WEIGHT: f32 = 60.0;

// Config-field mission -----------------------------------------------------
pub(crate) const CONFIG_FIELD_POINTS: i32 = 15;
pub(crate) const CONFIG_REPLICA_BONUS: i32 = 10;
pub(crate) const CONFIG_HEALTH_BONUS: i32 = 10;
pub(crate) const CONFIG_SECRET_BONUS: i32 = 5;
pub(crate) const CONFIG_MAX_PORT: u32 = 65_535;

// Incident mission ---------------------------------------------------------
pub(crate) const INCIDENT_RESOLVE_WEIGHT: f32 = 30.0;
pub(crate) const INCIDENT_RESPONSE_TIERS: [(u64, i32); 3] = [(30_000, 25), (60_000, 20), (120_000, 12)];
pub(crate) const INCIDENT_RESPONSE_FLOOR: i32 = 5;
pub(crate) const INCIDENT_EXECUTION_TIERS: [(u64, i32); 2] = [(60_000, 20), (180_000, 12)];
pub(crate) const INCIDENT_EXECUTION_FLOOR: i32 = 6;
