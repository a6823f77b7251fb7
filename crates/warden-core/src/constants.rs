//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Guard scan loop ---

/// Interval between full target/weapon selection passes (seconds).
pub const GUARD_SCAN_INTERVAL: f64 = 3.0;

/// Remaining scan wait is clamped to this when a missile threat is newly detected (seconds).
pub const GUARD_THREAT_RESCAN: f64 = 0.5;

/// Tracks beyond this range from a platform are not considered detected by it (meters).
pub const GUARD_DETECTION_RANGE: f64 = 20_000.0;

/// Duration an operator-override target stays pinned (seconds).
pub const TARGET_OVERRIDE_DURATION: f64 = 10.0;

/// Hysteresis factor for the nearest-target policy: the incumbent target is
/// kept unless a rival is closer by more than this fraction of its range.
pub const NEAREST_TARGET_HYSTERESIS: f64 = 0.85;

/// Maximum secondary targets assigned alongside the primary.
pub const MAX_SECONDARY_TARGETS: usize = 3;

// --- Envelope / launch window ---

/// Turret traverse tolerance when the platform is moving (degrees).
pub const TURRET_TOLERANCE_MOVING_DEG: f64 = 3.0;

/// Turret traverse tolerance when stationary on a surface (degrees).
pub const TURRET_TOLERANCE_STATIONARY_DEG: f64 = 0.0;

/// Boresight tolerance for guided shots against surfaced/landed targets (degrees).
pub const GUIDED_BORESIGHT_DEG: f64 = 360.0;

/// Reduced guided boresight tolerance against airborne targets (degrees).
pub const GUIDED_BORESIGHT_AIRBORNE_DEG: f64 = 120.0;

/// Floor on the blast-radius-derived unguided tolerance (degrees).
pub const UNGUIDED_BORESIGHT_FLOOR_DEG: f64 = 1.0;

/// Launch-zone minimum as a fraction of the declared minimum range.
pub const LAUNCH_ZONE_MIN_FACTOR: f64 = 1.0;

/// Closing geometry stretches the launch-zone maximum up to this factor.
pub const LAUNCH_ZONE_CLOSING_STRETCH: f64 = 1.3;

/// Opening geometry shrinks the launch-zone maximum down to this factor.
pub const LAUNCH_ZONE_OPENING_SHRINK: f64 = 0.6;

/// The lead extrapolation horizon never exceeds this fraction of the closing
/// time, so a closing pair is never projected past its merge point.
pub const LEAD_HORIZON_MERGE_FRACTION: f64 = 0.5;

// --- Firing sequences ---

/// Fixed settle delay after commanding a bay/rail open (seconds).
pub const BAY_SETTLE_TIME: f64 = 1.0;

/// Sensor-lock attempts before the guided sequence gives up.
pub const LOCK_RETRY_ATTEMPTS: u32 = 3;

/// Wait between sensor-lock attempts (seconds).
pub const LOCK_RETRY_INTERVAL: f64 = 0.5;

/// Turret slew convergence timeout (seconds).
pub const TURRET_SLEW_TIMEOUT: f64 = 5.0;

/// In-cone threshold for a slaved launch turret (degrees).
pub const TURRET_SLEW_CONE_DEG: f64 = 2.0;

/// Geometry still counts as plausible for a degraded unguided release when the
/// off-boresight angle is inside this cone (degrees).
pub const DEGRADED_RELEASE_CONE_DEG: f64 = 10.0;

/// Autofire burst window length (seconds).
pub const BURST_WINDOW_SECS: f64 = 2.0;

/// Post-burst cooldown (seconds).
pub const BURST_COOLDOWN_SECS: f64 = 1.0;

/// Max targets a direct-fire group will round-robin across in one pass.
pub const TURRET_MAX_TARGETS: usize = 3;

/// Interval between bomb releases in one run (seconds).
pub const BOMB_RELEASE_INTERVAL: f64 = 0.4;

/// Bomb coordinate-acquisition retry interval (seconds).
pub const BOMB_ACQUIRE_INTERVAL: f64 = 0.5;

/// Characteristic fall time used for bomb lead prediction (seconds).
pub const BOMB_FALL_TIME: f64 = 6.0;

// --- Point defense ---

/// Point-defense sub-loop cadence (seconds), independent of the scan timer.
pub const POINT_DEFENSE_INTERVAL: f64 = 0.25;

/// Maximum interceptor assignments per inbound threat.
pub const POINT_DEFENSE_MAX_PER_THREAT: usize = 2;

/// Inbound ordnance beyond this range is ignored by point defense (meters).
pub const POINT_DEFENSE_RANGE: f64 = 5_000.0;

// --- Countermeasures ---

/// Dispatch countermeasures when an inbound missile's closing time drops below
/// this threshold (seconds).
pub const CM_CLOSING_TIME_THRESHOLD: f64 = 10.0;

/// Inbound missiles beyond this range never trigger a dispatch (meters).
pub const CM_REACTION_RANGE: f64 = 2_500.0;

/// Cooldown between salvos from one dispenser (seconds).
pub const CM_DISPENSER_COOLDOWN: f64 = 1.5;

/// Rounds ejected per dispatch salvo.
pub const CM_SALVO_SIZE: u32 = 2;

// --- Misc weapon state ---

/// Heat fraction above which a direct-fire mount reports overheated.
pub const OVERHEAT_THRESHOLD: f64 = 1.0;

/// Heat accumulated per second of open autofire burst.
pub const BURST_HEAT_PER_SEC: f64 = 0.25;

/// Heat dissipated per second while not firing.
pub const HEAT_DISSIPATION_PER_SEC: f64 = 0.1;

/// Finished commitments linger this long before retirement (seconds).
pub const COMMITMENT_RETIRE_SECS: f64 = 2.0;

/// Default minimum safe distance for direct fire (meters).
pub const DIRECT_FIRE_MIN_SAFE_DISTANCE: f64 = 30.0;

/// Default time-of-flight proxy for unguided time-to-effect checks (seconds).
pub const UNGUIDED_TIME_TO_EFFECT: f64 = 2.0;

// --- Weapon-selection scoring ---

/// Score bonus for proximity-fuzed rounds against missiles.
pub const SCORE_PROXIMITY_FUZE_BONUS: f64 = 0.3;

/// Score bonus per extra projectile per shot against missiles.
pub const SCORE_MULTI_PROJECTILE_BONUS: f64 = 0.05;

/// Penalty applied when the target range sits outside the weapon's declared window.
pub const SCORE_RANGE_WINDOW_PENALTY: f64 = 0.5;

/// Penalty when a guided candidate's required sensor is unavailable.
pub const SCORE_SENSOR_UNAVAILABLE_PENALTY: f64 = 0.6;

/// Heavy penalty for air engagements when the seeker's sensor is off.
pub const SCORE_SENSOR_OFF_AIR_PENALTY: f64 = 2.0;

/// Caliber (mm) above which the size heuristic favors large targets.
pub const SCORE_LARGE_TARGET_CALIBER_MM: f64 = 60.0;

/// Target mass (tonnes) above which it counts as large for the caliber heuristic.
pub const SCORE_LARGE_TARGET_MASS_T: f64 = 10.0;

/// Bonus for submunition bombs against moving surface targets.
pub const SCORE_SUBMUNITION_BONUS: f64 = 0.4;

/// Bonus for guided over ballistic ordnance against stationary surface targets.
pub const SCORE_GUIDED_PREFERENCE_BONUS: f64 = 1.0;

// --- Target-priority weights (WeightedScore policy) ---

pub const TARGET_WEIGHT_RANGE: f64 = 1.0;
pub const TARGET_WEIGHT_GEOMETRY: f64 = 0.5;
pub const TARGET_WEIGHT_ACCELERATION: f64 = 0.3;
pub const TARGET_WEIGHT_WEAPON_COUNT: f64 = 0.5;
pub const TARGET_WEIGHT_MASS: f64 = 0.2;
pub const TARGET_WEIGHT_DAMAGE: f64 = 0.3;
pub const TARGET_WEIGHT_FRIENDLIES_ENGAGING: f64 = 0.7;
pub const TARGET_WEIGHT_THREAT: f64 = 1.0;
pub const TARGET_WEIGHT_VIP: f64 = 2.0;

/// Reference range used to normalize the range term (meters).
pub const TARGET_SCORE_REFERENCE_RANGE: f64 = 5_000.0;
