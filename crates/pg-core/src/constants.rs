/// Number of compass locations on the grid.
pub const LOCATION_COUNT: u8 = 8;

/// Steps a shift motion (pro/anti/float) travels: one quarter of the circle.
pub const QUARTER_STEPS: u8 = 2;

/// Steps a dash travels: to the opposite location.
pub const HALF_STEPS: u8 = 4;

/// Largest turn value a motion may carry, in half-turns (3 full turns).
pub const MAX_HALF_TURNS: u8 = 6;

/// Highest difficulty level.
pub const MAX_LEVEL: u8 = 3;

/// Beat duration used when a template does not declare one.
pub const DEFAULT_DURATION: f64 = 1.0;

/// Minimum beats a sequence needs before a CAP can extend it.
pub const MIN_CAP_LENGTH: usize = 2;

/// Minimum confidence for a letter determination to count as a match.
pub const LETTER_CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Legacy spelling of the float turns sentinel.
pub const FLOAT_SENTINEL: &str = "fl";
