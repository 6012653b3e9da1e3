//! Parameters structure for NavCtrl

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use util::{params, time::seconds_to_duration};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Parameters for navigation control.
///
/// Every field has a default, so parameter files only need to contain the values which differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavParams {
    // ---- STEPS ----
    /// Distance from a step's trigger point at which the step is reached.
    ///
    /// Units: meters
    pub proximity_threshold_m: f64,

    /// Distance from the next step's trigger point inside which the user is warned of the turn.
    ///
    /// Units: meters
    pub turn_warning_distance_m: f64,

    // ---- OFF ROUTE ----
    /// Distance from the route beyond which the user is off the route.
    ///
    /// Units: meters
    pub off_route_threshold_m: f64,

    /// Minimum time between reroute requests.
    ///
    /// Units: seconds
    pub reroute_cooldown_s: f64,

    // ---- SMOOTHING & ETA ----
    /// Number of fixes in the moving average
    pub smoothing_window: usize,

    /// Speed used for the ETA when the fix has no speed.
    ///
    /// Units: meters/second
    pub fallback_speed_ms: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("{0} must be positive, found {1}")]
    NonPositiveThreshold(&'static str, f64),

    #[error(
        "The turn warning distance ({warning_m} m) must be greater than the proximity threshold \
        ({proximity_m} m)"
    )]
    WarningInsideProximity { warning_m: f64, proximity_m: f64 },

    #[error("The reroute cooldown must not be negative, found {0} s")]
    NegativeCooldown(f64),

    #[error("The smoothing window must contain at least one fix")]
    ZeroSmoothingWindow,

    #[error("The fallback speed must be positive, found {0} m/s")]
    NonPositiveFallbackSpeed(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavParams {
    fn default() -> Self {
        Self {
            proximity_threshold_m: 30.0,
            turn_warning_distance_m: 100.0,
            off_route_threshold_m: 50.0,
            reroute_cooldown_s: 30.0,
            smoothing_window: 5,
            fallback_speed_ms: 1.4,
        }
    }
}

impl NavParams {
    /// Load the parameters from a file relative to the params directory, then apply any
    /// environment overrides.
    pub fn load(param_file_path: &str) -> Result<Self, params::LoadError> {
        params::load::<Self>(param_file_path)?.with_env_overrides()
    }

    /// Replace any parameters which are set in the environment.
    pub fn with_env_overrides(mut self) -> Result<Self, params::LoadError> {
        if let Some(v) = params::env_override("PROXIMITY_THRESHOLD")? {
            self.proximity_threshold_m = v;
        }
        if let Some(v) = params::env_override("TURN_WARNING_DISTANCE")? {
            self.turn_warning_distance_m = v;
        }
        if let Some(v) = params::env_override("OFF_ROUTE_THRESHOLD")? {
            self.off_route_threshold_m = v;
        }
        if let Some(v) = params::env_override("REROUTE_COOLDOWN")? {
            self.reroute_cooldown_s = v;
        }
        if let Some(v) = params::env_override("SMOOTHING_WINDOW")? {
            self.smoothing_window = v;
        }
        if let Some(v) = params::env_override("FALLBACK_WALKING_SPEED")? {
            self.fallback_speed_ms = v;
        }

        Ok(self)
    }

    /// Check the parameters are consistent.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for (name, value) in &[
            ("proximity_threshold_m", self.proximity_threshold_m),
            ("turn_warning_distance_m", self.turn_warning_distance_m),
            ("off_route_threshold_m", self.off_route_threshold_m),
        ] {
            if value.is_nan() || *value <= 0.0 {
                return Err(ParamsError::NonPositiveThreshold(*name, *value));
            }
        }

        if self.turn_warning_distance_m <= self.proximity_threshold_m {
            return Err(ParamsError::WarningInsideProximity {
                warning_m: self.turn_warning_distance_m,
                proximity_m: self.proximity_threshold_m,
            });
        }

        if self.reroute_cooldown_s.is_nan() || self.reroute_cooldown_s < 0.0 {
            return Err(ParamsError::NegativeCooldown(self.reroute_cooldown_s));
        }

        if self.smoothing_window == 0 {
            return Err(ParamsError::ZeroSmoothingWindow);
        }

        if !self.fallback_speed_ms.is_finite() || self.fallback_speed_ms <= 0.0 {
            return Err(ParamsError::NonPositiveFallbackSpeed(self.fallback_speed_ms));
        }

        Ok(())
    }

    /// The reroute cooldown as a duration
    pub fn reroute_cooldown(&self) -> Duration {
        seconds_to_duration(self.reroute_cooldown_s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let p = NavParams::default();
        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.reroute_cooldown(), Duration::seconds(30));
    }

    #[test]
    fn test_partial_toml() {
        let p: NavParams = params::from_toml_str(
            "proximity_threshold_m = 20.0\nsmoothing_window = 3\n",
        )
        .unwrap();

        assert_eq!(p.proximity_threshold_m, 20.0);
        assert_eq!(p.smoothing_window, 3);
        assert_eq!(p.turn_warning_distance_m, 100.0);
        assert_eq!(p.fallback_speed_ms, 1.4);
    }

    #[test]
    fn test_validation() {
        let mut p = NavParams::default();
        p.off_route_threshold_m = 0.0;
        assert_eq!(
            p.validate(),
            Err(ParamsError::NonPositiveThreshold("off_route_threshold_m", 0.0))
        );

        let mut p = NavParams::default();
        p.turn_warning_distance_m = 30.0;
        assert!(matches!(
            p.validate(),
            Err(ParamsError::WarningInsideProximity { .. })
        ));

        let mut p = NavParams::default();
        p.smoothing_window = 0;
        assert_eq!(p.validate(), Err(ParamsError::ZeroSmoothingWindow));

        let mut p = NavParams::default();
        p.fallback_speed_ms = -1.0;
        assert_eq!(p.validate(), Err(ParamsError::NonPositiveFallbackSpeed(-1.0)));

        let mut p = NavParams::default();
        p.reroute_cooldown_s = -5.0;
        assert_eq!(p.validate(), Err(ParamsError::NegativeCooldown(-5.0)));
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("TURN_WARNING_DISTANCE", "150");
        let p = NavParams::default().with_env_overrides().unwrap();
        assert_eq!(p.turn_warning_distance_m, 150.0);

        std::env::set_var("TURN_WARNING_DISTANCE", "far");
        assert!(matches!(
            NavParams::default().with_env_overrides(),
            Err(params::LoadError::InvalidEnvValue(_, _))
        ));

        std::env::remove_var("TURN_WARNING_DISTANCE");
    }
}
