//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (NAV_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),

    #[error("Environment variable {0} has an invalid value {1:?}")]
    InvalidEnvValue(String, String)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "$NAV_SW_ROOT/params" directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError> 
where
    P: DeserializeOwned
{
    // Get the params dir
    let mut path = crate::host::get_nav_sw_root()
        .map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    load_path(path)
}

/// Load a parameter file from an explicit path
pub fn load_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>
{
    // Load the file into a string
    let params_str = read_to_string(path)
        .map_err(LoadError::FileLoadError)?;

    from_toml_str(&params_str)
}

/// Parse parameters from a TOML string
pub fn from_toml_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

/// Read a parameter override from the environment.
///
/// Returns `Ok(None)` if the variable is not set, and an error if it is set
/// but cannot be parsed.
pub fn env_override<T>(var_name: &str) -> Result<Option<T>, LoadError>
where
    T: FromStr
{
    match std::env::var(var_name) {
        Ok(value) => match value.trim().parse() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(LoadError::InvalidEnvValue(var_name.to_string(), value))
        },
        Err(_) => Ok(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestParams {
        threshold_m: f64,
        #[serde(default)]
        window: usize,
    }

    #[test]
    fn test_from_toml_str() {
        let p: TestParams = from_toml_str("threshold_m = 30.0\nwindow = 5").unwrap();
        assert_eq!(p, TestParams { threshold_m: 30.0, window: 5 });

        let p: TestParams = from_toml_str("threshold_m = 12.5").unwrap();
        assert_eq!(p.window, 0);

        assert!(matches!(
            from_toml_str::<TestParams>("threshold_m = \"far\""),
            Err(LoadError::DeserialiseError(_))
        ));
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("UTIL_PARAMS_TEST_GOOD", " 42.5 ");
        std::env::set_var("UTIL_PARAMS_TEST_BAD", "forty");

        assert_eq!(env_override::<f64>("UTIL_PARAMS_TEST_GOOD").unwrap(), Some(42.5));
        assert_eq!(env_override::<f64>("UTIL_PARAMS_TEST_UNSET").unwrap(), None);
        assert!(matches!(
            env_override::<f64>("UTIL_PARAMS_TEST_BAD"),
            Err(LoadError::InvalidEnvValue(_, _))
        ));
    }
}
