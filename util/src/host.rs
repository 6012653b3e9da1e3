//! Host platform utility functions

use std::env;
use std::path::PathBuf;

/// Name of the environment variable pointing at the root of the navigation software, under
/// which the `params` and `sessions` directories live.
pub const NAV_SW_ROOT_VAR: &str = "NAV_SW_ROOT";

/// Retrieve the software root directory from the environment.
pub fn get_nav_sw_root() -> Result<PathBuf, env::VarError> {
    env::var(NAV_SW_ROOT_VAR).map(PathBuf::from)
}
