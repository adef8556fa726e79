//! Configuration system.
//!
//! Sources, lowest priority first:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/taskapi/config.yaml`
//! 3. **User** - `~/.taskapi/config.yaml`
//! 4. **Environment** - `TASKAPI_DB_PATH`, `TASKAPI_HOST`, `TASKAPI_PORT`
//!
//! `TASKAPI_CONFIG_PATH` names a single file that replaces tiers 1-3.
//! `TASKAPI_PROJECT_DIR` and `TASKAPI_USER_DIR` relocate the tier directories.

mod loader;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, overlay};
pub use types::*;
