use crate::config::{ConfigService, DEBUG_KEY};
use crate::error::Result;

/// Runtime flags of the host application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Kernel {
    debug: bool,
}

impl Kernel {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    /// Reads `RESTVIEW_DEBUG`; absent means production mode.
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        Ok(Self::new(config.get_bool(DEBUG_KEY)?.unwrap_or(false)))
    }

    /// Whether verbose error details may be disclosed.
    pub fn is_debug(&self) -> bool {
        self.debug
    }
}
