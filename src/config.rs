//! Init-time configuration
//!
//! Frame constants that a host may want to tune once at startup. None of
//! these are runtime-tunable; both kernels capture their values when the
//! compactor/culler is constructed.

use serde::Deserialize;

use crate::constants::{vpl, vsm};
use crate::error::{CullError, CullResult};

/// Configuration for the VPL visibility compactor
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VplConfig {
    /// Visibility flag scratch capacity (maximum candidate count)
    pub max_vpls_before_culling: usize,
    /// Compacted output cap per frame
    pub max_vpls_per_frame: usize,
    /// Workers participating in the compaction phase
    pub compaction_crew_size: usize,
    /// Worker team size for the compaction dispatch
    pub team_size: usize,
}

impl Default for VplConfig {
    fn default() -> Self {
        Self {
            max_vpls_before_culling: vpl::MAX_TOTAL_VPLS_BEFORE_CULLING,
            max_vpls_per_frame: vpl::MAX_TOTAL_VPLS_PER_FRAME,
            compaction_crew_size: vpl::COMPACTION_CREW_SIZE,
            team_size: vpl::TEAM_SIZE,
        }
    }
}

/// Configuration for the VSM draw culler
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VsmConfig {
    /// Stride between cascades in the output command array
    pub max_draw_commands: usize,
    /// Number of shadow cascades
    pub num_cascades: usize,
    /// Worker team size for the culling dispatch
    pub team_size: usize,
}

impl Default for VsmConfig {
    fn default() -> Self {
        Self {
            max_draw_commands: 4096,
            num_cascades: 4,
            team_size: vsm::TEAM_SIZE,
        }
    }
}

/// Top-level kernel configuration, loadable from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CullConfig {
    pub vpl: VplConfig,
    pub vsm: VsmConfig,
}

impl CullConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> CullResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the kernels cannot run with
    pub fn validate(&self) -> CullResult<()> {
        if self.vpl.max_vpls_per_frame == 0 {
            return Err(CullError::InvalidConfig(
                "vpl.max_vpls_per_frame must be at least 1".into(),
            ));
        }
        if self.vpl.max_vpls_before_culling < self.vpl.max_vpls_per_frame {
            return Err(CullError::InvalidConfig(format!(
                "vpl.max_vpls_before_culling ({}) is below vpl.max_vpls_per_frame ({})",
                self.vpl.max_vpls_before_culling, self.vpl.max_vpls_per_frame
            )));
        }
        if self.vpl.compaction_crew_size == 0 {
            return Err(CullError::InvalidConfig(
                "vpl.compaction_crew_size must be at least 1".into(),
            ));
        }
        if self.vpl.team_size == 0 || self.vsm.team_size == 0 {
            return Err(CullError::InvalidConfig(
                "team sizes must be at least 1".into(),
            ));
        }
        if self.vsm.max_draw_commands == 0 {
            return Err(CullError::InvalidConfig(
                "vsm.max_draw_commands must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        CullConfig::default()
            .validate()
            .expect("default config must validate");
    }

    #[test]
    fn parses_partial_toml() {
        let config = CullConfig::from_toml_str(
            r#"
            [vpl]
            max_vpls_per_frame = 512

            [vsm]
            num_cascades = 2
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.vpl.max_vpls_per_frame, 512);
        assert_eq!(config.vpl.compaction_crew_size, 8);
        assert_eq!(config.vsm.num_cascades, 2);
    }

    #[test]
    fn rejects_zero_cap() {
        let result = CullConfig::from_toml_str("[vpl]\nmax_vpls_per_frame = 0\n");
        assert!(matches!(result, Err(CullError::InvalidConfig(_))));
    }
}
