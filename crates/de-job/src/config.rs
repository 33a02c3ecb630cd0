//! Job runner configuration
//!
//! Loaded from a RON file. Every field has a default, so an empty file (or
//! no file at all) gives the CSG kernel, the sheet renderer on A4 landscape
//! and the lenient projector policies.

use std::path::Path;

use de_cad::{CadKernel, CsgConfig, CsgKernel, NullKernel};
use de_draw::{DrawingRenderer, NullRenderer, ProjectorConfig, SheetConfig, SheetRenderer};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default `tracing` filter when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "de_job=info,de_cad=info,de_draw=info";

/// Which solid-modeling backend to build with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KernelChoice {
    #[default]
    Csg,
    Truck,
    Null,
}

/// Which renderer to draw with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RendererChoice {
    #[default]
    Sheet,
    Null,
}

/// Job runner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    pub kernel: KernelChoice,
    pub renderer: RendererChoice,
    pub csg: CsgConfig,
    pub sheet: SheetConfig,
    pub projector: ProjectorConfig,
    /// Overrides [`DEFAULT_LOG_FILTER`]; `RUST_LOG` still wins
    pub log_filter: Option<String>,
}

impl JobConfig {
    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save the configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_ron()?).map_err(|e| ConfigError::Io(e.to_string()))
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Instantiate the configured kernel
    pub fn make_kernel(&self) -> Result<Box<dyn CadKernel>, ConfigError> {
        match self.kernel {
            KernelChoice::Csg => Ok(Box::new(CsgKernel::new(self.csg.clone()))),
            KernelChoice::Null => Ok(Box::new(NullKernel)),
            #[cfg(feature = "truck")]
            KernelChoice::Truck => Ok(Box::new(de_cad::TruckKernel::new())),
            #[cfg(not(feature = "truck"))]
            KernelChoice::Truck => Err(ConfigError::KernelUnavailable("truck".into())),
        }
    }

    /// Instantiate the configured renderer
    pub fn make_renderer(&self) -> Box<dyn DrawingRenderer> {
        match self.renderer {
            RendererChoice::Sheet => Box::new(SheetRenderer::new(self.sheet.clone())),
            RendererChoice::Null => Box::new(NullRenderer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use de_draw::DuplicateViewPolicy;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = JobConfig::from_ron("()").unwrap();
        assert_eq!(config, JobConfig::default());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.make_kernel().unwrap().name(), "csg");
    }

    #[test]
    fn test_partial_config() {
        let config = JobConfig::from_ron(
            r#"(
                kernel: Null,
                sheet: (columns: 3),
                projector: (duplicate_views: Reject),
                log_filter: Some("debug"),
            )"#,
        )
        .unwrap();

        assert_eq!(config.kernel, KernelChoice::Null);
        assert_eq!(config.sheet.columns, 3);
        assert_eq!(config.sheet.width_mm, 297.0);
        assert_eq!(config.projector.duplicate_views, DuplicateViewPolicy::Reject);
        assert_eq!(config.log_filter(), "debug");
        assert!(!config.make_kernel().unwrap().is_available());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.ron");
        let config = JobConfig {
            renderer: RendererChoice::Null,
            sheet: SheetConfig::a3_landscape(),
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(JobConfig::load(&path).unwrap(), config);
    }

    #[cfg(not(feature = "truck"))]
    #[test]
    fn test_truck_requires_feature() {
        let config = JobConfig {
            kernel: KernelChoice::Truck,
            ..Default::default()
        };
        assert!(matches!(
            config.make_kernel(),
            Err(ConfigError::KernelUnavailable(_))
        ));
    }
}
