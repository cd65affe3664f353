pub const DEFAULT_PYTHON_VERSION: &str = "3.11";
pub const DEFAULT_BASE_IMAGE: &str = "python:3.11-slim";
pub const DEFAULT_IMAGE_REGISTRY: &str = "ghcr.io/repokiln";

/// Values stamped into plans, build details and image names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub python_version: String,
    pub base_image: String,
    pub image_registry: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            python_version: DEFAULT_PYTHON_VERSION.to_string(),
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            image_registry: DEFAULT_IMAGE_REGISTRY.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_python_version(mut self, python_version: impl Into<String>) -> Self {
        self.python_version = python_version.into();
        self
    }

    pub fn with_base_image(mut self, base_image: impl Into<String>) -> Self {
        self.base_image = base_image.into();
        self
    }

    pub fn with_image_registry(mut self, image_registry: impl Into<String>) -> Self {
        self.image_registry = image_registry.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.python_version, "3.11");
        assert_eq!(config.base_image, "python:3.11-slim");
        assert_eq!(config.image_registry, "ghcr.io/repokiln");
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_python_version("3.12")
            .with_base_image("python:3.12-slim")
            .with_image_registry("registry.local/images");

        assert_eq!(config.python_version, "3.12");
        assert_eq!(config.base_image, "python:3.12-slim");
        assert_eq!(config.image_registry, "registry.local/images");
    }
}
