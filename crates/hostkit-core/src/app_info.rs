//! Host application metadata
//!
//! Static facts about the embedding application, supplied by the host
//! at startup and exposed read-only to every component.

use serde::{Deserialize, Serialize};

/// How the application was deployed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployType {
    #[default]
    Development,
    Test,
    Production,
}

/// Metadata describing the host application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub publisher: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub copyright: Option<String>,
    pub guid: Option<String>,
    pub deploy_type: DeployType,
    pub analytics_enabled: bool,
}

impl AppInfo {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_copyright(mut self, copyright: impl Into<String>) -> Self {
        self.copyright = Some(copyright.into());
        self
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_deploy_type(mut self, deploy_type: DeployType) -> Self {
        self.deploy_type = deploy_type;
        self
    }

    pub fn with_analytics(mut self, enabled: bool) -> Self {
        self.analytics_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let info = AppInfo::new("com.example.demo", "Demo", "1.2.0")
            .with_publisher("Example Corp")
            .with_deploy_type(DeployType::Production);

        assert_eq!(info.id, "com.example.demo");
        assert_eq!(info.publisher.as_deref(), Some("Example Corp"));
        assert_eq!(info.deploy_type, DeployType::Production);
        assert!(!info.analytics_enabled);
    }
}
