//! Settings service: typed configuration values scoped to an owner node.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingType {
    Boolean,
    SingleSelect,
    MultiSelect,
    StringList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingConfig {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub setting_type: SettingType,
    /// Allowed items for select settings; empty for the other types.
    #[serde(default)]
    pub allowed_items: Vec<SettingItem>,
    #[serde(default)]
    pub allows_free_text: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingValue {
    Boolean {
        set: bool,
    },
    SingleSelect {
        item_id: String,
        #[serde(default)]
        free_text: Option<String>,
    },
    MultiSelect {
        item_ids: Vec<String>,
        #[serde(default)]
        free_texts: Vec<String>,
    },
    StringList {
        values: Vec<String>,
    },
}

impl SettingValue {
    #[must_use]
    pub fn setting_type(&self) -> SettingType {
        match self {
            Self::Boolean { .. } => SettingType::Boolean,
            Self::SingleSelect { .. } => SettingType::SingleSelect,
            Self::MultiSelect { .. } => SettingType::MultiSelect,
            Self::StringList { .. } => SettingType::StringList,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    #[serde(default)]
    pub subkey: Option<String>,
    pub value: SettingValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetValuesRequest {
    pub node_id: String,
    pub keys: Vec<SettingKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingKey {
    pub key: String,
    #[serde(default)]
    pub subkey: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetValueRequest {
    pub node_id: String,
    pub setting: Setting,
}

#[async_trait]
pub trait SettingsService: Send + Sync {
    async fn configs(&self, keys: &[String]) -> UpstreamResult<Vec<SettingConfig>>;
    async fn values(&self, req: GetValuesRequest) -> UpstreamResult<Vec<Setting>>;
    async fn set_value(&self, req: SetValueRequest) -> UpstreamResult<()>;
}

pub struct NoopSettingsService;

#[async_trait]
impl SettingsService for NoopSettingsService {
    async fn configs(&self, _keys: &[String]) -> UpstreamResult<Vec<SettingConfig>> {
        Ok(Vec::new())
    }

    async fn values(&self, _req: GetValuesRequest) -> UpstreamResult<Vec<Setting>> {
        Ok(Vec::new())
    }

    async fn set_value(&self, req: SetValueRequest) -> UpstreamResult<()> {
        Err(UpstreamError::not_found(req.setting.key))
    }
}
