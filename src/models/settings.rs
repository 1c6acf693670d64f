use serde::{Deserialize, Serialize};

/// 推送设置（serverchan_key 已由后端脱敏）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifySettings {
    #[serde(default)]
    pub serverchan_key: Option<String>,
    #[serde(default)]
    pub serverchan_configured: bool,
    #[serde(default = "default_push_time")]
    pub push_time: Option<String>,
}

fn default_push_time() -> Option<String> { Some("15:30".to_string()) }

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            serverchan_key: None,
            serverchan_configured: false,
            push_time: default_push_time(),
        }
    }
}

/// 只提交需要修改的字段
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverchan_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_time: Option<String>,
}

impl UpdateSettingsRequest {
    pub fn is_empty(&self) -> bool {
        self.serverchan_key.is_none() && self.push_time.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestNotifyResult {
    pub success: bool,
    pub message: String,
}
