use serde::{Deserialize, Serialize};

/// 自选ETF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfWatchlistItem {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// 热门ETF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularEtf {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: String,  // 宽基/行业
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfSearchResult {
    pub code: String,
    pub name: String,
}
