use serde::Serialize;

/// 单根K线：[开, 收, 低, 高]（与渲染端 candlestick 数据顺序一致）
pub type Ohlc = [f64; 4];

/// 渲染就绪的图表描述：价格面板 + 成交量面板，共用日期类目轴
/// 无K线时两个面板都为 None
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartSpec {
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PricePanel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumePanel>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.panel_count() == 0
    }

    pub fn panel_count(&self) -> usize {
        self.price.is_some() as usize + self.volume.is_some() as usize
    }
}

/// 面板在画布中的位置（百分比）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePanel {
    pub grid: GridRect,
    pub candles: Vec<Ohlc>,
    pub up_color: String,
    pub down_color: String,
    /// 支撑/压力线；两类线都为空时省略（而非空列表）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Vec<PriceLine>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumePanel {
    pub grid: GridRect,
    pub bars: Vec<VolumeBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeBar {
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineRole {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    #[serde(rename = "type")]
    pub kind: StrokeKind,
    pub width: f32,
    pub color: String,
}

/// 标签锚点：线的右端上方/下方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LabelPosition {
    #[serde(rename = "insideEndTop")]
    AboveRight,
    #[serde(rename = "insideEndBottom")]
    BelowRight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineLabel {
    pub text: String,
    pub position: LabelPosition,
    pub color: String,
}

/// 水平价位标线
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceLine {
    pub role: LineRole,
    pub price: f64,
    pub stroke: Stroke,
    pub label: LineLabel,
}

/// 一类标线的配色：强线一种颜色，中/弱线一种颜色
#[derive(Debug, Clone, PartialEq)]
pub struct LinePalette {
    pub strong: String,
    pub normal: String,
}

/// 图表配色，默认按 A 股习惯红涨绿跌
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTheme {
    pub up_color: String,
    pub down_color: String,
    pub support: LinePalette,
    pub resistance: LinePalette,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            up_color: "#ef5350".to_string(),
            down_color: "#26a69a".to_string(),
            support: LinePalette {
                strong: "#16a34a".to_string(),
                normal: "#4ade80".to_string(),
            },
            resistance: LinePalette {
                strong: "#dc2626".to_string(),
                normal: "#f97316".to_string(),
            },
        }
    }
}
