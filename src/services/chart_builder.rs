use crate::models::chart::*;
use crate::models::stock::{KlineDataPoint, LineStrength, SupportResistanceLine};

const PRICE_GRID: GridRect = GridRect { left: 8.0, right: 8.0, top: 6.0, height: 58.0 };
const VOLUME_GRID: GridRect = GridRect { left: 8.0, right: 8.0, top: 72.0, height: 18.0 };

const STRONG_WIDTH: f32 = 2.0;
const NORMAL_WIDTH: f32 = 1.0;

/// K线 + 支撑/压力线 -> 双面板图表描述（默认配色）
pub fn build_chart_spec(
    klines: &[KlineDataPoint],
    support_lines: &[SupportResistanceLine],
    resistance_lines: &[SupportResistanceLine],
) -> ChartSpec {
    build_chart_spec_with_theme(klines, support_lines, resistance_lines, &ChartTheme::default())
}

/// 纯函数：相同输入必得相同输出
pub fn build_chart_spec_with_theme(
    klines: &[KlineDataPoint],
    support_lines: &[SupportResistanceLine],
    resistance_lines: &[SupportResistanceLine],
    theme: &ChartTheme,
) -> ChartSpec {
    if klines.is_empty() {
        return ChartSpec::default();
    }

    // 日期顺序即输入顺序，不重新排序
    let categories = klines.iter().map(|k| k.date.clone()).collect();

    let candles = klines
        .iter()
        .map(|k| [k.open, k.close, k.low, k.high])
        .collect();

    let bars = klines
        .iter()
        .map(|k| VolumeBar {
            value: k.volume,
            color: if k.is_up() { theme.up_color.clone() } else { theme.down_color.clone() },
        })
        .collect();

    let overlay = if support_lines.is_empty() && resistance_lines.is_empty() {
        None
    } else {
        let lines = support_lines
            .iter()
            .map(|l| price_line(l, LineRole::Support, theme))
            .chain(resistance_lines.iter().map(|l| price_line(l, LineRole::Resistance, theme)))
            .collect();
        Some(lines)
    };

    ChartSpec {
        categories,
        price: Some(PricePanel {
            grid: PRICE_GRID,
            candles,
            up_color: theme.up_color.clone(),
            down_color: theme.down_color.clone(),
            overlay,
        }),
        volume: Some(VolumePanel { grid: VOLUME_GRID, bars }),
    }
}

fn price_line(line: &SupportResistanceLine, role: LineRole, theme: &ChartTheme) -> PriceLine {
    let (palette, position) = match role {
        LineRole::Support => (&theme.support, LabelPosition::AboveRight),
        LineRole::Resistance => (&theme.resistance, LabelPosition::BelowRight),
    };

    let (kind, width, color) = match line.strength {
        LineStrength::Strong => (StrokeKind::Solid, STRONG_WIDTH, &palette.strong),
        LineStrength::Medium | LineStrength::Weak => (StrokeKind::Dashed, NORMAL_WIDTH, &palette.normal),
    };

    PriceLine {
        role,
        price: line.price,
        stroke: Stroke { kind, width, color: color.clone() },
        label: LineLabel {
            text: format!("{}{:.2}", line.name, line.price),
            position,
            color: color.clone(),
        },
    }
}
