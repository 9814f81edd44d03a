// ==========================================
// 供应商 OTIF 监控 - 时间窗口筛选
// ==========================================
// 职责:
// - 按预计到货日闭区间筛选（返回新集合，不修改输入）
// - 快捷时间段（相对今天，并收敛到数据的日期范围内）
// - 与上一个自然月窗口对比
// ==========================================

use crate::domain::metrics::PeriodComparison;
use crate::domain::order::ClassifiedLine;
use crate::domain::types::{DateRange, Trend};
use crate::engine::aggregator::{percentage, round2};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 快捷时间段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodPreset {
    CurrentMonth,
    LastMonth,   // 今天 - 30 天
    Last3Months, // 今天 - 90 天
    Last6Months, // 今天 - 180 天
    CurrentYear,
    WholePeriod,
    Custom { from: NaiveDate, to: NaiveDate },
}

impl PeriodPreset {
    /// 解析为具体日期窗口
    ///
    /// # 参数
    /// - today: 当前日期
    /// - bounds: 数据中预计到货日的最小/最大值
    ///
    /// 起点不早于数据最小日期，终点不晚于数据最大日期
    pub fn resolve(&self, today: NaiveDate, bounds: DateRange) -> DateRange {
        let (from, to) = match *self {
            PeriodPreset::CurrentMonth => (first_day_of_month(today), today),
            PeriodPreset::LastMonth => (today - Duration::days(30), today),
            PeriodPreset::Last3Months => (today - Duration::days(90), today),
            PeriodPreset::Last6Months => (today - Duration::days(180), today),
            PeriodPreset::CurrentYear => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                today,
            ),
            PeriodPreset::WholePeriod => (bounds.from, bounds.to),
            PeriodPreset::Custom { from, to } => (from, to),
        };

        DateRange::new(from.max(bounds.from), to.min(bounds.to))
    }
}

impl FromStr for PeriodPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current-month" | "current_month" => Ok(PeriodPreset::CurrentMonth),
            "last-month" | "last_month" => Ok(PeriodPreset::LastMonth),
            "last-3-months" | "last_3_months" => Ok(PeriodPreset::Last3Months),
            "last-6-months" | "last_6_months" => Ok(PeriodPreset::Last6Months),
            "current-year" | "current_year" => Ok(PeriodPreset::CurrentYear),
            "all" | "whole-period" | "whole_period" => Ok(PeriodPreset::WholePeriod),
            other => Err(format!("未知时间段: {}", other)),
        }
    }
}

impl fmt::Display for PeriodPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodPreset::CurrentMonth => write!(f, "current-month"),
            PeriodPreset::LastMonth => write!(f, "last-month"),
            PeriodPreset::Last3Months => write!(f, "last-3-months"),
            PeriodPreset::Last6Months => write!(f, "last-6-months"),
            PeriodPreset::CurrentYear => write!(f, "current-year"),
            PeriodPreset::WholePeriod => write!(f, "all"),
            PeriodPreset::Custom { from, to } => write!(f, "{}..{}", from, to),
        }
    }
}

// ==========================================
// 窗口工具
// ==========================================

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// 数据中预计到货日的范围（空集合返回 None）
pub fn data_bounds(lines: &[ClassifiedLine]) -> Option<DateRange> {
    let min = lines.iter().map(|l| l.order.expected_date).min()?;
    let max = lines.iter().map(|l| l.order.expected_date).max()?;
    Some(DateRange::new(min, max))
}

/// 按预计到货日闭区间筛选
pub fn filter_by_expected_date(lines: &[ClassifiedLine], range: DateRange) -> Vec<ClassifiedLine> {
    lines
        .iter()
        .filter(|l| range.contains(l.order.expected_date))
        .cloned()
        .collect()
}

/// 上月对比窗口: [ (from - 1 天) 所在月的 1 号, from - 1 天 ]
pub fn previous_month_window(from: NaiveDate) -> DateRange {
    let prev_end = from - Duration::days(1);
    DateRange::new(first_day_of_month(prev_end), prev_end)
}

/// 与上月对比
///
/// 上月窗口没有订单行时返回 None
pub fn compare_with_previous_month(
    all: &[ClassifiedLine],
    from: NaiveDate,
    current: &[ClassifiedLine],
) -> Option<PeriodComparison> {
    let window = previous_month_window(from);
    let previous: Vec<&ClassifiedLine> = all
        .iter()
        .filter(|l| window.contains(l.order.expected_date))
        .collect();

    if previous.is_empty() {
        return None;
    }

    let previous_otif = previous.iter().filter(|l| l.is_otif).count();
    let previous_otif_pct = percentage(previous_otif as f64, previous.len() as f64);

    let current_otif = current.iter().filter(|l| l.is_otif).count();
    let current_otif_pct = percentage(current_otif as f64, current.len() as f64);

    let delta = round2(current_otif_pct - previous_otif_pct);

    Some(PeriodComparison {
        previous_otif_pct,
        previous_lines: previous.len(),
        current_otif_pct,
        delta,
        trend: Trend::from_delta(delta),
    })
}
