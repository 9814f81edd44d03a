// ==========================================
// 供应商 OTIF 监控 - 领域类型定义
// ==========================================
// 交付状态 / 报告评级 / 趋势 / 日期窗口
// ==========================================

use crate::i18n;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 交付状态 (OTIF Status)
// ==========================================
// 每条订单行恰好落入一种状态
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtifStatus {
    OnTimeInFull,        // 准时足量
    GraceException,      // 宽限期内迟到（仍计合规）
    Late,                // 迟到
    Early,               // 提前到货
    NotDelivered,        // 未交付（含部分交付）
    PendingDateComplete, // 数量已清但无实收日期
}

impl OtifStatus {
    /// 全部状态（报表分组固定顺序）
    pub const ALL: [OtifStatus; 6] = [
        OtifStatus::OnTimeInFull,
        OtifStatus::GraceException,
        OtifStatus::Late,
        OtifStatus::Early,
        OtifStatus::NotDelivered,
        OtifStatus::PendingDateComplete,
    ];

    /// 是否计入 OTIF 合规
    pub fn is_otif(self) -> bool {
        matches!(self, OtifStatus::OnTimeInFull | OtifStatus::GraceException)
    }

    /// 是否属于“迟到”口径（报告中的 atrasados：宽限迟到 + 超期迟到）
    pub fn is_late(self) -> bool {
        matches!(self, OtifStatus::Late | OtifStatus::GraceException)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OtifStatus::OnTimeInFull => "ON_TIME_IN_FULL",
            OtifStatus::GraceException => "GRACE_EXCEPTION",
            OtifStatus::Late => "LATE",
            OtifStatus::Early => "EARLY",
            OtifStatus::NotDelivered => "NOT_DELIVERED",
            OtifStatus::PendingDateComplete => "PENDING_DATE_COMPLETE",
        }
    }

    fn i18n_key(self) -> &'static str {
        match self {
            OtifStatus::OnTimeInFull => "status.on_time_in_full",
            OtifStatus::GraceException => "status.grace_exception",
            OtifStatus::Late => "status.late",
            OtifStatus::Early => "status.early",
            OtifStatus::NotDelivered => "status.not_delivered",
            OtifStatus::PendingDateComplete => "status.pending_date_complete",
        }
    }

    /// 当前语言下的展示标签
    pub fn label(self) -> String {
        i18n::t(self.i18n_key())
    }
}

impl fmt::Display for OtifStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 报告评级 (Report Grade)
// ==========================================
// 阈值: ≥85 优秀 / ≥70 良好 / ≥50 待改进 / 其余 严重
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportGrade {
    Critical,
    NeedsImprovement,
    Good,
    Excellent,
}

impl ReportGrade {
    pub fn from_otif_pct(otif_pct: f64) -> Self {
        if otif_pct >= 85.0 {
            ReportGrade::Excellent
        } else if otif_pct >= 70.0 {
            ReportGrade::Good
        } else if otif_pct >= 50.0 {
            ReportGrade::NeedsImprovement
        } else {
            ReportGrade::Critical
        }
    }

    /// 报告主色
    pub fn color(self) -> &'static str {
        match self {
            ReportGrade::Excellent => "#5B7C8D",
            ReportGrade::Good => "#8B9AA5",
            ReportGrade::NeedsImprovement => "#D4C5B9",
            ReportGrade::Critical => "#8B7355",
        }
    }

    pub fn label(self) -> String {
        let key = match self {
            ReportGrade::Excellent => "grade.excellent",
            ReportGrade::Good => "grade.good",
            ReportGrade::NeedsImprovement => "grade.needs_improvement",
            ReportGrade::Critical => "grade.critical",
        };
        i18n::t(key)
    }
}

// ==========================================
// 趋势 (Trend)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Trend::Up
        } else if delta < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
            Trend::Flat => write!(f, "FLAT"),
        }
    }
}

// ==========================================
// 日期窗口 (闭区间，按预计到货日过滤)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.from.format("%d/%m/%Y"),
            self.to.format("%d/%m/%Y")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_on_time_and_grace_are_compliant() {
        let compliant: Vec<_> = OtifStatus::ALL.iter().filter(|s| s.is_otif()).collect();
        assert_eq!(
            compliant,
            vec![&OtifStatus::OnTimeInFull, &OtifStatus::GraceException]
        );
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(ReportGrade::from_otif_pct(85.0), ReportGrade::Excellent);
        assert_eq!(ReportGrade::from_otif_pct(84.99), ReportGrade::Good);
        assert_eq!(ReportGrade::from_otif_pct(70.0), ReportGrade::Good);
        assert_eq!(ReportGrade::from_otif_pct(50.0), ReportGrade::NeedsImprovement);
        assert_eq!(ReportGrade::from_otif_pct(49.9), ReportGrade::Critical);
    }

    #[test]
    fn test_status_serializes_screaming_snake() {
        let json = serde_json::to_string(&OtifStatus::PendingDateComplete).unwrap();
        assert_eq!(json, "\"PENDING_DATE_COMPLETE\"");
        assert_eq!(OtifStatus::GraceException.to_string(), "GRACE_EXCEPTION");
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    }
}
