// ==========================================
// 供应商 OTIF 监控 - 交付状态分类引擎
// ==========================================
// 红线: 规则按固定顺序评估，首条命中即返回，所有结果必须输出 reason
// ==========================================
// 输入: OrderLine 列表 + 供应商目录快照
// 输出: ClassifiedLine 列表（与输入 1:1，保持顺序）
// ==========================================

use crate::domain::order::{ClassifiedLine, OrderLine, SupplierCode};
use crate::domain::supplier::placeholder_name;
use crate::domain::types::OtifStatus;
use crate::repository::error::RepositoryError;
use crate::repository::supplier_directory::SupplierDirectory;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 默认宽限天数
pub const DEFAULT_GRACE_DAYS: i64 = 2;

// ==========================================
// 错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("未交数量越界 (行 {row}, 单号 {document_no}): pending={pending} 不在 [0, {total}] 内")]
    InvalidQuantity {
        row: usize,
        document_no: String,
        pending: f64,
        total: f64,
    },

    #[error("宽限天数不能为负: {0}")]
    InvalidGraceDays(i64),

    #[error("供应商目录查询失败: {0}")]
    Directory(#[from] RepositoryError),
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;

// ==========================================
// 规则表
// ==========================================

/// 规则评估所需的事实
#[derive(Debug, Clone, Copy)]
struct DeliveryFacts {
    has_actual: bool,
    pending: f64,
    day_diff: i64,
}

impl DeliveryFacts {
    fn of(line: &OrderLine) -> Self {
        Self {
            has_actual: line.actual_date.is_some(),
            pending: line.pending_qty,
            day_diff: line.day_diff(),
        }
    }

    fn fully_received(&self) -> bool {
        self.pending == 0.0
    }
}

struct StatusRule {
    id: &'static str,
    reason: &'static str,
    status: OtifStatus,
    applies: fn(&DeliveryFacts, i64) -> bool,
}

// 顺序即优先级
static RULES: [StatusRule; 7] = [
    StatusRule {
        id: "R1",
        reason: "no actual date, nothing pending",
        status: OtifStatus::PendingDateComplete,
        applies: |f, _| !f.has_actual && f.fully_received(),
    },
    StatusRule {
        id: "R2",
        reason: "no actual date, quantity pending",
        status: OtifStatus::NotDelivered,
        applies: |f, _| !f.has_actual && f.pending > 0.0,
    },
    StatusRule {
        id: "R3",
        reason: "received with quantity pending",
        status: OtifStatus::NotDelivered,
        applies: |f, _| f.has_actual && f.pending > 0.0,
    },
    StatusRule {
        id: "R4",
        reason: "received in full on the expected date",
        status: OtifStatus::OnTimeInFull,
        applies: |f, _| f.has_actual && f.fully_received() && f.day_diff == 0,
    },
    StatusRule {
        id: "R5",
        reason: "received in full within the grace window",
        status: OtifStatus::GraceException,
        applies: |f, grace| {
            f.has_actual && f.fully_received() && f.day_diff > 0 && f.day_diff <= grace
        },
    },
    StatusRule {
        id: "R6",
        reason: "received in full after the grace window",
        status: OtifStatus::Late,
        applies: |f, grace| f.has_actual && f.fully_received() && f.day_diff > grace,
    },
    StatusRule {
        id: "R7",
        reason: "received in full before the expected date",
        status: OtifStatus::Early,
        applies: |f, _| f.has_actual && f.fully_received() && f.day_diff < 0,
    },
];

static FALLBACK_RULE: StatusRule = StatusRule {
    id: "R8",
    reason: "fallback",
    status: OtifStatus::NotDelivered,
    applies: |_, _| true,
};

// ==========================================
// OtifClassifier - 分类引擎
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct OtifClassifier {
    grace_days: i64,
}

impl Default for OtifClassifier {
    fn default() -> Self {
        Self {
            grace_days: DEFAULT_GRACE_DAYS,
        }
    }
}

impl OtifClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定宽限天数（0 表示仅当天到货计合规）
    pub fn with_grace_days(grace_days: i64) -> ClassifyResult<Self> {
        if grace_days < 0 {
            return Err(ClassifyError::InvalidGraceDays(grace_days));
        }
        Ok(Self { grace_days })
    }

    pub fn grace_days(&self) -> i64 {
        self.grace_days
    }

    /// 分类一次完整批次
    ///
    /// 流程:
    /// 1. 校验全部行的数量范围（任一越界则整批失败）
    /// 2. 收集去重后的供应商编码，调用一次 resolve
    /// 3. 逐行评估规则表并投影供应商名
    #[instrument(skip(self, lines, directory), fields(count = lines.len(), grace_days = self.grace_days))]
    pub fn classify<D>(&self, lines: &[OrderLine], directory: &D) -> ClassifyResult<Vec<ClassifiedLine>>
    where
        D: SupplierDirectory + ?Sized,
    {
        let pass_id = Uuid::new_v4().to_string();
        debug!(pass_id = %pass_id, "开始分类");

        for line in lines {
            validate_quantities(line)?;
        }

        let codes: Vec<SupplierCode> = lines
            .iter()
            .map(|l| l.supplier_code)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let names = directory.resolve(&codes)?;

        let classified: Vec<ClassifiedLine> = lines
            .iter()
            .map(|line| self.classify_line(line, supplier_display_name(&names, line.supplier_code)))
            .collect();

        let mut per_status: BTreeMap<OtifStatus, usize> = BTreeMap::new();
        for line in &classified {
            *per_status.entry(line.status).or_insert(0) += 1;
        }
        info!(
            pass_id = %pass_id,
            total = classified.len(),
            suppliers = codes.len(),
            unresolved = codes.len().saturating_sub(names.len()),
            breakdown = ?per_status,
            "分类完成"
        );

        Ok(classified)
    }

    /// 单行分类（数量已校验）
    pub fn classify_line(&self, line: &OrderLine, supplier_name: String) -> ClassifiedLine {
        let facts = DeliveryFacts::of(line);
        let rule = self.evaluate(&facts);

        ClassifiedLine {
            order: line.clone(),
            supplier_name,
            delivered_qty: line.delivered_qty(),
            day_diff: facts.day_diff,
            status: rule.status,
            is_otif: rule.status.is_otif(),
            status_reason: format!("{} {}", rule.id, rule.reason),
        }
    }

    fn evaluate(&self, facts: &DeliveryFacts) -> &'static StatusRule {
        RULES
            .iter()
            .find(|rule| (rule.applies)(facts, self.grace_days))
            .unwrap_or(&FALLBACK_RULE)
    }
}

fn validate_quantities(line: &OrderLine) -> ClassifyResult<()> {
    // NaN 也会落入此分支
    if !(line.pending_qty >= 0.0 && line.pending_qty <= line.total_qty) {
        return Err(ClassifyError::InvalidQuantity {
            row: line.row_number,
            document_no: line.document_no.clone(),
            pending: line.pending_qty,
            total: line.total_qty,
        });
    }
    Ok(())
}

fn supplier_display_name(names: &HashMap<SupplierCode, String>, code: SupplierCode) -> String {
    names
        .get(&code)
        .cloned()
        .unwrap_or_else(|| placeholder_name(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::supplier_directory::StaticSupplierDirectory;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn line(actual: Option<u32>, total: f64, pending: f64) -> OrderLine {
        OrderLine {
            document_no: "PC-001".to_string(),
            supplier_code: 10,
            item_no: "ITM-1".to_string(),
            description: "Steel plate".to_string(),
            warehouse_code: "ALM1".to_string(),
            expected_date: date(10),
            actual_date: actual.map(date),
            order_date: date(1),
            total_qty: total,
            pending_qty: pending,
            unit_cost: 2.0,
            row_number: 1,
        }
    }

    fn classify_one(l: OrderLine) -> ClassifiedLine {
        OtifClassifier::new()
            .classify(&[l], &StaticSupplierDirectory::empty())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_rule_table_covers_each_status() {
        crate::logging::init_test();
        assert_eq!(classify_one(line(None, 5.0, 0.0)).status, OtifStatus::PendingDateComplete);
        assert_eq!(classify_one(line(None, 5.0, 5.0)).status, OtifStatus::NotDelivered);
        assert_eq!(classify_one(line(Some(10), 5.0, 1.0)).status, OtifStatus::NotDelivered);
        assert_eq!(classify_one(line(Some(10), 5.0, 0.0)).status, OtifStatus::OnTimeInFull);
        assert_eq!(classify_one(line(Some(12), 5.0, 0.0)).status, OtifStatus::GraceException);
        assert_eq!(classify_one(line(Some(13), 5.0, 0.0)).status, OtifStatus::Late);
        assert_eq!(classify_one(line(Some(8), 5.0, 0.0)).status, OtifStatus::Early);
    }

    #[test]
    fn test_reason_names_fired_rule() {
        let c = classify_one(line(Some(11), 5.0, 0.0));
        assert!(c.status_reason.starts_with("R5"));
        let c = classify_one(line(None, 5.0, 2.0));
        assert!(c.status_reason.starts_with("R2"));
    }

    #[test]
    fn test_grace_days_configurable() {
        let strict = OtifClassifier::with_grace_days(0).unwrap();
        let out = strict
            .classify(&[line(Some(11), 5.0, 0.0)], &StaticSupplierDirectory::empty())
            .unwrap();
        assert_eq!(out[0].status, OtifStatus::Late);
        assert!(!out[0].is_otif);

        assert!(matches!(
            OtifClassifier::with_grace_days(-1),
            Err(ClassifyError::InvalidGraceDays(-1))
        ));
    }

    #[test]
    fn test_pending_out_of_range_fails_pass() {
        let classifier = OtifClassifier::new();
        let mut bad = line(Some(10), 5.0, 6.0);
        bad.row_number = 7;
        let result = classifier.classify(
            &[line(Some(10), 5.0, 0.0), bad],
            &StaticSupplierDirectory::empty(),
        );
        assert!(matches!(result, Err(ClassifyError::InvalidQuantity { row: 7, .. })));

        let negative = classifier.classify(&[line(None, 5.0, -1.0)], &StaticSupplierDirectory::empty());
        assert!(negative.is_err());

        let nan = classifier.classify(&[line(None, 5.0, f64::NAN)], &StaticSupplierDirectory::empty());
        assert!(nan.is_err());
    }

    #[test]
    fn test_unknown_supplier_gets_placeholder() {
        let c = classify_one(line(Some(10), 5.0, 0.0));
        assert_eq!(c.supplier_name, "Supplier 10");
    }
}
