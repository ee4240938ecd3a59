use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct DetectionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// A posted transaction as the detector sees it: immutable, dated, signed.
/// Ordering by `posted_at` with `txn_id` as the tie-break is the only
/// guarantee the detector relies on.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub txn_id: String,
    pub account_id: String,
    pub posted_at: NaiveDate,
    pub amount: f64,
    pub description: String,
    pub merchant: Option<String>,
}

impl TransactionRecord {
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    pub fn merchant_text(&self) -> &str {
        match self.merchant.as_deref() {
            Some(value) if !value.trim().is_empty() => value,
            _ => &self.description,
        }
    }
}
