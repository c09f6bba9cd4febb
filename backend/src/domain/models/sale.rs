use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub animal_id: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub buyer_name: String,
    pub buyer_contact: Option<String>,
    pub sale_date: NaiveDate,
    pub notes: Option<String>,
    pub lines: Vec<SaleLine>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    pub fn generate_id() -> String {
        format!("sale::{}", Uuid::new_v4())
    }

    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.price).sum()
    }
}
