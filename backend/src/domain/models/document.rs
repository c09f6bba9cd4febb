use chrono::NaiveDate;
use shared::Sex;

use super::animal::Animal;
use super::breeding::BreedingPerformance;
use super::pedigree::AncestorNode;

/// One sold animal on a receipt, with its pedigree
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub animal_id: String,
    pub name: Option<String>,
    pub breed: String,
    pub sex: Sex,
    pub price: f64,
    pub pedigree: AncestorNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    pub sale_id: String,
    pub buyer_name: String,
    pub buyer_contact: Option<String>,
    pub sale_date: NaiveDate,
    pub lines: Vec<ReceiptLine>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenealogyCertificate {
    pub animal: Animal,
    pub depth: u32,
    pub pedigree: AncestorNode,
    pub performance: BreedingPerformance,
    pub issued_on: NaiveDate,
}
