//! Plain-text rendering of receipts and genealogy certificates.
//!
//! Pure formatting: amounts, dates and the pedigree tree are laid out using
//! the configured [`LocaleConfig`]; nothing here touches storage.

use chrono::NaiveDate;
use std::fmt::Write;

use crate::config::LocaleConfig;
use crate::domain::models::breeding::BreedingPerformance;
use crate::domain::models::document::{GenealogyCertificate, SaleReceipt};
use crate::domain::models::pedigree::AncestorNode;

const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";
const RULE: &str = "----------------------------------------";

#[derive(Debug, Clone)]
pub struct DocumentFormatter {
    locale: LocaleConfig,
}

impl DocumentFormatter {
    pub fn new(locale: LocaleConfig) -> Self {
        Self { locale }
    }

    /// "12,50 €" or "€12.50" depending on the locale
    pub fn format_amount(&self, amount: f64) -> String {
        let number = self.format_decimal(amount, 2);
        if self.locale.symbol_after {
            format!("{} {}", number, self.locale.currency_symbol)
        } else {
            format!("{}{}", self.locale.currency_symbol, number)
        }
    }

    /// Date in the configured format, ISO 8601 if that format cannot render it
    pub fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.locale.date_format)).is_err() {
            return date.format(FALLBACK_DATE_FORMAT).to_string();
        }
        out
    }

    pub fn format_rate(&self, rate: Option<f64>) -> String {
        match rate {
            Some(rate) => format!("{} %", self.format_decimal(rate * 100.0, 1)),
            None => "n/a".to_string(),
        }
    }

    fn format_decimal(&self, value: f64, places: usize) -> String {
        let text = format!("{:.*}", places, value);
        if self.locale.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.locale.decimal_separator.to_string())
        }
    }

    /// Render a pedigree as an indented tree, sire before dam
    pub fn render_pedigree(&self, tree: &AncestorNode) -> Vec<String> {
        let mut lines = vec![self.node_label(tree)];
        self.render_parents(tree, "", &mut lines);
        lines
    }

    fn render_parents(&self, node: &AncestorNode, prefix: &str, lines: &mut Vec<String>) {
        let AncestorNode::Animal { sire, dam, .. } = node else {
            return;
        };

        let parents = [("Sire", sire.as_deref()), ("Dam", dam.as_deref())];
        let expanded: Vec<(&str, &AncestorNode)> = parents
            .into_iter()
            .filter_map(|(role, parent)| parent.map(|p| (role, p)))
            .collect();

        for (index, (role, parent)) in expanded.iter().enumerate() {
            let last = index + 1 == expanded.len();
            let branch = if last { "└── " } else { "├── " };
            lines.push(format!("{}{}{}: {}", prefix, branch, role, self.node_label(parent)));

            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            self.render_parents(parent, &child_prefix, lines);
        }
    }

    fn node_label(&self, node: &AncestorNode) -> String {
        match node {
            AncestorNode::Animal { animal, .. } => {
                let mut label = animal.id.clone();
                if let Some(name) = &animal.name {
                    label.push_str(&format!(" \"{}\"", name));
                }
                label.push_str(&format!(" ({}, {}", animal.breed, animal.sex));
                if let Some(birth_date) = animal.birth_date {
                    label.push_str(&format!(", born {}", self.format_date(birth_date)));
                }
                label.push(')');
                label
            }
            AncestorNode::Unknown => "unknown".to_string(),
            AncestorNode::Unregistered { id } => format!("{} (not registered)", id),
            AncestorNode::Cycle { id } => format!("{} (repeats a descendant, not expanded)", id),
        }
    }

    pub fn sale_receipt_text(&self, receipt: &SaleReceipt) -> String {
        let mut lines = vec![
            "SALE RECEIPT".to_string(),
            RULE.to_string(),
            format!("Receipt: {}", receipt.sale_id),
            format!("Date: {}", self.format_date(receipt.sale_date)),
            format!("Buyer: {}", receipt.buyer_name),
        ];
        if let Some(contact) = &receipt.buyer_contact {
            lines.push(format!("Contact: {}", contact));
        }
        lines.push(RULE.to_string());

        for (index, line) in receipt.lines.iter().enumerate() {
            let name = line
                .name
                .as_ref()
                .map(|n| format!(" \"{}\"", n))
                .unwrap_or_default();
            lines.push(format!(
                "{}. {}{} ({}, {}): {}",
                index + 1,
                line.animal_id,
                name,
                line.breed,
                line.sex,
                self.format_amount(line.price)
            ));
            for tree_line in self.render_pedigree(&line.pedigree).iter().skip(1) {
                lines.push(format!("   {}", tree_line));
            }
        }

        lines.push(RULE.to_string());
        lines.push(format!("Total: {}", self.format_amount(receipt.total)));
        lines.join("\n")
    }

    pub fn certificate_text(&self, certificate: &GenealogyCertificate) -> String {
        let animal = &certificate.animal;
        let mut lines = vec![
            "GENEALOGY CERTIFICATE".to_string(),
            RULE.to_string(),
            format!("Animal: {}", animal.id),
        ];
        if let Some(name) = &animal.name {
            lines.push(format!("Name: {}", name));
        }
        lines.push(format!("Breed: {}", animal.breed));
        lines.push(format!("Sex: {}", animal.sex));
        if let Some(color) = &animal.color {
            lines.push(format!("Color: {}", color));
        }
        if let Some(birth_date) = animal.birth_date {
            lines.push(format!("Born: {}", self.format_date(birth_date)));
        }
        lines.push(format!("Issued: {}", self.format_date(certificate.issued_on)));

        lines.push(String::new());
        lines.push(format!("Pedigree ({} generations)", certificate.depth));
        lines.extend(self.render_pedigree(&certificate.pedigree));

        lines.push(String::new());
        lines.push("Breeding performance".to_string());
        lines.extend(self.performance_lines(&certificate.performance));

        lines.join("\n")
    }

    fn performance_lines(&self, perf: &BreedingPerformance) -> Vec<String> {
        vec![
            format!(
                "Matings: {} ({} successful, {} failed)",
                perf.matings, perf.successful_matings, perf.failed_matings
            ),
            format!("Litters: {}", perf.litters),
            format!("Born: {} ({} stillborn)", perf.total_born, perf.stillborn),
            format!("Alive at 24h / 48h: {} / {}", perf.survivors_24h, perf.survivors_48h),
            format!("Weaned: {}", perf.weaned),
            format!("Survival rate: {}", self.format_rate(perf.survival_rate)),
            format!("Fertility rate: {}", self.format_rate(perf.fertility_rate)),
        ]
    }
}
