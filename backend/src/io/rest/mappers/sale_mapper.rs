use shared::{
    RecordSaleRequest, Sale as SharedSale, SaleLine as SharedLine, SaleListResponse, SaleResponse,
};

use super::{format_date, parse_date};
use crate::domain::commands::sales::RecordSaleCommand;
use crate::domain::models::sale::{Sale, SaleLine};
use crate::error::Result;

pub struct SaleMapper;

impl SaleMapper {
    pub fn to_dto(domain: Sale) -> SharedSale {
        SharedSale {
            total: domain.total(),
            id: domain.id,
            buyer_name: domain.buyer_name,
            buyer_contact: domain.buyer_contact,
            sale_date: format_date(domain.sale_date),
            notes: domain.notes,
            lines: domain
                .lines
                .into_iter()
                .map(|line| SharedLine { animal_id: line.animal_id, price: line.price })
                .collect(),
            created_at: domain.created_at.to_rfc3339(),
        }
    }

    pub fn to_record_command(request: RecordSaleRequest) -> Result<RecordSaleCommand> {
        Ok(RecordSaleCommand {
            sale_date: parse_date("sale_date", &request.sale_date)?,
            buyer_name: request.buyer_name,
            buyer_contact: request.buyer_contact,
            notes: request.notes,
            lines: request
                .lines
                .into_iter()
                .map(|line| SaleLine {
                    animal_id: line.animal_id.trim().to_string(),
                    price: line.price,
                })
                .collect(),
        })
    }

    pub fn to_sale_response(domain: Sale, success_message: impl Into<String>) -> SaleResponse {
        SaleResponse {
            sale: Self::to_dto(domain),
            success_message: success_message.into(),
        }
    }

    pub fn to_list_response(sales: Vec<Sale>) -> SaleListResponse {
        SaleListResponse {
            sales: sales.into_iter().map(Self::to_dto).collect(),
        }
    }
}
