//! Invoice Model (factura)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::de_id;

/// Table reference embedded in an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTableRef {
    #[serde(rename = "numero")]
    pub number: u32,
}

/// Issuing user reference embedded in an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceUserRef {
    #[serde(rename = "nombre")]
    pub name: String,
}

/// Finalized, immutable bill generated from a table's consumption lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    /// Sequential invoice number
    #[serde(rename = "numero_factura")]
    pub number: u64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mesas", default, skip_serializing_if = "Option::is_none")]
    pub table: Option<InvoiceTableRef>,
    #[serde(rename = "usuarios", default, skip_serializing_if = "Option::is_none")]
    pub issued_by: Option<InvoiceUserRef>,
}

impl Invoice {
    pub fn table_number(&self) -> Option<u32> {
        self.table.as_ref().map(|t| t.number)
    }

    pub fn issuer_name(&self) -> Option<&str> {
        self.issued_by.as_ref().map(|u| u.name.as_str())
    }
}

/// One product line of an invoice (`GET /facturas/:id`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub factura_id: String,
    #[serde(rename = "producto_id", deserialize_with = "de_id")]
    pub product_id: String,
    #[serde(rename = "nombre_producto")]
    pub product_name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precio_unitario")]
    pub unit_price: f64,
    pub subtotal: f64,
}
