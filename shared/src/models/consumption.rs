//! Consumption Line Model (consumo)
//!
//! One ordered product quantity attached to a table, pending invoicing.

use serde::{Deserialize, Serialize};

use crate::money;
use crate::util::{de_id, de_opt_id};

/// Product snapshot embedded in a consumption line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineProduct {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    /// Unit price
    #[serde(rename = "precio")]
    pub price: f64,
}

/// Consumption line entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionLine {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(
        rename = "mesa_id",
        default,
        deserialize_with = "de_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub table_id: Option<String>,
    #[serde(rename = "producto")]
    pub product: LineProduct,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    /// Subtotal as reported by the backend
    #[serde(default)]
    pub subtotal: f64,
    #[serde(rename = "comentario", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ConsumptionLine {
    /// quantity × unit price
    pub fn computed_subtotal(&self) -> f64 {
        money::line_subtotal(self.product.price, self.quantity)
    }

    pub fn comment_text(&self) -> &str {
        self.comment.as_deref().unwrap_or("")
    }
}

/// Lines and total of one table (`GET /mesas/:id/consumos`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConsumption {
    #[serde(rename = "consumos", default)]
    pub lines: Vec<ConsumptionLine>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl TableConsumption {
    /// Sum of the computed line subtotals
    pub fn computed_total(&self) -> f64 {
        money::sum(self.lines.iter().map(ConsumptionLine::computed_subtotal))
    }

    /// Backend total when present, otherwise the computed one
    pub fn effective_total(&self) -> f64 {
        self.total.unwrap_or_else(|| self.computed_total())
    }
}

/// Add line payload (`POST /mesas/consumos`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionCreate {
    #[serde(rename = "mesa_id")]
    pub table_id: String,
    #[serde(rename = "producto_id")]
    pub product_id: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

/// Update line payload (`PATCH /mesas/consumos/:id`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionUpdate {
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "comentario", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
