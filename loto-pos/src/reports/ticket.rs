//! 80 mm receipt for one invoice

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use loto_client::PosApi;
use shared::models::{Invoice, InvoiceLine};
use shared::money;

use super::pdf::{BLACK, DocumentLayout, write_pdf};
use crate::error::PosResult;

pub const TICKET_WIDTH_MM: f32 = 80.0;
pub const TICKET_HEIGHT_MM: f32 = 200.0;

const LEFT: f32 = 4.0;
const RIGHT: f32 = 76.0;
const CENTER: f32 = TICKET_WIDTH_MM / 2.0;
const RULE: &str = "------------------------------------------------";

/// 1 pt in mm
const PT_TO_MM: f32 = 0.3528;

/// Rough Helvetica advance: half the font size per character
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * PT_TO_MM
}

fn centered(doc: &mut DocumentLayout, y: f32, size: f32, text: &str) {
    let x = (CENTER - text_width(text, size) / 2.0).max(0.0);
    doc.text(x, y, size, BLACK, text);
}

fn right_aligned(doc: &mut DocumentLayout, y: f32, size: f32, text: &str) {
    let x = (RIGHT - text_width(text, size)).max(LEFT);
    doc.text(x, y, size, BLACK, text);
}

/// Lay out the ticket: shop header, invoice data, one entry per line, total
pub fn layout_ticket(invoice: &Invoice, lines: &[InvoiceLine], tz: Tz) -> DocumentLayout {
    let mut doc = DocumentLayout::new(
        format!("Factura #{}", invoice.number),
        TICKET_WIDTH_MM,
        TICKET_HEIGHT_MM,
    );
    let mut y = 12.0;

    centered(&mut doc, y, 11.0, "Flor De Loto");
    y += 5.0;
    centered(&mut doc, y, 8.0, "Heladeria");
    y += 4.0;
    centered(&mut doc, y, 8.0, RULE);
    y += 4.0;

    let issued = invoice.created_at.with_timezone(&tz);
    let table = invoice
        .table_number()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".into());
    for (text, step) in [
        (format!("Factura #{}", invoice.number), 4.0),
        (format!("Fecha: {}", issued.format("%d/%m/%Y")), 4.0),
        (format!("Número de mesa: {table}"), 4.0),
        (
            format!("Atendid@ por: {}", invoice.issuer_name().unwrap_or("-")),
            5.0,
        ),
    ] {
        doc.text(LEFT, y, 8.0, BLACK, text);
        y += step;
    }

    centered(&mut doc, y, 8.0, RULE);
    y += 4.0;
    doc.text(LEFT, y, 8.0, BLACK, "Producto");
    right_aligned(&mut doc, y, 8.0, "Total");
    y += 3.0;
    centered(&mut doc, y, 8.0, RULE);
    y += 4.0;

    for line in lines {
        doc.text(LEFT, y, 8.0, BLACK, line.product_name.as_str());
        y += 3.0;
        doc.text(
            LEFT + 2.0,
            y,
            8.0,
            BLACK,
            format!("{} x ${}", line.quantity, money::format_amount(line.unit_price)),
        );
        right_aligned(&mut doc, y, 8.0, &format!("${}", money::format_amount(line.subtotal)));
        y += 4.0;
    }

    y += 2.0;
    centered(&mut doc, y, 8.0, RULE);
    y += 5.0;
    right_aligned(
        &mut doc,
        y,
        10.0,
        &format!("Total: ${}", money::format_amount(invoice.total)),
    );
    y += 8.0;
    centered(&mut doc, y, 8.0, "Gracias por tu compra");
    y += 4.0;
    centered(&mut doc, y, 8.0, "Esperamos verte de nuevo pronto");

    doc
}

/// `ticket_<numero>.pdf`
pub fn ticket_file_name(invoice: &Invoice) -> String {
    format!("ticket_{}.pdf", invoice.number)
}

/// Fetch the invoice lines and write the ticket PDF into `dir`
pub async fn export_ticket(
    api: &dyn PosApi,
    invoice: &Invoice,
    tz: Tz,
    dir: &Path,
) -> PosResult<PathBuf> {
    let lines = api.invoice_lines(&invoice.id).await?;
    tracing::debug!(invoice = invoice.number, lines = lines.len(), "Invoice detail loaded");
    let layout = layout_ticket(invoice, &lines, tz);
    Ok(write_pdf(&layout, dir, &ticket_file_name(invoice))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, invoice};
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Bogota;
    use shared::models::InvoiceUserRef;

    fn detail(id: &str, name: &str, quantity: u32, unit_price: f64) -> InvoiceLine {
        InvoiceLine {
            id: id.into(),
            factura_id: "f1".into(),
            product_id: id.into(),
            product_name: name.into(),
            quantity,
            unit_price,
            subtotal: money::line_subtotal(unit_price, quantity),
        }
    }

    fn sample() -> (Invoice, Vec<InvoiceLine>) {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 23, 10, 0).unwrap();
        let mut inv = invoice("f1", 58, 27000.0, at);
        inv.issued_by = Some(InvoiceUserRef { name: "Ana".into() });
        (
            inv,
            vec![detail("p1", "Copa Loto", 2, 12000.0), detail("p2", "Agua", 1, 3000.0)],
        )
    }

    #[test]
    fn test_ticket_content() {
        let (inv, lines) = sample();
        let layout = layout_ticket(&inv, &lines, Bogota);
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.width_mm, 80.0);

        let texts: Vec<&str> = layout.pages[0].texts().collect();
        assert!(texts.contains(&"Factura #58"));
        assert!(texts.contains(&"Fecha: 19/10/2026"));
        assert!(texts.contains(&"Número de mesa: 3"));
        assert!(texts.contains(&"Atendid@ por: Ana"));
        assert!(texts.contains(&"2 x $12,000.00"));
        assert!(texts.contains(&"$24,000.00"));
        assert!(texts.contains(&"Total: $27,000.00"));
    }

    #[test]
    fn test_right_aligned_text_stays_on_paper() {
        let (inv, lines) = sample();
        let layout = layout_ticket(&inv, &lines, Bogota);
        let total = layout.pages[0]
            .items
            .iter()
            .find(|item| item.text.starts_with("Total: $"))
            .unwrap();
        assert!(total.x >= LEFT);
        assert!(total.x + text_width(&total.text, total.size) <= RIGHT + 0.01);
    }

    #[tokio::test]
    async fn test_export_fetches_lines() {
        let backend = FakeBackend::new();
        let (inv, lines) = sample();
        backend.add_invoice(inv.clone(), lines);
        let dir = tempfile::TempDir::new().unwrap();

        let path = export_ticket(&backend, &inv, Bogota, dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "ticket_58.pdf");
        assert_eq!(backend.calls(), vec!["invoice_lines".to_string()]);
    }
}
