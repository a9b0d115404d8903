//! PDF export
//!
//! Documents are first laid out as plain positioned text (millimetres from
//! the top-left corner), then rendered with `printpdf`. The layout step holds
//! all pagination decisions and is what the tests exercise.

use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};
use shared::money;

use super::ReportError;
use super::summary::SalesReport;

/// A4 portrait
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Rows past this cursor position continue on a new page
pub const PAGE_BREAK_Y: f32 = 270.0;
/// Cursor position at the top of a continuation page
pub const PAGE_TOP_Y: f32 = 20.0;
pub const FOOTER_Y: f32 = 285.0;

const ROW_HEIGHT: f32 = 10.0;
const ROW_BASELINE: f32 = 5.5;

pub const BRAND: (u8, u8, u8) = (146, 84, 164);
pub const ACCENT: (u8, u8, u8) = (255, 107, 159);
pub const MUTED: (u8, u8, u8) = (128, 128, 128);
pub const BLACK: (u8, u8, u8) = (0, 0, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub x: f32,
    /// Distance from the top edge
    pub y: f32,
    pub size: f32,
    pub color: (u8, u8, u8),
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub items: Vec<TextItem>,
}

impl PageLayout {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub width_mm: f32,
    pub height_mm: f32,
    pub pages: Vec<PageLayout>,
}

impl DocumentLayout {
    pub fn new(title: impl Into<String>, width_mm: f32, height_mm: f32) -> Self {
        Self {
            title: title.into(),
            width_mm,
            height_mm,
            pages: vec![PageLayout::default()],
        }
    }

    pub fn new_page(&mut self) {
        self.pages.push(PageLayout::default());
    }

    /// Write on the current (last) page
    pub fn text(&mut self, x: f32, y: f32, size: f32, color: (u8, u8, u8), text: impl Into<String>) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(TextItem {
                x,
                y,
                size,
                color,
                text: text.into(),
            });
        }
    }
}

/// Lay out the sales report: header, period, summary, invoice table, footer
pub fn layout_report(report: &SalesReport) -> DocumentLayout {
    let mut doc = DocumentLayout::new("Reporte de Ventas", A4_WIDTH_MM, A4_HEIGHT_MM);
    let mut y = 20.0;

    doc.text(14.0, y, 20.0, BRAND, "Reporte de Ventas");
    doc.text(14.0, y + 7.0, 12.0, MUTED, "Flor de Loto Restaurante");
    y += 20.0;

    for line in report.period_lines() {
        doc.text(14.0, y, 12.0, BLACK, line);
        y += 6.0;
    }

    let summary = &report.summary;
    doc.text(14.0, y, 11.0, ACCENT, "Resumen del Período");
    y += 8.0;
    doc.text(
        14.0,
        y,
        10.0,
        BLACK,
        format!("Total ventas: ${}", money::format_amount(summary.total)),
    );
    y += 6.0;
    doc.text(14.0, y, 10.0, BLACK, format!("Cantidad de facturas: {}", summary.count));
    y += 6.0;
    doc.text(
        14.0,
        y,
        10.0,
        BLACK,
        format!("Ticket promedio: ${}", money::format_amount(summary.average)),
    );
    y += 12.0;

    doc.text(14.0, y, 11.0, BRAND, "Detalle de Facturas");
    y += 8.0;

    for (x, heading) in [
        (16.0, "# Factura"),
        (50.0, "Fecha"),
        (80.0, "Hora"),
        (100.0, "Mesa"),
        (150.0, "Total"),
    ] {
        doc.text(x, y + ROW_BASELINE, 9.0, BRAND, heading);
    }
    y += ROW_HEIGHT;

    for row in report.rows() {
        if y > PAGE_BREAK_Y {
            doc.new_page();
            y = PAGE_TOP_Y;
        }
        let baseline = y + ROW_BASELINE;
        doc.text(16.0, baseline, 9.0, BLACK, row.number);
        doc.text(50.0, baseline, 9.0, BLACK, row.date);
        doc.text(80.0, baseline, 9.0, BLACK, row.time);
        doc.text(100.0, baseline, 9.0, BLACK, row.table);
        doc.text(150.0, baseline, 9.0, BLACK, row.total);
        y += ROW_HEIGHT;
    }

    let generated = report.generated_at.with_timezone(&report.timezone);
    doc.text(
        14.0,
        FOOTER_Y,
        8.0,
        MUTED,
        format!(
            "Generado el {} | Flor de Loto Sistema",
            generated.format("%d/%m/%Y, %H:%M:%S")
        ),
    );

    doc
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Render a layout to PDF bytes
pub fn render(layout: &DocumentLayout) -> Result<Vec<u8>, ReportError> {
    let width = Mm(layout.width_mm);
    let height = Mm(layout.height_mm);
    let (doc, first_page, first_layer) = PdfDocument::new(&layout.title, width, height, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_ref, layer_ref) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, "Layer 1")
        };
        let layer = doc.get_page(page_ref).get_layer(layer_ref);
        for item in &page.items {
            layer.set_fill_color(rgb(item.color));
            layer.use_text(
                item.text.as_str(),
                item.size,
                Mm(item.x),
                Mm(layout.height_mm - item.y),
                &font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))
}

/// Render and write `file_name` into `dir`
pub fn write_pdf(layout: &DocumentLayout, dir: &Path, file_name: &str) -> Result<PathBuf, ReportError> {
    let bytes = render(layout)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), pages = layout.pages.len(), "PDF exported");
    Ok(path)
}

/// Export the sales report as `reporte_<mode>_<date>.pdf`
pub fn export_report(report: &SalesReport, dir: &Path) -> Result<PathBuf, ReportError> {
    write_pdf(&layout_report(report), dir, &report.file_name())
}
