//! PDF statement.

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::context::StatementContext;
use super::format::StatementFormatter;
use super::renderer::{RenderError, StatementRenderer};
use crate::export::ExportFormat;

const PAGE_WIDTH: u16 = 210;
const PAGE_HEIGHT: u16 = 297;
const TOP: u16 = 280;
const BOTTOM: u16 = 20;
const LEFT: u16 = 15;
const ROW: u16 = 6;

/// Table columns: date, type, reference, amount, balance.
const COLUMNS: [u16; 5] = [15, 48, 78, 140, 172];

/// Characters per line of the notes block at 10pt.
const NOTES_WIDTH: usize = 64;

/// Notes beyond this many lines are cut with an ellipsis.
const NOTES_MAX_LINES: usize = 12;

/// Replaces what the built-in fonts cannot draw: anything outside Latin-1, and control characters.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            c if c.is_control() => ' ',
            c if u32::from(c) > 0xFF => '?',
            c => c,
        })
        .collect()
}

/// Word-wraps closing notes to [`NOTES_WIDTH`], keeping explicit line breaks.
fn wrap_notes(notes: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in notes.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > NOTES_WIDTH {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..NOTES_WIDTH).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > NOTES_WIDTH {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    if lines.len() > NOTES_MAX_LINES {
        lines.truncate(NOTES_MAX_LINES);
        if let Some(last) = lines.last_mut() {
            let keep = NOTES_WIDTH.saturating_sub(3);
            *last = last.chars().take(keep).collect::<String>() + "...";
        }
    }
    lines
}

fn mm(v: u16) -> Mm {
    Mm(f32::from(v))
}

fn pdf_err(e: impl std::fmt::Debug) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

/// Renders A4 statements with the built-in Helvetica fonts.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    formatter: StatementFormatter,
}

impl PdfRenderer {
    /// Create a renderer.
    #[must_use]
    pub const fn new(formatter: StatementFormatter) -> Self {
        Self { formatter }
    }
}

/// Writes lines top-down and starts a new page when the current one is full.
struct Cursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: u16,
    pages: u16,
}

impl Cursor {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Page 1");
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: TOP,
            pages: 1,
        })
    }

    fn text(&self, x: u16, text: &str, size: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(printable(text), size, mm(x), mm(self.y), font);
    }

    fn advance(&mut self, step: u16) {
        if self.y < BOTTOM + step {
            self.new_page();
        } else {
            self.y -= step;
        }
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            mm(PAGE_WIDTH),
            mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn pair(&mut self, label: &str, value: &str) {
        self.text(LEFT, label, 10.0, true);
        self.text(70, value, 10.0, false);
        self.advance(ROW);
    }

    fn table_header(&mut self) {
        for (x, title) in COLUMNS
            .iter()
            .zip(["Date", "Type", "Reference", "Amount", "Balance"])
        {
            self.text(*x, title, 9.0, true);
        }
        self.advance(ROW);
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        self.doc.save_to_bytes().map_err(pdf_err)
    }
}

impl StatementRenderer for PdfRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, ctx: &StatementContext) -> Result<Vec<u8>, RenderError> {
        let f = &self.formatter;
        let currency = ctx.currency();
        let register = &ctx.register;
        let totals = &ctx.totals;

        let mut page = Cursor::new(&format!("Cash register {}", register.id))?;

        page.text(LEFT, "Cash register statement", 16.0, true);
        page.advance(ROW * 2);
        page.pair("Shop", &ctx.shop.name);
        page.pair("Currency", currency);
        page.pair("Opened", &f.date_time(register.opened_at));
        page.pair(
            "Opened by",
            register.opened_by_name.as_deref().unwrap_or("-"),
        );
        page.pair(
            "Closed",
            &register
                .closed_at
                .map_or_else(|| "-".to_string(), |at| f.date_time(at)),
        );
        page.advance(ROW);

        page.text(LEFT, "Summary", 12.0, true);
        page.advance(ROW + 2);
        let summary = [
            ("Opening amount", Some(register.opening_amount)),
            ("Sales", Some(totals.sales)),
            ("Incomes", Some(totals.incomes)),
            ("Deposits", Some(totals.deposits)),
            ("Purchases", Some(totals.purchases)),
            ("Returns", Some(totals.returns)),
            ("Expenses", Some(totals.expenses)),
            ("Withdrawals", Some(totals.withdrawals)),
            ("Total income", Some(totals.total_income)),
            ("Total expense", Some(totals.total_expense)),
            ("Net income", Some(totals.net_income)),
            ("Expected amount", register.closing_amount),
            ("Counted amount", register.actual_amount),
            ("Difference", register.difference),
        ];
        for (label, amount) in summary {
            page.pair(label, &f.optional_money(amount, currency));
        }
        page.pair(
            "Status",
            ctx.difference_status.map_or("-", |s| s.label()),
        );
        if let Some(notes) = register.closing_notes.as_deref() {
            for (i, line) in wrap_notes(notes).iter().enumerate() {
                page.pair(if i == 0 { "Notes" } else { "" }, line);
            }
        }
        page.advance(ROW);

        page.text(LEFT, "Movements", 12.0, true);
        page.advance(ROW + 2);
        page.table_header();
        for line in &ctx.lines {
            let cells = [
                f.date_time(line.created_at),
                line.movement_type.label().to_string(),
                line.reference.clone(),
                f.money(line.signed_amount, currency),
                f.money(line.running_balance, currency),
            ];
            for (x, cell) in COLUMNS.iter().zip(&cells) {
                page.text(*x, cell, 9.0, false);
            }
            let before = page.pages;
            page.advance(ROW);
            if page.pages != before {
                page.table_header();
            }
        }

        page.advance(ROW);
        page.text(
            LEFT,
            &format!("Generated {}", f.date_time(ctx.generated_at)),
            8.0,
            false,
        );

        page.finish()
    }
}
