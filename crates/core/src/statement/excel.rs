//! Spreadsheet statement.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Image, Workbook, Worksheet, XlsxError};
use till_shared::types::Money;

use super::context::StatementContext;
use super::format::StatementFormatter;
use super::logo::LogoCache;
use super::renderer::{RenderError, StatementRenderer};
use crate::export::ExportFormat;

/// Rows reserved above the header when a logo is present.
const LOGO_ROWS: u32 = 6;

impl From<XlsxError> for RenderError {
    fn from(e: XlsxError) -> Self {
        Self::Spreadsheet(e.to_string())
    }
}

fn number(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

/// Cell format for amounts: `"CLP" #,##0` or `"USD" #,##0.00`, sign after the code.
fn amount_format(code: &str) -> String {
    let label: String = code
        .trim()
        .to_uppercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let digits = match Money::minor_units_of(code) {
        0 => "#,##0".to_string(),
        dp => format!("#,##0.{}", "0".repeat(dp as usize)),
    };
    format!("\"{label}\" {digits};\"{label}\" -{digits}")
}

/// Renders single-sheet workbooks with numeric amount cells.
#[derive(Debug, Clone, Default)]
pub struct ExcelRenderer {
    formatter: StatementFormatter,
    logo: Arc<LogoCache>,
}

impl ExcelRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new(formatter: StatementFormatter, logo: Arc<LogoCache>) -> Self {
        Self { formatter, logo }
    }

    fn write_sheet(&self, sheet: &mut Worksheet, ctx: &StatementContext) -> Result<(), XlsxError> {
        let f = &self.formatter;
        let bold = Format::new().set_bold();
        let title = Format::new().set_bold().set_font_size(14);
        let amount = Format::new().set_num_format(amount_format(ctx.currency()));
        let register = &ctx.register;
        let totals = &ctx.totals;

        sheet.set_name("Arqueo")?;
        for col in 0..5 {
            sheet.set_column_width(col, 22)?;
        }
        sheet.set_column_width(2, 36)?;

        let mut row = 0;
        if let Some(bytes) = self.logo.get() {
            match Image::new_from_buffer(bytes) {
                Ok(image) => {
                    sheet.insert_image(0, 0, &image)?;
                    row = LOGO_ROWS;
                }
                Err(e) => tracing::warn!(error = %e, "statement logo is not a supported image"),
            }
        }

        sheet.write_string_with_format(row, 0, "Cash register statement", &title)?;
        row += 2;

        let header = [
            ("Shop", ctx.shop.name.clone()),
            ("Currency", ctx.currency().to_string()),
            ("Opened", f.date_time(register.opened_at)),
            (
                "Opened by",
                register.opened_by_name.clone().unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Closed",
                register
                    .closed_at
                    .map_or_else(|| "-".to_string(), |at| f.date_time(at)),
            ),
            (
                "Status",
                ctx.difference_status
                    .map_or("-", |s| s.label())
                    .to_string(),
            ),
        ];
        for (label, value) in &header {
            sheet.write_string_with_format(row, 0, *label, &bold)?;
            sheet.write_string(row, 1, value)?;
            row += 1;
        }
        if let Some(notes) = register.closing_notes.as_deref() {
            sheet.write_string_with_format(row, 0, "Notes", &bold)?;
            sheet.write_string(row, 1, notes)?;
            row += 1;
        }
        row += 1;

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
        for (label, value) in summary {
            sheet.write_string_with_format(row, 0, label, &bold)?;
            match value {
                Some(v) => sheet.write_number_with_format(row, 1, number(v), &amount)?,
                None => sheet.write_string(row, 1, "-")?,
            };
            row += 1;
        }
        row += 1;

        for (col, heading) in (0_u16..).zip(["Date", "Type", "Reference", "Amount", "Balance"]) {
            sheet.write_string_with_format(row, col, heading, &bold)?;
        }
        row += 1;

        for line in &ctx.lines {
            sheet.write_string(row, 0, f.date_time(line.created_at))?;
            sheet.write_string(row, 1, line.movement_type.label())?;
            sheet.write_string(row, 2, &line.reference)?;
            sheet.write_number_with_format(row, 3, number(line.signed_amount), &amount)?;
            sheet.write_number_with_format(row, 4, number(line.running_balance), &amount)?;
            row += 1;
        }

        Ok(())
    }
}

impl StatementRenderer for ExcelRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Excel
    }

    fn render(&self, ctx: &StatementContext) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        self.write_sheet(sheet, ctx)?;
        Ok(workbook.save_to_buffer()?)
    }
}
