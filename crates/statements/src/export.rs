//! CSV export of a statement report.

use thiserror::Error;

use crate::report::{company_label, StatementReport};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Render the report as CSV: one row per invoice, then totals.
pub fn render_csv(report: &StatementReport) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["Invoice No", "Date", "Company", "Phone", "Total Amount"])?;
    for row in &report.rows {
        writer.write_record([
            row.number.as_str(),
            &row.created_at.format("%Y-%m-%d").to_string(),
            &company_label(row.company.as_deref()),
            row.phone.as_str(),
            &format!("{:.2}", row.total),
        ])?;
    }

    writer.write_record([""; 5])?;
    writer.write_record(["TOTAL INVOICES", &report.invoice_count.to_string(), "", "", ""])?;
    writer.write_record([
        "TOTAL AMOUNT",
        &format!("{:.2}", report.total_amount),
        "",
        "",
        "",
    ])?;

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::StatementScope;
    use crate::report::InvoiceSummary;

    #[test]
    fn csv_has_header_rows_and_totals() {
        let range = StatementScope::Year { year: 2024 }.resolve().unwrap();
        let report = StatementReport::build(
            range,
            vec![InvoiceSummary {
                number: "INV-010824-00001".to_string(),
                created_at: chrono::NaiveDate::from_ymd_opt(2024, 8, 1)
                    .unwrap()
                    .and_time(chrono::NaiveTime::MIN)
                    .and_utc(),
                company: None,
                phone: "9848000001".to_string(),
                total: "99.99".parse().unwrap(),
            }],
        );

        let csv = render_csv(&report).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Invoice No,Date,Company,Phone,Total Amount");
        assert_eq!(lines[1], "INV-010824-00001,2024-08-01,(No Company),9848000001,99.99");
        assert!(lines.iter().any(|l| l.starts_with("TOTAL INVOICES,1")));
        assert!(lines.iter().any(|l| l.starts_with("TOTAL AMOUNT,99.99")));
    }
}
