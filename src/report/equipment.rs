//! Equipment Sales Trends: ordered vs rented items per quarter.

use super::{quarter_counts, sql, template_for, QuarterlyReport};
use crate::db::DatabaseClient;
use crate::error::Result;
use crate::quarter::{merge_results, QuarterTemplate};
use chrono::NaiveDate;
use tracing::info;

const TITLE: &str = "Equipment Sales Trends";

const DESCRIPTION: &str = "For each quarter, the numbers shown are the number of ordered and rented \
     items during that quarter. Q1 is January through March, Q2 is April through June, and so on.";

/// Counts ordered item quantities and rented items per quarter.
///
/// Both series share one template spanning order and rental dates, so the
/// quarters line up for side-by-side comparison.
pub async fn equipment_report(
    db: &dyn DatabaseClient,
    generated_on: NaiveDate,
) -> Result<QuarterlyReport> {
    let sources = [("orders", "order_date"), ("rental", "rental_date")];
    let Some((cutoffs, template)) = template_for(db, &sources).await? else {
        info!("No dated orders or rentals found");
        return Ok(QuarterlyReport::new(
            TITLE,
            DESCRIPTION,
            "Number of Items Rented/Ordered",
            &QuarterTemplate::default(),
            generated_on,
        ));
    };

    let orders = db
        .execute_query(&sql::order_counts_query(&cutoffs, &template))
        .await?;
    let rentals = db
        .execute_query(&sql::rental_counts_query(&cutoffs, &template))
        .await?;

    let mut report = QuarterlyReport::new(
        TITLE,
        DESCRIPTION,
        "Number of Items Rented/Ordered",
        &template,
        generated_on,
    );
    report.push_series("order", merge_results(&template, quarter_counts(&orders, 0, 1)?)?);
    report.push_series("rental", merge_results(&template, quarter_counts(&rentals, 0, 1)?)?);

    Ok(report)
}
