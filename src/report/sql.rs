//! SQL text for the fixed reports.
//!
//! Quarter buckets are computed in the database with a generated
//! `CASE WHEN <date> <= '<cutoff>' THEN '<label>' ... ELSE '<last>' END`
//! expression built from the cutoff list and template.

use crate::quarter::QuarterTemplate;
use chrono::NaiveDate;

/// Expression extracting the continent (text after the final `", "`) from
/// `trip.destination`.
pub const CONTINENT_EXPR: &str = "SUBSTRING_INDEX(trip.destination, ', ', -1)";

/// Distinct continents that have trips, alphabetically.
pub const CONTINENTS_QUERY: &str = "SELECT DISTINCT SUBSTRING_INDEX(trip.destination, ', ', -1) AS continent \
     FROM trip ORDER BY continent";

/// Builds the quarter-bucketing expression for `column`.
///
/// Each cutoff becomes an inclusive `WHEN` bound for the matching template
/// quarter; dates past every cutoff fall through to the final quarter. A
/// single-quarter template yields a plain label literal.
pub fn quarter_case(column: &str, cutoffs: &[NaiveDate], template: &QuarterTemplate) -> String {
    let Some(last) = template.quarters().last() else {
        return "NULL".to_string();
    };

    if cutoffs.is_empty() {
        return format!("'{last}'");
    }

    let whens: String = cutoffs
        .iter()
        .zip(template.quarters())
        .map(|(cutoff, quarter)| format!("WHEN {column} <= '{cutoff}' THEN '{quarter}' "))
        .collect();

    format!("CASE {whens}ELSE '{last}' END")
}

/// Oldest non-null value of a date column.
pub fn earliest_date_query(table: &str, column: &str) -> String {
    format!("SELECT {column} FROM {table} WHERE {column} IS NOT NULL ORDER BY {column} LIMIT 1")
}

/// Newest non-null value of a date column.
pub fn latest_date_query(table: &str, column: &str) -> String {
    format!(
        "SELECT {column} FROM {table} WHERE {column} IS NOT NULL ORDER BY {column} DESC LIMIT 1"
    )
}

/// Trips per continent per quarter of `trip_end`.
pub fn trip_counts_query(cutoffs: &[NaiveDate], template: &QuarterTemplate) -> String {
    let quarter = quarter_case("trip.trip_end", cutoffs, template);
    format!(
        "SELECT {CONTINENT_EXPR} AS continent, {quarter} AS quarter, COUNT(*) AS trips \
         FROM trip WHERE trip.trip_end IS NOT NULL \
         GROUP BY continent, quarter ORDER BY continent, quarter"
    )
}

/// Ordered item quantities per quarter of `order_date`.
pub fn order_counts_query(cutoffs: &[NaiveDate], template: &QuarterTemplate) -> String {
    let quarter = quarter_case("orders.order_date", cutoffs, template);
    format!(
        "SELECT {quarter} AS quarter, CAST(COALESCE(SUM(order_item.quantity), 0) AS SIGNED) AS items \
         FROM order_item INNER JOIN orders ON orders.order_id = order_item.order_id \
         WHERE orders.order_date IS NOT NULL \
         GROUP BY quarter ORDER BY quarter"
    )
}

/// Rented items per quarter of `rental_date`.
pub fn rental_counts_query(cutoffs: &[NaiveDate], template: &QuarterTemplate) -> String {
    let quarter = quarter_case("rental.rental_date", cutoffs, template);
    format!(
        "SELECT {quarter} AS quarter, COUNT(rental_history.id) AS items \
         FROM rental_history INNER JOIN rental ON rental.rental_id = rental_history.rental_id \
         WHERE rental.rental_date IS NOT NULL \
         GROUP BY quarter ORDER BY quarter"
    )
}

/// Rental equipment in circulation longer than `review_months`, newest first.
///
/// Columns: current rental id (nullable), initial use date, product name,
/// whole years in use, and remaining months.
pub fn inventory_age_query(review_months: u32) -> String {
    format!(
        "SELECT ri.rental_id, ri.initial_use, oi.name, \
         TIMESTAMPDIFF(YEAR, ri.initial_use, CURDATE()) AS years_in_use, \
         TIMESTAMPDIFF(MONTH, ri.initial_use, CURDATE()) % 12 AS months_in_use \
         FROM rental_inventory ri INNER JOIN order_inventory oi ON ri.product_code = oi.product_code \
         WHERE ri.initial_use < CURDATE() - INTERVAL {review_months} MONTH \
         ORDER BY ri.initial_use DESC"
    )
}

/// Quotes a MySQL identifier with backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Every row of a table.
pub fn select_all_query(table: &str) -> String {
    format!("SELECT * FROM {}", quote_identifier(table))
}
