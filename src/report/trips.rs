//! Trip Destination Trends: trips per continent per quarter.

use super::{quarter_counts, sql, template_for, QuarterlyReport};
use crate::db::DatabaseClient;
use crate::error::Result;
use crate::quarter::{merge_results, QuarterTemplate};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

const TITLE: &str = "Trip Destination Trends";

const DESCRIPTION: &str = "For each quarter and continent, the number shown is the number of trips \
     to that continent that ended during that quarter. Q1 is January through March, \
     Q2 is April through June, and so on.";

/// Counts trips by continent and by the quarter in which they ended.
///
/// Every continent with at least one trip gets a series, even if none of its
/// trips has an end date. Trips without a destination are not counted.
pub async fn trip_report(
    db: &dyn DatabaseClient,
    generated_on: NaiveDate,
) -> Result<QuarterlyReport> {
    let Some((cutoffs, template)) = template_for(db, &[("trip", "trip_end")]).await? else {
        info!("No dated trips found");
        return Ok(QuarterlyReport::new(
            TITLE,
            DESCRIPTION,
            "Number of Trips",
            &QuarterTemplate::default(),
            generated_on,
        ));
    };

    let continents: Vec<String> = db
        .execute_query(sql::CONTINENTS_QUERY)
        .await?
        .rows
        .iter()
        .filter_map(|row| row.first().and_then(|v| v.as_str()).map(String::from))
        .collect();
    debug!("Continents: {:?}", continents);

    let counts = db
        .execute_query(&sql::trip_counts_query(&cutoffs, &template))
        .await?;

    // (continent, label, count) rows grouped per continent, in continent order.
    let mut per_continent: Vec<(String, Vec<(String, i64)>)> = continents
        .into_iter()
        .map(|continent| (continent, Vec::new()))
        .collect();

    let labelled = quarter_counts(&counts, 1, 2)?;
    for (row, pair) in counts.rows.iter().zip(labelled) {
        let Some(continent) = row.first().and_then(|v| v.as_str()) else {
            warn!("Skipping {} trips in {} with no destination", pair.1, pair.0);
            continue;
        };

        match per_continent.iter().position(|(name, _)| name == continent) {
            Some(index) => per_continent[index].1.push(pair),
            None => per_continent.push((continent.to_string(), vec![pair])),
        }
    }

    let mut report = QuarterlyReport::new(TITLE, DESCRIPTION, "Number of Trips", &template, generated_on);
    for (continent, pairs) in per_continent {
        let filled = merge_results(&template, pairs)?;
        report.push_series(continent, filled);
    }

    Ok(report)
}
