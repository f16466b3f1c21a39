use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

use crate::service::finance::{FinanceServiceError, ProviderEvent};
use crate::service::numeric::to_float_or_none;

/// Longest gap between a fiscal quarter's end and its announcement.
const REPORTING_WINDOW_DAYS: i64 = 100;

/// Resolve the next earnings event from a quoteSummary response carrying the
/// `calendarEvents` and `earningsHistory` modules.
///
/// Picks the earliest announced date on or after `today`. When every date is
/// already past, the most recent one is returned and the caller decides
/// whether it is stale. Reported EPS and surprise are only attached when the
/// chosen date is not in the future and a history entry's quarter closed
/// within one reporting window before it.
pub fn next_event_from_summary(
    symbol: &str,
    data: &Value,
    today: NaiveDate,
) -> Result<Option<ProviderEvent>, FinanceServiceError> {
    let summary = data
        .get("quoteSummary")
        .ok_or_else(|| FinanceServiceError::Malformed("missing quoteSummary".into()))?;

    if let Some(err) = summary.get("error").filter(|e| !e.is_null()) {
        let code = err.get("code").and_then(|c| c.as_str()).unwrap_or("");
        let description = err
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("unknown error")
            .to_string();
        if code.eq_ignore_ascii_case("not found") {
            debug!("{}: {}", symbol, description);
            return Err(FinanceServiceError::NotFound(symbol.to_string()));
        }
        return Err(FinanceServiceError::Malformed(description));
    }

    let Some(result) = summary
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|arr| arr.first())
    else {
        return Ok(None);
    };

    let earnings = result
        .get("calendarEvents")
        .and_then(|c| c.get("earnings"));

    let mut dates: Vec<NaiveDate> = earnings
        .and_then(|e| e.get("earningsDate"))
        .and_then(|d| d.as_array())
        .map(|arr| arr.iter().filter_map(parse_date).collect())
        .unwrap_or_default();

    if dates.is_empty() {
        debug!("calendarEvents carried no earnings dates");
        return Ok(None);
    }
    dates.sort();

    let date = match dates.iter().find(|d| **d >= today) {
        Some(upcoming) => *upcoming,
        None => dates[dates.len() - 1],
    };

    let mut event = ProviderEvent::new(date);
    event.eps_estimate = earnings
        .and_then(|e| e.get("earningsAverage"))
        .cloned()
        .unwrap_or(Value::Null);

    if date <= today {
        if let Some(reported) = history_entry_reported_on(result, date) {
            event.eps_actual = reported.get("epsActual").cloned().unwrap_or(Value::Null);
            // Yahoo reports surprise as a fraction; the sheet expects percent.
            event.surprise_pct = reported
                .get("surprisePercent")
                .and_then(to_float_or_none)
                .map(|fraction| Value::from(fraction * 100.0))
                .unwrap_or(Value::Null);
        }
    }

    Ok(Some(event))
}

/// Accepts `{"raw": <epoch seconds>, "fmt": "YYYY-MM-DD"}`, a bare epoch or a
/// bare date string.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.get("raw").unwrap_or(value);
    if let Some(ts) = raw.as_i64().or_else(|| raw.as_f64().map(|f| f as i64)) {
        if let Some(dt) = DateTime::<Utc>::from_timestamp(ts, 0) {
            return Some(dt.date_naive());
        }
    }

    value
        .get("fmt")
        .and_then(|f| f.as_str())
        .or_else(|| value.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

/// Newest history entry whose quarter closed before `date` and no more than
/// one reporting window earlier. Entries without a readable quarter never match.
fn history_entry_reported_on(result: &Value, date: NaiveDate) -> Option<&Value> {
    let history = result
        .get("earningsHistory")
        .and_then(|h| h.get("history"))
        .and_then(|h| h.as_array())?;
    let earliest = date - Duration::days(REPORTING_WINDOW_DAYS);

    history
        .iter()
        .filter(|entry| entry.get("epsActual").is_some())
        .filter_map(|entry| {
            let quarter_end = entry.get("quarter").and_then(parse_date)?;
            (quarter_end < date && quarter_end >= earliest).then_some((quarter_end, entry))
        })
        .max_by_key(|(quarter_end, _)| *quarter_end)
        .map(|(_, entry)| entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn epoch(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp()
    }

    fn summary(dates: &[NaiveDate]) -> Value {
        let earnings_date: Vec<Value> = dates
            .iter()
            .map(|d| json!({ "raw": epoch(*d), "fmt": d.format("%Y-%m-%d").to_string() }))
            .collect();
        json!({
            "quoteSummary": {
                "result": [{
                    "calendarEvents": {
                        "earnings": {
                            "earningsDate": earnings_date,
                            "earningsAverage": { "raw": 2.35, "fmt": "2.35" }
                        }
                    },
                    "earningsHistory": {
                        "history": [
                            {
                                "epsActual": { "raw": 1.52 },
                                "surprisePercent": { "raw": 0.031 },
                                "quarter": { "raw": epoch(day(2026, 3, 31)) }
                            },
                            {
                                "epsActual": { "raw": 1.64 },
                                "surprisePercent": { "raw": 0.05 },
                                "quarter": { "raw": epoch(day(2026, 6, 30)) }
                            }
                        ]
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn picks_earliest_upcoming_date() {
        let today = day(2026, 10, 17);
        let data = summary(&[day(2026, 11, 2), day(2026, 10, 29)]);

        let event = next_event_from_summary("AAPL", &data, today).unwrap().unwrap();
        assert_eq!(event.date, day(2026, 10, 29));
        assert_eq!(event.eps_estimate, json!({ "raw": 2.35, "fmt": "2.35" }));
        assert!(event.eps_actual.is_null());
        assert!(event.surprise_pct.is_null());
    }

    #[test]
    fn past_date_carries_actuals_for_the_reported_quarter() {
        let today = day(2026, 10, 17);
        let data = summary(&[day(2026, 7, 30)]);

        let event = next_event_from_summary("AAPL", &data, today).unwrap().unwrap();
        assert_eq!(event.date, day(2026, 7, 30));
        assert_eq!(event.eps_actual, json!({ "raw": 1.64 }));
        let surprise = event.surprise_pct.as_f64().unwrap();
        assert!((surprise - 5.0).abs() < 1e-9);
    }

    #[test]
    fn stale_date_ignores_later_quarters() {
        let today = day(2026, 10, 17);
        let data = summary(&[day(2025, 11, 3)]);

        let event = next_event_from_summary("AAPL", &data, today).unwrap().unwrap();
        assert_eq!(event.date, day(2025, 11, 3));
        assert!(event.eps_actual.is_null());
        assert!(event.surprise_pct.is_null());
    }

    #[test]
    fn report_day_without_new_quarter_has_no_actuals() {
        // Latest history is Q2; today's report is for Q3 and not in yet.
        let today = day(2026, 10, 17);
        let data = summary(&[today]);

        let event = next_event_from_summary("AAPL", &data, today).unwrap().unwrap();
        assert_eq!(event.date, today);
        assert!(event.eps_actual.is_null());
        assert!(event.surprise_pct.is_null());
    }

    #[test]
    fn report_day_picks_up_the_just_closed_quarter() {
        let today = day(2026, 10, 17);
        let mut data = summary(&[today]);
        data["quoteSummary"]["result"][0]["earningsHistory"]["history"]
            .as_array_mut()
            .unwrap()
            .push(json!({
                "epsActual": { "raw": 1.71 },
                "surprisePercent": { "raw": -0.02 },
                "quarter": { "raw": epoch(day(2026, 9, 30)) }
            }));

        let event = next_event_from_summary("AAPL", &data, today).unwrap().unwrap();
        assert_eq!(event.eps_actual, json!({ "raw": 1.71 }));
        let surprise = event.surprise_pct.as_f64().unwrap();
        assert!((surprise + 2.0).abs() < 1e-9);
    }

    #[test]
    fn history_without_quarter_is_never_attached() {
        let today = day(2026, 10, 17);
        let mut data = summary(&[day(2026, 7, 30)]);
        data["quoteSummary"]["result"][0]["earningsHistory"] =
            json!({ "history": [{ "epsActual": { "raw": 9.99 } }] });

        let event = next_event_from_summary("AAPL", &data, today).unwrap().unwrap();
        assert!(event.eps_actual.is_null());
    }

    #[test]
    fn falls_back_to_fmt_when_raw_missing() {
        let data = json!({
            "quoteSummary": {
                "result": [{
                    "calendarEvents": { "earnings": { "earningsDate": [{ "fmt": "2026-12-01" }] } }
                }]
            }
        });

        let event = next_event_from_summary("AAPL", &data, day(2026, 10, 17))
            .unwrap()
            .unwrap();
        assert_eq!(event.date, day(2026, 12, 1));
        assert!(event.eps_estimate.is_null());
    }

    #[test]
    fn no_dates_is_not_found_signal() {
        let data = json!({
            "quoteSummary": {
                "result": [{ "calendarEvents": { "earnings": { "earningsDate": [] } } }]
            }
        });
        assert!(next_event_from_summary("AAPL", &data, day(2026, 10, 17))
            .unwrap()
            .is_none());

        let empty = json!({ "quoteSummary": { "result": [], "error": null } });
        assert!(next_event_from_summary("AAPL", &empty, day(2026, 10, 17))
            .unwrap()
            .is_none());
    }

    #[test]
    fn provider_error_object_is_an_error() {
        let data = json!({
            "quoteSummary": {
                "result": null,
                "error": { "code": "Not Found", "description": "Quote not found for symbol: ZZZZ" }
            }
        });
        let err = next_event_from_summary("ZZZZ", &data, day(2026, 10, 17)).unwrap_err();
        assert_eq!(err.kind(), "NotFound");
        assert_eq!(err.to_string(), "No quote summary for symbol ZZZZ");

        let err = next_event_from_summary("AAPL", &json!({ "finance": {} }), day(2026, 10, 17))
            .unwrap_err();
        assert_eq!(err.kind(), "MalformedResponse");
    }
}
