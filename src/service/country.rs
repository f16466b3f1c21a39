/// Exchange suffix to listing country. Suffixes are upper-case.
const SUFFIX_COUNTRIES: &[(&str, &str)] = &[
    ("L", "United Kingdom"),
    ("IL", "United Kingdom"),
    ("DE", "Germany"),
    ("F", "Germany"),
    ("PA", "France"),
    ("AS", "Netherlands"),
    ("BR", "Belgium"),
    ("MI", "Italy"),
    ("MC", "Spain"),
    ("LS", "Portugal"),
    ("SW", "Switzerland"),
    ("VI", "Austria"),
    ("IR", "Ireland"),
    ("ST", "Sweden"),
    ("OL", "Norway"),
    ("CO", "Denmark"),
    ("HE", "Finland"),
    ("WA", "Poland"),
    ("T", "Japan"),
    ("HK", "Hong Kong"),
    ("SS", "China"),
    ("SZ", "China"),
    ("KS", "South Korea"),
    ("KQ", "South Korea"),
    ("TW", "Taiwan"),
    ("TWO", "Taiwan"),
    ("SI", "Singapore"),
    ("NS", "India"),
    ("BO", "India"),
    ("AX", "Australia"),
    ("NZ", "New Zealand"),
    ("TO", "Canada"),
    ("V", "Canada"),
    ("NE", "Canada"),
    ("SA", "Brazil"),
    ("MX", "Mexico"),
    ("JO", "South Africa"),
    ("TA", "Israel"),
];

const DEFAULT_COUNTRY: &str = "United States";

/// Listing country inferred from the ticker's exchange suffix.
///
/// Unsuffixed tickers and unknown suffixes (share classes like `BRK.B`)
/// resolve to the United States; an empty ticker resolves to `""`.
pub fn country_for_ticker(ticker: &str) -> String {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return String::new();
    }

    let Some((_, suffix)) = ticker.rsplit_once('.') else {
        return DEFAULT_COUNTRY.to_string();
    };

    SUFFIX_COUNTRIES
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(suffix))
        .map(|(_, country)| *country)
        .unwrap_or(DEFAULT_COUNTRY)
        .to_string()
}
