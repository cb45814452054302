//! Season labelling and in-season classification.
//!
//! Domestic-league clubs play a single calendar-year season ("2026"); every other
//! club plays a season that straddles two years ("25/26") and is still current
//! until the end of May of its second year.

use chrono::{Datelike, NaiveDate};

use crate::display::PLACEHOLDER;

/// Club names exactly as the backend reports them.
pub const DOMESTIC_TEAM_NAMES: [&str; 30] = [
    "Atlanta United",
    "Austin FC",
    "CF Montreal",
    "Charlotte FC",
    "Chicago Fire FC",
    "Colorado Rapids",
    "Columbus Crew",
    "DC United",
    "FC Cincinnati",
    "FC Dallas",
    "Houston Dynamo FC",
    "Inter Miami CF",
    "LA Galaxy",
    "Los Angeles FC",
    "Minnesota United",
    "Nashville SC",
    "New England Revolution",
    "New York City FC",
    "New York Red Bulls",
    "Orlando City SC",
    "Philadelphia Union",
    "Portland Timbers",
    "Real Salt Lake",
    "San Diego FC",
    "San Jose Earthquakes",
    "Seattle Sounders FC",
    "Sporting Kansas City",
    "St. Louis City SC",
    "Toronto FC",
    "Vancouver Whitecaps FC",
];

// Cross-year seasons stay current through May.
const CARRYOVER_LAST_MONTH: u32 = 5;

pub fn is_domestic_team(team_name: Option<&str>) -> bool {
    team_name.is_some_and(|name| DOMESTIC_TEAM_NAMES.contains(&name))
}

pub fn format_season_year(season_year: Option<i32>, team_name: Option<&str>) -> String {
    let year = match season_year {
        Some(year) if year != 0 => year,
        _ => return PLACEHOLDER.to_string(),
    };

    if is_domestic_team(team_name) {
        return year.to_string();
    }

    format!("{}/{}", two_digit(year), two_digit(year + 1))
}

pub fn is_in_season(season_year: Option<i32>, team_name: Option<&str>, today: NaiveDate) -> bool {
    let Some(year) = season_year else {
        return false;
    };
    let current = today.year();

    if is_domestic_team(team_name) {
        return year == current;
    }

    year == current || (year == current - 1 && today.month() <= CARRYOVER_LAST_MONTH)
}

fn two_digit(year: i32) -> String {
    let text = year.to_string();
    let start = text.len().saturating_sub(2);
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn domestic_seasons_format_as_single_year() {
        assert_eq!(format_season_year(Some(2026), Some("Atlanta United")), "2026");
    }

    #[test]
    fn other_seasons_format_as_year_pair() {
        assert_eq!(format_season_year(Some(2025), Some("Real Madrid")), "25/26");
        assert_eq!(format_season_year(Some(1999), None), "99/00");
    }

    #[test]
    fn missing_year_formats_as_placeholder() {
        assert_eq!(format_season_year(None, Some("LA Galaxy")), PLACEHOLDER);
        assert_eq!(format_season_year(Some(0), Some("LA Galaxy")), PLACEHOLDER);
    }

    #[test]
    fn cross_year_season_carries_over_until_june() {
        assert!(is_in_season(Some(2025), Some("Real Madrid"), day(2026, 4, 15)));
        assert!(is_in_season(Some(2025), Some("Real Madrid"), day(2026, 5, 31)));
        assert!(!is_in_season(Some(2025), Some("Real Madrid"), day(2026, 6, 1)));
        assert!(!is_in_season(Some(2025), Some("Real Madrid"), day(2026, 7, 10)));
        assert!(is_in_season(Some(2026), Some("Real Madrid"), day(2026, 7, 10)));
    }

    #[test]
    fn domestic_season_is_calendar_year_only() {
        assert!(is_in_season(Some(2026), Some("LA Galaxy"), day(2026, 4, 15)));
        assert!(!is_in_season(Some(2025), Some("LA Galaxy"), day(2026, 4, 15)));
    }

    #[test]
    fn missing_year_is_never_in_season() {
        assert!(!is_in_season(None, Some("Real Madrid"), day(2026, 4, 15)));
    }
}
