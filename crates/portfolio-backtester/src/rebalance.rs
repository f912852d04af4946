use chrono::{DateTime, Datelike, Utc};
use core_types::RebalanceFrequency;

/// The dates on which weights are reset: the first date overall for `None`,
/// otherwise the first available date of each ISO week or calendar month.
///
/// `dates` must be sorted ascending. The first date is always included.
pub fn rebalance_dates(dates: &[DateTime<Utc>], frequency: RebalanceFrequency) -> Vec<DateTime<Utc>> {
    rebalance_indices(dates, frequency).into_iter().map(|i| dates[i]).collect()
}

/// Positions in `dates` of [`rebalance_dates`].
pub fn rebalance_indices(dates: &[DateTime<Utc>], frequency: RebalanceFrequency) -> Vec<usize> {
    if dates.is_empty() {
        return Vec::new();
    }
    let bucket = |d: &DateTime<Utc>| -> (i32, u32) {
        match frequency {
            RebalanceFrequency::None => (0, 0),
            RebalanceFrequency::Weekly => {
                let week = d.iso_week();
                (week.year(), week.week())
            }
            RebalanceFrequency::Monthly => (d.year(), d.month()),
        }
    };

    let mut indices = vec![0];
    for i in 1..dates.len() {
        if bucket(&dates[i]) != bucket(&dates[i - 1]) {
            indices.push(i);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn business_days(from: (i32, u32, u32), n: usize) -> Vec<DateTime<Utc>> {
        let mut day = Utc.with_ymd_and_hms(from.0, from.1, from.2, 0, 0, 0).unwrap();
        let mut out = Vec::new();
        while out.len() < n {
            if day.weekday().number_from_monday() <= 5 {
                out.push(day);
            }
            day += Duration::days(1);
        }
        out
    }

    #[test]
    fn none_keeps_only_first_date() {
        let dates = business_days((2024, 1, 2), 50);
        assert_eq!(rebalance_dates(&dates, RebalanceFrequency::None), vec![dates[0]]);
    }

    #[test]
    fn monthly_picks_first_trading_day_of_each_month() {
        let dates = business_days((2024, 1, 15), 60);
        let picks = rebalance_dates(&dates, RebalanceFrequency::Monthly);
        assert_eq!(picks[0], dates[0]);
        assert_eq!(picks[1], Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(picks[2], Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        // 2024-04-01 is a Monday.
        assert_eq!(picks[3], Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn weekly_picks_mondays_after_the_first_date() {
        // 2024-01-03 is a Wednesday.
        let dates = business_days((2024, 1, 3), 15);
        let picks = rebalance_dates(&dates, RebalanceFrequency::Weekly);
        assert_eq!(picks.len(), 4);
        assert!(picks[1..].iter().all(|d| d.weekday() == chrono::Weekday::Mon));
    }
}
