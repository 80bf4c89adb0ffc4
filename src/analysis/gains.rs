//! Fan gain statistics derived from the historical table.

use chrono::NaiveDate;
use serde::Serialize;

use crate::table::HistoricalTable;

/// Parses a recorded fan count such as "1,234,567".
///
/// Commas and whitespace are ignored. Blank or unreadable values give `None`.
pub fn parse_fan_count(value: &str) -> Option<u64> {
    let digits: String = value
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Gains of one player over the recorded dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerGains {
    pub name: String,
    /// First date with a readable count
    pub first_date: String,
    /// Last date with a readable count
    pub last_date: String,
    pub latest_fans: u64,
    /// Fans gained between `first_date` and `last_date`
    pub total_gain: i64,
    /// `total_gain` per calendar day; 0 with a single data point
    pub average_daily_gain: f64,
    /// Change between the last two data points
    pub last_gain: Option<i64>,
}

/// Report for the whole club.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClubStats {
    pub total_players: usize,
    /// Latest date column in the table
    pub latest_date: Option<String>,
    /// Sum of all counts recorded on `latest_date`
    pub club_total: u64,
    /// Players with data, highest latest count first
    pub players: Vec<PlayerGains>,
}

impl ClubStats {
    pub fn from_table(table: &HistoricalTable) -> Self {
        let latest_date = table.dates().last().cloned();

        let club_total = latest_date
            .as_deref()
            .map(|date| {
                table
                    .players()
                    .filter_map(|name| table.value(name, date))
                    .filter_map(parse_fan_count)
                    .fold(0u64, u64::saturating_add)
            })
            .unwrap_or(0);

        let mut players: Vec<PlayerGains> = table
            .players()
            .filter_map(|name| player_gains(table, name))
            .collect();
        players.sort_by(|a, b| {
            b.latest_fans
                .cmp(&a.latest_fans)
                .then_with(|| a.name.cmp(&b.name))
        });

        ClubStats {
            total_players: table.len(),
            latest_date,
            club_total,
            players,
        }
    }
}

/// Readable data points of one player, in date column order.
pub fn player_points<'a>(table: &'a HistoricalTable, name: &str) -> Vec<(&'a str, u64)> {
    let Some(values) = table.row(name) else {
        return Vec::new();
    };
    table
        .dates()
        .iter()
        .zip(values)
        .filter_map(|(date, value)| parse_fan_count(value).map(|fans| (date.as_str(), fans)))
        .collect()
}

fn player_gains(table: &HistoricalTable, name: &str) -> Option<PlayerGains> {
    let points = player_points(table, name);
    let &(first_date, first_fans) = points.first()?;
    let &(last_date, latest_fans) = points.last()?;

    let total_gain = fan_difference(latest_fans, first_fans);
    let days = days_between(first_date, last_date);
    let average_daily_gain = if days > 0 {
        total_gain as f64 / days as f64
    } else {
        0.0
    };
    let last_gain = match points.as_slice() {
        [.., (_, before), (_, last)] => Some(fan_difference(*last, *before)),
        _ => None,
    };

    Some(PlayerGains {
        name: name.to_string(),
        first_date: first_date.to_string(),
        last_date: last_date.to_string(),
        latest_fans,
        total_gain,
        average_daily_gain,
        last_gain,
    })
}

/// `later - earlier`, clamped to the `i64` range.
fn fan_difference(later: u64, earlier: u64) -> i64 {
    let diff = i128::from(later) - i128::from(earlier);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

fn days_between(from: &str, to: &str) -> i64 {
    let parse = |d: &str| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok();
    match (parse(from), parse(to)) {
        (Some(from), Some(to)) => (to - from).num_days(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::NameFanPair;

    fn table() -> HistoricalTable {
        HistoricalTable::parse(
            "Player Name,2024-01-01,2024-01-02,2024-01-05\n\
             Kevin,500,650,\"1,100\"\n\
             Mia,300,,360\n\
             Zoe,,,\n\
             Ann,,42,\n",
        )
    }

    #[test]
    fn test_parse_fan_count() {
        assert_eq!(parse_fan_count("1,234,567"), Some(1_234_567));
        assert_eq!(parse_fan_count(" 1 234 "), Some(1234));
        assert_eq!(parse_fan_count(""), None);
        assert_eq!(parse_fan_count(","), None);
        assert_eq!(parse_fan_count("12a"), None);
    }

    #[test]
    fn test_player_points_skip_blanks() {
        let table = table();
        assert_eq!(
            player_points(&table, "Mia"),
            vec![("2024-01-01", 300), ("2024-01-05", 360)]
        );
        assert!(player_points(&table, "Zoe").is_empty());
        assert!(player_points(&table, "Nobody").is_empty());
    }

    #[test]
    fn test_club_stats() {
        let stats = ClubStats::from_table(&table());

        assert_eq!(stats.total_players, 4);
        assert_eq!(stats.latest_date.as_deref(), Some("2024-01-05"));
        assert_eq!(stats.club_total, 1460);

        let names: Vec<_> = stats.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Kevin", "Mia", "Ann"]);

        let kevin = &stats.players[0];
        assert_eq!(kevin.latest_fans, 1100);
        assert_eq!(kevin.total_gain, 600);
        assert!((kevin.average_daily_gain - 150.0).abs() < 1e-9);
        assert_eq!(kevin.last_gain, Some(450));

        let ann = &stats.players[2];
        assert_eq!(ann.first_date, "2024-01-02");
        assert_eq!(ann.total_gain, 0);
        assert_eq!(ann.average_daily_gain, 0.0);
        assert_eq!(ann.last_gain, None);
    }

    #[test]
    fn test_empty_table() {
        let stats = ClubStats::from_table(&HistoricalTable::new());
        assert_eq!(stats.latest_date, None);
        assert_eq!(stats.club_total, 0);
        assert!(stats.players.is_empty());
    }

    #[test]
    fn test_losing_fans_is_negative_gain() {
        let mut table = HistoricalTable::new();
        table
            .merge_snapshot("2024-01-01", &[NameFanPair::new("Kevin", "900")])
            .unwrap();
        table
            .merge_snapshot("2024-01-02", &[NameFanPair::new("Kevin", "850")])
            .unwrap();

        let stats = ClubStats::from_table(&table);
        assert_eq!(stats.players[0].total_gain, -50);
        assert_eq!(stats.players[0].last_gain, Some(-50));
    }

    #[test]
    fn test_counts_beyond_i64_range() {
        let table = HistoricalTable::parse(
            "Player Name,2024-01-01,2024-01-02\n\
             Kevin,9000000000000000000,12345678901234567890\n",
        );
        let stats = ClubStats::from_table(&table);
        let kevin = &stats.players[0];
        assert_eq!(kevin.latest_fans, 12_345_678_901_234_567_890);
        assert_eq!(kevin.total_gain, 3_345_678_901_234_567_890);
        assert_eq!(kevin.last_gain, Some(3_345_678_901_234_567_890));
        assert_eq!(stats.club_total, 12_345_678_901_234_567_890);

        let table = HistoricalTable::parse(
            "Player Name,2024-01-01,2024-01-02\n\
             Kevin,18000000000000000000,0\n\
             Mia,10000000000000000000,10000000000000000000\n",
        );
        let stats = ClubStats::from_table(&table);
        assert_eq!(stats.club_total, 10_000_000_000_000_000_000);
        let kevin = stats.players.iter().find(|p| p.name == "Kevin").unwrap();
        assert_eq!(kevin.total_gain, i64::MIN);
    }

    #[test]
    fn test_club_total_saturates() {
        let table = HistoricalTable::parse(
            "Player Name,2024-01-01\n\
             Kevin,10000000000000000000\n\
             Mia,10000000000000000000\n",
        );
        assert_eq!(ClubStats::from_table(&table).club_total, u64::MAX);
    }
}
