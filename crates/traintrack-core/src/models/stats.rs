use serde::Serialize;

use super::Athlete;

/// Header figures for the athlete list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    /// Athletes whose last-visit label equals the today label.
    pub today: usize,
    /// Mean attendance percentage, rounded half away from zero. 0 when
    /// there are no athletes.
    pub average: u8,
}

impl AttendanceStats {
    pub fn compute(athletes: &[Athlete], today_label: &str) -> Self {
        let total = athletes.len();
        if total == 0 {
            return Self::default();
        }

        let today = athletes.iter().filter(|a| a.visited_today(today_label)).count();
        let sum: u64 = athletes.iter().map(|a| u64::from(a.attendance.percent())).sum();
        let average = (sum as f64 / total as f64).round() as u8;

        Self {
            total,
            today,
            average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AthleteStatus, Attendance};

    fn athlete(id: i64, attendance: u8, last_visit: &str) -> Athlete {
        Athlete {
            id,
            name: format!("Athlete {}", id),
            group: "Boxers".into(),
            attendance: Attendance::new(attendance).unwrap(),
            status: AthleteStatus::Active,
            last_visit: last_visit.into(),
            checked: false,
        }
    }

    #[test]
    fn test_six_athlete_roster() {
        let athletes = vec![
            athlete(1, 95, "today"),
            athlete(2, 88, "yesterday"),
            athlete(3, 72, "3 days ago"),
            athlete(4, 91, "today"),
            athlete(5, 65, "5 days ago"),
            athlete(6, 98, "today"),
        ];
        let stats = AttendanceStats::compute(&athletes, "today");
        assert_eq!(stats.total, 6);
        assert_eq!(stats.today, 3);
        // 509 / 6 = 84.83
        assert_eq!(stats.average, 85);
    }

    #[test]
    fn test_half_rounds_up() {
        let athletes = vec![athlete(1, 50, ""), athlete(2, 51, "")];
        assert_eq!(AttendanceStats::compute(&athletes, "today").average, 51);
    }

    #[test]
    fn test_empty_roster() {
        assert_eq!(AttendanceStats::compute(&[], "today"), AttendanceStats::default());
    }

    #[test]
    fn test_today_label_is_exact() {
        let athletes = vec![athlete(1, 10, "Today"), athlete(2, 10, "today")];
        assert_eq!(AttendanceStats::compute(&athletes, "today").today, 1);
    }
}
