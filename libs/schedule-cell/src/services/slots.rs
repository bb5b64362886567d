// libs/schedule-cell/src/services/slots.rs
use chrono::NaiveTime;

use crate::models::TimeSlot;

pub const SLOT_INTERVAL_MINUTES: u32 = 30;
pub const SLOTS_PER_DAY: u32 = 24 * 60 / SLOT_INTERVAL_MINUTES;

/// The canonical slot grid for one calendar day: 48 slots at 30-minute
/// granularity, 00:00 through 23:30, in chronological order.
///
/// Pure function of no external state. It is recomputed on every call rather
/// than cached so the resolver and its error-fallback path always agree on
/// the grid.
pub fn day_slot_grid() -> Vec<TimeSlot> {
    (0..SLOTS_PER_DAY)
        .map(|i| {
            let minutes = i * SLOT_INTERVAL_MINUTES;
            let value = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap();
            TimeSlot {
                value,
                label: twelve_hour_label(value),
            }
        })
        .collect()
}

/// Human-readable 12-hour label, e.g. "12:00 AM", "1:30 PM".
fn twelve_hour_label(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn grid_has_48_slots_in_order() {
        let grid = day_slot_grid();
        assert_eq!(grid.len(), 48);

        assert_eq!(grid[0].value, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(grid[47].value, NaiveTime::from_hms_opt(23, 30, 0).unwrap());

        for pair in grid.windows(2) {
            assert!(pair[0].value < pair[1].value);
        }
    }

    #[test]
    fn grid_alternates_on_the_half_hour() {
        for slot in day_slot_grid() {
            assert!(slot.value.minute() == 0 || slot.value.minute() == 30);
            assert_eq!(slot.value.second(), 0);
        }
    }

    #[test]
    fn labels_use_twelve_hour_clock() {
        let grid = day_slot_grid();
        assert_eq!(grid[0].label, "12:00 AM"); // hour 0 wraps to 12
        assert_eq!(grid[1].label, "12:30 AM");
        assert_eq!(grid[18].label, "9:00 AM");
        assert_eq!(grid[24].label, "12:00 PM");
        assert_eq!(grid[27].label, "1:30 PM"); // hour 13 wraps to 1
        assert_eq!(grid[47].label, "11:30 PM");
    }

    #[test]
    fn grid_is_deterministic() {
        assert_eq!(day_slot_grid(), day_slot_grid());
    }
}
