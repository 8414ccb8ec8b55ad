//! Example tracking data for five habits spanning December 2023 and
//! January 2024.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::auth;
use crate::error::Result;
use crate::habit::Habit;
use crate::period::Periodicity;
use crate::storage::{HabitStore, UserStore};

pub const DEMO_USER: &str = "test_user";
pub const DEMO_PASSWORD: &str = "password";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid fixed date")
}

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    at(y, m, d, 0, 0)
}

fn with_checkoffs(mut habit: Habit, checkoffs: impl IntoIterator<Item = NaiveDateTime>) -> Habit {
    for checkoff in checkoffs {
        let added = habit
            .add_checkoff(checkoff)
            .expect("fixed checkoff after creation");
        debug_assert!(added, "repeated fixed checkoff {checkoff}");
    }
    habit
}

pub fn plan_monthly() -> Habit {
    with_checkoffs(
        Habit::new("plan_monthly", Periodicity::Monthly, day(2023, 12, 1)),
        [day(2023, 12, 21), day(2024, 1, 30)],
    )
}

pub fn restock_three_times_biweekly() -> Habit {
    with_checkoffs(
        Habit::new("restock_three_times_biweekly", Periodicity::Biweekly, day(2023, 12, 1))
            .with_description("restock 3 times in 2 weeks")
            .with_required_checkoffs(3),
        [
            at(2023, 12, 5, 12, 0),
            at(2023, 12, 7, 10, 0),
            at(2023, 12, 13, 11, 0),
            at(2023, 12, 27, 16, 15),
            at(2023, 12, 30, 13, 0),
            at(2024, 1, 5, 18, 15),
            day(2024, 1, 6),
            day(2024, 1, 20),
            day(2024, 1, 25),
        ],
    )
}

pub fn skin_care_daily() -> Habit {
    let days = [
        6, 9, 11, 13, 14, 16, 17, 18, 19, 20, 21, 23, 24, 25, 26, 28, 29, 30,
    ];
    with_checkoffs(
        Habit::new("skin_care_daily", Periodicity::Daily, day(2024, 1, 1)),
        days.map(|d| day(2024, 1, d)),
    )
}

pub fn sleep_daily() -> Habit {
    let days = [1, 4, 7, 12, 13, 14, 19, 20, 22, 26, 27];
    with_checkoffs(
        Habit::new("sleep_daily", Periodicity::Daily, at(2023, 12, 21, 15, 5)),
        days.map(|d| day(2024, 1, d)),
    )
}

pub fn climb_weekly() -> Habit {
    with_checkoffs(
        Habit::new("climb_weekly", Periodicity::Weekly, day(2023, 12, 1))
            .with_description("Go to climbing gym."),
        [
            day(2023, 12, 6),
            day(2023, 12, 14),
            day(2023, 12, 22),
            day(2024, 1, 14),
            day(2024, 1, 18),
            day(2024, 1, 24),
        ],
    )
}

/// All example habits in their canonical order.
pub fn example_habits() -> Vec<Habit> {
    vec![
        plan_monthly(),
        restock_three_times_biweekly(),
        skin_care_daily(),
        sleep_daily(),
        climb_weekly(),
    ]
}

/// Reset the demo account and load the example habits into `store`.
pub fn seed<S: HabitStore + UserStore>(store: &mut S) -> Result<Vec<String>> {
    if auth::verify(store, DEMO_USER, DEMO_PASSWORD)? {
        auth::delete_account(store, DEMO_USER, DEMO_PASSWORD)?;
    }
    auth::register(store, DEMO_USER, DEMO_PASSWORD)?;

    let mut names = Vec::new();
    for habit in example_habits() {
        store.save_habit_with_checkoffs(DEMO_USER, &habit)?;
        names.push(habit.name().to_string());
    }
    info!(user = DEMO_USER, habits = names.len(), "seeded demo data");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn every_checkoff_is_kept() {
        let counts: Vec<usize> = example_habits().iter().map(|h| h.checkoffs().len()).collect();
        assert_eq!(counts, vec![2, 9, 18, 11, 6]);
    }

    #[test]
    #[should_panic(expected = "fixed checkoff after creation")]
    fn checkoff_before_creation_is_not_dropped() {
        with_checkoffs(
            Habit::new("late", Periodicity::Daily, day(2024, 1, 2)),
            [day(2024, 1, 1)],
        );
    }

    #[test]
    #[should_panic(expected = "valid fixed date")]
    fn impossible_date_is_not_replaced() {
        day(2024, 2, 30);
    }

    #[test]
    fn seed_is_repeatable() {
        let mut store = MemoryStore::new();
        seed(&mut store).unwrap();
        let names = seed(&mut store).unwrap();
        assert_eq!(names.len(), 5);
        let habits = store.load_habits(DEMO_USER).unwrap();
        assert_eq!(habits, example_habits());
        assert!(auth::verify(&store, DEMO_USER, DEMO_PASSWORD).unwrap());
    }

    #[test]
    fn seed_fails_when_demo_user_has_other_password() {
        let mut store = MemoryStore::new();
        auth::register(&mut store, DEMO_USER, "changed").unwrap();
        assert!(seed(&mut store).is_err());
    }
}
