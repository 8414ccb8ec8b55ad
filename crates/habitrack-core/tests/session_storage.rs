//! Integration tests for sessions backed by SQLite.

use chrono::{NaiveDate, NaiveDateTime};
use habitrack_core::{auth, demo};
use habitrack_core::{Database, Habit, HabitStore, HabitUpdate, Periodicity, Session, TrackingError};

fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

#[test]
fn test_seeded_demo_reloads_identically() {
    let mut db = Database::open_memory().unwrap();
    demo::seed(&mut db).unwrap();

    let session = Session::login(db, demo::DEMO_USER).unwrap();
    assert_eq!(
        session.habit_names(),
        vec![
            "plan_monthly",
            "restock_three_times_biweekly",
            "skin_care_daily",
            "sleep_daily",
            "climb_weekly"
        ]
    );
    assert_eq!(session.habits(), demo::example_habits().as_slice());
}

#[test]
fn test_session_writes_through_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("habitrack.db");

    {
        let mut db = Database::open_at(&path).unwrap();
        auth::register(&mut db, "ann", "secret").unwrap();
        let mut session = Session::login(db, "ann").unwrap();
        session
            .create_habit(Habit::new("stretch", Periodicity::Daily, at(1, 1, 7)))
            .unwrap();
        session.check_off("stretch", at(1, 1, 8), at(1, 3, 0)).unwrap();
        session.check_off("stretch", at(1, 2, 8), at(1, 3, 0)).unwrap();
        session
            .update_habit(
                "stretch",
                HabitUpdate {
                    required_checkoffs: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert!(auth::verify(&db, "ann", "secret").unwrap());
    let session = Session::login(db, "ann").unwrap();
    let habit = session.habit("stretch").unwrap();
    assert_eq!(habit.checkoffs(), &[at(1, 1, 8), at(1, 2, 8)]);
    assert_eq!(habit.required_checkoffs(), 2);
    assert_eq!(habit.longest_streak(), 0);
}

#[test]
fn test_delete_habit_and_account() {
    let mut db = Database::open_memory().unwrap();
    demo::seed(&mut db).unwrap();

    let mut session = Session::login(db, demo::DEMO_USER).unwrap();
    session.delete_habit("skin_care_daily").unwrap();
    let err = session.delete_habit("skin_care_daily").unwrap_err();
    assert!(matches!(err.as_tracking(), Some(TrackingError::NotFound { .. })));

    let mut db = session.logout();
    assert_eq!(db.load_habit_infos(demo::DEMO_USER).unwrap().len(), 4);
    assert!(db.load_checkoffs(demo::DEMO_USER, "skin_care_daily").unwrap().is_empty());

    auth::delete_account(&mut db, demo::DEMO_USER, demo::DEMO_PASSWORD).unwrap();
    assert!(db.load_habits(demo::DEMO_USER).unwrap().is_empty());
}

#[test]
fn test_checkoff_before_creation_is_not_stored() {
    let db = Database::open_memory().unwrap();
    let mut session = Session::login(db, "ann").unwrap();
    session
        .create_habit(Habit::new("stretch", Periodicity::Weekly, at(1, 10, 0)))
        .unwrap();
    let err = session.check_off("stretch", at(1, 9, 0), at(1, 11, 0)).unwrap_err();
    assert!(matches!(err.as_tracking(), Some(TrackingError::InvalidRange { .. })));

    let db = session.logout();
    assert!(db.load_checkoffs("ann", "stretch").unwrap().is_empty());
}
