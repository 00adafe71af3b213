use calgrid_core::cli::Action;
use calgrid_core::config::CalGridConfig;
use calgrid_core::date_only::DateOnly;
use calgrid_core::execute;
use calgrid_core::locale::LocaleTable;
use calgrid_core::navigator::{CalendarGridState, FixedClock, HostInputs, PickOutcome};
use serde_json::Value;
use tempfile::tempdir;

fn date(year: i32, month: u32, day: u32) -> DateOnly {
    DateOnly::from_ymd(year, month, day).expect("valid date")
}

#[test]
fn mount_navigate_and_pick_flow() {
    let mut state = CalendarGridState::init(
        HostInputs {
            min_date: Some(date(2024, 3, 10)),
            max_date: Some(date(2024, 4, 20)),
            display_year: Some(2024),
            display_month: Some(3),
            ..HostInputs::default()
        },
        &LocaleTable::en_us(),
        FixedClock(date(2024, 3, 15)),
    );

    let selectable: Vec<u32> = state
        .days()
        .iter()
        .filter(|cell| cell.is_current_month && cell.is_selectable)
        .map(|cell| cell.day_number)
        .collect();
    assert_eq!(selectable, (10..=31).collect::<Vec<_>>());

    let mut notified = 0;
    let early = *state.cell_for(date(2024, 3, 9)).expect("visible");
    assert_eq!(state.pick_day(&early, &mut || notified += 1), PickOutcome::Ignored);
    assert_eq!(notified, 0);

    let trailing = *state.cell_for(date(2024, 4, 3)).expect("visible");
    assert_eq!(
        state.pick_day(&trailing, &mut || notified += 1),
        PickOutcome::SelectedAndNavigated
    );
    assert_eq!(notified, 1);
    assert_eq!((state.display_year(), state.display_month()), (2024, 4));

    state.change_month_by(-1);
    assert_eq!(state.display_month(), 3);
    assert_eq!(state.selected_date(), Some(date(2024, 4, 3)));
    assert!(
        state
            .cell_for(date(2024, 4, 3))
            .is_some_and(|cell| cell.is_selected && !cell.is_current_month)
    );
}

#[test]
fn execute_reports_pick_as_json() {
    let inputs = HostInputs {
        display_year: Some(2024),
        display_month: Some(3),
        ..HostInputs::default()
    };
    let rendered = execute(
        inputs,
        &LocaleTable::en_us(),
        FixedClock(date(2024, 3, 15)),
        &Action::Pick {
            date: date(2024, 4, 3),
        },
    )
    .expect("pick succeeds");

    let value: Value = serde_json::from_str(&rendered).expect("valid json");
    assert_eq!(value["action"], "pick");
    assert_eq!(value["outcome"], "selected_and_navigated");
    assert_eq!(value["notifications"], 1);
    assert_eq!(value["state"]["displayMonth"], 4);
    assert_eq!(value["state"]["selectedDate"], "2024-04-03");
    assert_eq!(value["state"]["days"].as_array().map(Vec::len), Some(42));
    assert_eq!(value["state"]["months"][3]["fullName"], "April");
}

#[test]
fn execute_rejects_picks_outside_the_grid() {
    let inputs = HostInputs {
        display_year: Some(2024),
        display_month: Some(3),
        ..HostInputs::default()
    };
    let result = execute(
        inputs,
        &LocaleTable::en_us(),
        FixedClock(date(2024, 3, 15)),
        &Action::Pick {
            date: date(2024, 6, 1),
        },
    );

    assert!(result.is_err());
}

#[test]
fn config_file_drives_locale_and_week_start() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("calgrid.toml");
    std::fs::write(
        &path,
        r#"
[policies]
first_day_of_week = 1

[locale]
month_names = ["enero", "febrero", "marzo", "abril", "mayo", "junio",
               "julio", "agosto", "septiembre", "octubre", "noviembre", "diciembre"]
short_month_names = ["ene", "feb", "mar", "abr", "may", "jun",
                     "jul", "ago", "sept", "oct", "nov", "dic"]
day_names = ["domingo", "lunes", "martes", "miércoles", "jueves", "viernes", "sábado"]
first_day_of_week = 6
"#,
    )
    .expect("write config");

    let cfg = CalGridConfig::load(Some(&path)).expect("load config");
    let state = CalendarGridState::init(
        HostInputs {
            display_year: Some(2024),
            display_month: Some(3),
            first_day_of_week: cfg.policies.first_day_of_week,
            ..HostInputs::default()
        },
        &cfg.locale,
        FixedClock(date(2024, 3, 15)),
    );

    assert_eq!(state.first_day_of_week(), 1);
    let letters: Vec<&str> = state
        .days_of_week()
        .iter()
        .map(|day| day.first_letter.as_str())
        .collect();
    assert_eq!(letters, vec!["l", "m", "m", "j", "v", "s", "d"]);
    assert_eq!(state.months()[2].full_name, "marzo");
    assert_eq!(state.days()[0].date, date(2024, 2, 26));
}
