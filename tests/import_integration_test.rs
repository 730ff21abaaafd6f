use anyhow::Result;
use chrono::Weekday;
use freerooms::import::{ImportOptions, Importer};
use freerooms::rooms::{free_audiences, FreeAudienceFilter};
use freerooms::{Building, ImportError, JsonStorage, MemoryStorage, Period, WeekType};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use tempfile::tempdir;

fn vevent(summary: &str, start: &str, end: &str, interval: u32, location: &str) -> String {
    format!(
        "BEGIN:VEVENT\r\n\
SUMMARY:{summary}\r\n\
DTSTART:{start}\r\n\
DTEND:{end}\r\n\
RRULE:FREQ=WEEKLY;INTERVAL={interval};UNTIL=20220601T000000Z\r\n\
LOCATION:{location}\r\n\
DESCRIPTION:Иванов И. И.\r\n\
END:VEVENT\r\n"
    )
}

fn calendar(title: &str, events: &[String]) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//bmstu//schedule//RU\r\nX-WR-CALNAME:{}\r\n{}END:VCALENDAR\r\n",
        title,
        events.concat()
    )
}

/// ИУ9-62Б: weekly databases on Monday period 3, a biweekly pair on Tuesday
/// period 1, and several events the importer must drop.
fn iu9_calendar() -> String {
    calendar(
        "Расписание ИУ9-62Б",
        &[
            vevent("Базы данных", "20220207T090000Z", "20220207T103500Z", 1, "325л"),
            vevent("Операционные системы", "20220215T053000Z", "20220215T070500Z", 2, "104аю"),
            vevent("Компиляторы", "20220208T053000Z", "20220208T070500Z", 2, "739"),
            vevent("ВУЦ", "20220209T053000Z", "20220209T070500Z", 1, "501ю"),
            vevent("Консультация", "20220209T090000Z", "20220209T100000Z", 1, "501ю"),
            vevent("Семинар кафедры", "20220210T053000Z", "20220210T070500Z", 1, "каф. ИУ9"),
        ],
    )
}

fn write(dir: &Path, name: &str, content: &str) -> Result<()> {
    std::fs::write(dir.join(name), content)?;
    Ok(())
}

fn options() -> ImportOptions {
    ImportOptions::new(3).unwrap()
}

#[test]
fn test_import_file_builds_schedule() -> Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "ИУ9-62Б.ics", &iu9_calendar())?;

    let mut storage = MemoryStorage::new();
    let report = Importer::new(&mut storage, options())?
        .import_file(&temp_dir.path().join("ИУ9-62Б.ics"))?;

    assert_eq!(report.group, "ИУ9-62Б");
    assert_eq!(report.events_read, 6);
    assert_eq!(report.events_accepted, 4);
    assert_eq!(report.events_without_period, 1);
    assert_eq!(report.schedules_written, 4);

    let lesson_id = |name: &str| {
        storage.lessons.iter().find(|l| l.name == name).map(|l| l.id.clone()).unwrap()
    };

    // weekly class on Monday period 3 occupies both parities
    let databases: Vec<_> =
        storage.schedules.iter().filter(|s| s.lesson_id == lesson_id("Базы данных")).collect();
    assert_eq!(databases.len(), 2);
    assert!(databases.iter().all(|s| s.week_day == Weekday::Mon && s.period.get() == 3));
    assert_eq!(databases[0].start.format("%H:%M").to_string(), "12:00");

    // biweekly pair: compilers start a week earlier, so they take odd weeks
    let tuesday: Vec<_> =
        storage.schedules.iter().filter(|s| s.week_day == Weekday::Tue).collect();
    assert_eq!(tuesday.len(), 2);
    let odd = tuesday.iter().find(|s| s.week_type == WeekType::Odd).unwrap();
    let even = tuesday.iter().find(|s| s.week_type == WeekType::Even).unwrap();
    assert_eq!(odd.lesson_id, lesson_id("Компиляторы"));
    assert_eq!(even.lesson_id, lesson_id("Операционные системы"));

    let mut rooms: Vec<_> =
        storage.audiences.iter().map(|a| (a.label(), a.building, a.floor)).collect();
    rooms.sort();
    assert_eq!(
        rooms,
        vec![
            ("104аю".to_string(), Building::Gz, 1),
            ("325л".to_string(), Building::Ulk, 3),
            ("501ю".to_string(), Building::Gz, 5),
            ("739".to_string(), Building::Gz, 7),
        ]
    );
    assert_eq!(storage.group_lessons.len(), 4);
    Ok(())
}

#[test]
fn test_reimport_is_idempotent() -> Result<()> {
    let temp_dir = tempdir()?;
    let ics_dir = temp_dir.path().join("ics");
    std::fs::create_dir(&ics_dir)?;
    write(&ics_dir, "ИУ9-62Б.ics", &iu9_calendar())?;
    let store_path = temp_dir.path().join("freerooms.json");
    let cancel = AtomicBool::new(false);

    for _ in 0..2 {
        let mut storage = JsonStorage::open(&store_path)?;
        let report = Importer::new(&mut storage, options())?.import_dir(&ics_dir, &cancel)?;
        assert_eq!(report.imported.len(), 1);
        assert!(report.failed.is_empty());
    }

    let storage = JsonStorage::open(&store_path)?;
    let data = storage.data();
    assert_eq!(data.groups.len(), 1);
    assert_eq!(data.audiences.len(), 4);
    assert_eq!(data.lessons.len(), 4);
    assert_eq!(data.group_lessons.len(), 4);
    assert_eq!(data.schedules.len(), 4);
    Ok(())
}

#[test]
fn test_failing_file_does_not_stop_directory() -> Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "a_bad_title.ics", &calendar("ИУ9-62Б", &[]))?;
    let overfull = calendar(
        "Расписание ИУ9-42Б",
        &[
            vevent("Матанализ", "20220207T090000Z", "20220207T103500Z", 1, "325л"),
            vevent("Физика", "20220214T090000Z", "20220214T103500Z", 2, "326л"),
            vevent("Химия", "20220221T090000Z", "20220221T103500Z", 2, "327л"),
        ],
    );
    write(temp_dir.path(), "b_overfull.ics", &overfull)?;
    write(temp_dir.path(), "c_good.ics", &iu9_calendar())?;

    let mut storage = MemoryStorage::new();
    let cancel = AtomicBool::new(false);
    let report = Importer::new(&mut storage, options())?.import_dir(temp_dir.path(), &cancel)?;

    assert_eq!(report.imported.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert!(matches!(report.failed[0].1, ImportError::InvalidGroupName(_)));
    assert!(matches!(report.failed[1].1, ImportError::OverfullSlot { count: 3, .. }));

    // the overfull group was created before the failure but got no schedule rows
    assert_eq!(storage.groups.len(), 2);
    assert_eq!(storage.schedules.len(), 4);
    Ok(())
}

#[test]
fn test_stop_on_error() -> Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "a_bad_title.ics", &calendar("ИУ9-62Б", &[]))?;
    write(temp_dir.path(), "b_good.ics", &iu9_calendar())?;

    let mut storage = MemoryStorage::new();
    let mut options = options();
    options.stop_on_error = true;
    let cancel = AtomicBool::new(false);
    let report = Importer::new(&mut storage, options)?.import_dir(temp_dir.path(), &cancel)?;

    assert_eq!(report.failed.len(), 1);
    assert!(report.imported.is_empty());
    assert!(storage.schedules.is_empty());
    Ok(())
}

#[test]
fn test_cancelled_import_processes_nothing() -> Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "ИУ9-62Б.ics", &iu9_calendar())?;

    let mut storage = MemoryStorage::new();
    let cancel = AtomicBool::new(true);
    let report = Importer::new(&mut storage, options())?.import_dir(temp_dir.path(), &cancel)?;

    assert!(report.cancelled);
    assert!(report.imported.is_empty());
    assert!(storage.groups.is_empty());
    Ok(())
}

#[test]
fn test_free_rooms_after_import() -> Result<()> {
    let temp_dir = tempdir()?;
    write(temp_dir.path(), "ИУ9-62Б.ics", &iu9_calendar())?;

    let mut storage = MemoryStorage::new();
    Importer::new(&mut storage, options())?.import_file(&temp_dir.path().join("ИУ9-62Б.ics"))?;

    let filter = FreeAudienceFilter {
        week_day: Weekday::Tue,
        period: Period::new(1).unwrap(),
        week_type: WeekType::Odd,
        building: Some(Building::Gz),
        floor: None,
    };
    let free: Vec<String> = free_audiences(&storage, &filter)?.iter().map(|a| a.label()).collect();
    // 739 hosts compilers on odd Tuesdays, 104аю is busy on even ones only
    assert_eq!(free, vec!["104аю".to_string(), "501ю".to_string()]);
    Ok(())
}
