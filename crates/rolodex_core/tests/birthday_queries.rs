use chrono::NaiveDate;
use rolodex_core::db::open_db_in_memory;
use rolodex_core::{
    Birthday, Person, PersonRepository, PersonService, SqlitePersonRepository,
};

fn person_born_on(name: &str, year: i32, month: u32, day: u32) -> Person {
    let mut person = Person::new(name);
    person.birthday = Some(Birthday::new(year, month, day).unwrap());
    person
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn find_by_birth_month_returns_matching_visible_people() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let august = person_born_on("martin", 1991, 8, 15);
    let september = person_born_on("dennis", 1990, 9, 2);
    let mut deleted_august = person_born_on("tony", 1989, 8, 20);
    repo.create_person(&august).unwrap();
    repo.create_person(&september).unwrap();
    repo.create_person(&deleted_august).unwrap();

    deleted_august.soft_delete();
    repo.update_person(&deleted_august).unwrap();

    let result = repo.find_by_birth_month(8).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].uuid, august.uuid);
}

#[test]
fn birthday_window_includes_today_and_tomorrow_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let service = PersonService::new(repo);

    let conn_repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let on_today = person_born_on("martin", 1991, 8, 15);
    let on_tomorrow = person_born_on("dennis", 1985, 8, 16);
    let two_days_out = person_born_on("tony", 1991, 8, 17);
    conn_repo.create_person(&on_today).unwrap();
    conn_repo.create_person(&on_tomorrow).unwrap();
    conn_repo.create_person(&two_days_out).unwrap();

    let result = service.birthday_friends(date(2024, 8, 15)).unwrap();
    let ids: Vec<_> = result.iter().map(|person| person.uuid).collect();
    assert_eq!(ids, vec![on_today.uuid, on_tomorrow.uuid]);
}

#[test]
fn birthday_window_rolls_over_month_end() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let service = PersonService::new(repo);

    let writer = SqlitePersonRepository::try_new(&conn).unwrap();
    let last_of_august = person_born_on("martin", 1991, 8, 31);
    let first_of_september = person_born_on("dennis", 1990, 9, 1);
    let second_of_september = person_born_on("tony", 1989, 9, 2);
    writer.create_person(&last_of_august).unwrap();
    writer.create_person(&first_of_september).unwrap();
    writer.create_person(&second_of_september).unwrap();

    let result = service.birthday_friends(date(2024, 8, 31)).unwrap();
    let ids: Vec<_> = result.iter().map(|person| person.uuid).collect();
    assert_eq!(ids, vec![last_of_august.uuid, first_of_september.uuid]);
}

#[test]
fn birthday_window_rolls_over_year_end() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let service = PersonService::new(repo);

    let writer = SqlitePersonRepository::try_new(&conn).unwrap();
    let new_years_eve = person_born_on("martin", 1991, 12, 31);
    let new_years_day = person_born_on("dennis", 1990, 1, 1);
    let early_january = person_born_on("tony", 1989, 1, 2);
    writer.create_person(&new_years_eve).unwrap();
    writer.create_person(&new_years_day).unwrap();
    writer.create_person(&early_january).unwrap();

    let result = service.birthday_friends(date(2024, 12, 31)).unwrap();
    let ids: Vec<_> = result.iter().map(|person| person.uuid).collect();
    assert_eq!(ids, vec![new_years_eve.uuid, new_years_day.uuid]);
}

#[test]
fn birthday_window_keeps_insertion_order_not_date_proximity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let service = PersonService::new(repo);

    let writer = SqlitePersonRepository::try_new(&conn).unwrap();
    // Tomorrow's birthday is inserted first and must stay first.
    let inserted_first = person_born_on("dennis", 1990, 8, 16);
    let inserted_second = person_born_on("martin", 1991, 8, 15);
    writer.create_person(&inserted_first).unwrap();
    writer.create_person(&inserted_second).unwrap();

    let result = service.birthday_friends(date(2024, 8, 15)).unwrap();
    let ids: Vec<_> = result.iter().map(|person| person.uuid).collect();
    assert_eq!(ids, vec![inserted_first.uuid, inserted_second.uuid]);
}

#[test]
fn birthday_window_skips_deleted_people() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let service = PersonService::new(repo);

    let writer = SqlitePersonRepository::try_new(&conn).unwrap();
    let mut tombstoned = person_born_on("martin", 1991, 8, 15);
    writer.create_person(&tombstoned).unwrap();
    tombstoned.soft_delete();
    writer.update_person(&tombstoned).unwrap();

    let result = service.birthday_friends(date(2024, 8, 15)).unwrap();
    assert!(result.is_empty());
}

#[test]
fn find_birthday_on_with_no_days_returns_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let person = person_born_on("martin", 1991, 8, 15);
    repo.create_person(&person).unwrap();

    assert!(repo.find_birthday_on(&[]).unwrap().is_empty());
}
