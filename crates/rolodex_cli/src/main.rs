//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `rolodex_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use chrono::Local;
use rolodex_core::db::open_db_in_memory;
use rolodex_core::{Birthday, PersonService, PersonUpdate, SqlitePersonRepository};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("rolodex_core version={}", rolodex_core::core_version());

    let today = Local::now().date_naive();
    let conn = open_db_in_memory()?;
    let repo = SqlitePersonRepository::try_new(&conn)?;
    let service = PersonService::new(repo);

    let created = service.create_person(&PersonUpdate {
        hobby: Some("programming".to_string()),
        birthday: Some(Birthday::from_date(today)),
        ..PersonUpdate::named("martin")
    })?;
    println!("created person id={} name={}", created.uuid, created.name);

    let friends = service.birthday_friends(today)?;
    println!("birthday friends today={}", friends.len());

    Ok(())
}
