use rolodex_core::{Birthday, Person, PersonValidationError};
use uuid::Uuid;

#[test]
fn person_new_sets_defaults() {
    let person = Person::new("martin");

    assert!(!person.uuid.is_nil());
    assert_eq!(person.name, "martin");
    assert_eq!(person.hobby, None);
    assert_eq!(person.address, None);
    assert_eq!(person.job, None);
    assert_eq!(person.phone_number, None);
    assert_eq!(person.blood_type, None);
    assert_eq!(person.birthday, None);
    assert_eq!(person.block, None);
    assert!(person.is_active());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Person::with_id(Uuid::nil(), "martin").unwrap_err();
    assert_eq!(err, PersonValidationError::NilUuid);
}

#[test]
fn soft_delete_and_restore_work() {
    let mut person = Person::new("dennis");

    person.soft_delete();
    assert!(person.deleted);
    assert!(!person.is_active());

    person.restore();
    assert!(!person.deleted);
    assert!(person.is_active());
}

#[test]
fn validate_rejects_blank_name() {
    let mut person = Person::new("tony");
    person.name = "   ".to_string();

    assert_eq!(
        person.validate().unwrap_err(),
        PersonValidationError::EmptyName
    );
}

#[test]
fn validate_rejects_impossible_birthday_triple() {
    let mut person = Person::new("tony");
    person.birthday = Some(Birthday {
        year: 1991,
        month: 2,
        day: 30,
    });

    assert_eq!(
        person.validate().unwrap_err(),
        PersonValidationError::InvalidBirthday {
            year: 1991,
            month: 2,
            day: 30
        }
    );
}

#[test]
fn age_is_year_difference_plus_one_regardless_of_month_and_day() {
    let mut person = Person::new("martin");
    person.birthday = Some(Birthday::new(1991, 8, 15).unwrap());
    assert_eq!(person.age_in_year(2024), Some(34));

    // Age flips on Jan 1, so a December birthday reports the same value.
    person.birthday = Some(Birthday::new(1991, 12, 31).unwrap());
    assert_eq!(person.age_in_year(2024), Some(34));
}

#[test]
fn age_is_absent_without_a_birthday() {
    let person = Person::new("martin");
    assert_eq!(person.age_in_year(2024), None);
}

#[test]
fn person_serialization_uses_expected_wire_fields() {
    let person_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut person = Person::with_id(person_id, "martin").unwrap();
    person.hobby = Some("programming".to_string());
    person.blood_type = Some("A".to_string());
    person.birthday = Some(Birthday::new(1991, 8, 15).unwrap());

    let json = serde_json::to_value(&person).unwrap();
    assert_eq!(json["uuid"], person_id.to_string());
    assert_eq!(json["name"], "martin");
    assert_eq!(json["hobby"], "programming");
    assert_eq!(json["blood_type"], "A");
    assert_eq!(json["birthday"]["year"], 1991);
    assert_eq!(json["birthday"]["month"], 8);
    assert_eq!(json["birthday"]["day"], 15);
    assert_eq!(json["deleted"], false);
    assert_eq!(json["block"], serde_json::Value::Null);

    let decoded: Person = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, person);
}
