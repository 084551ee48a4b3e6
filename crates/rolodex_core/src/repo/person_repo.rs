//! Person repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and lookup APIs over canonical `people` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Person::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Every default-scope query carries the `deleted = 0` predicate;
//!   `find_deleted` is the single bypass.
//! - Result order is insertion order (`rowid`), stable because person rows
//!   are never hard-deleted.

use crate::db::DbError;
use crate::model::birthday::Birthday;
use crate::model::person::{BlockId, Person, PersonId, PersonValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT
    p.uuid,
    p.name,
    p.hobby,
    p.address,
    p.job,
    p.phone_number,
    p.blood_type,
    p.birth_year,
    p.birth_month,
    p.birth_day,
    p.deleted,
    b.uuid AS block_uuid
FROM people AS p
LEFT JOIN blocks AS b ON b.person_uuid = p.uuid";

const REQUIRED_TABLES: &[&str] = &["people", "blocks"];

const REQUIRED_PEOPLE_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "hobby",
    "address",
    "job",
    "phone_number",
    "blood_type",
    "birth_year",
    "birth_month",
    "birth_day",
    "deleted",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    NotFound(PersonId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match required {expected_version}; open via db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing people.
#[derive(Debug, Clone, Default)]
pub struct PersonListQuery {
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for person CRUD and lookup operations.
///
/// Block markers are managed only through `set_block`/`clear_block`; the
/// `block` field of a written `Person` is derived state and ignored by the
/// write paths.
pub trait PersonRepository {
    fn create_person(&self, person: &Person) -> RepoResult<PersonId>;
    fn update_person(&self, person: &Person) -> RepoResult<()>;
    fn get_person(&self, id: PersonId, include_deleted: bool) -> RepoResult<Option<Person>>;
    fn list_people(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Person>>;
    fn find_by_blood_type(&self, blood_type: &str) -> RepoResult<Vec<Person>>;
    fn find_by_birth_month(&self, month: u32) -> RepoResult<Vec<Person>>;
    /// People whose birthday falls on any of the given (month, day) pairs.
    fn find_birthday_on(&self, days: &[(u32, u32)]) -> RepoResult<Vec<Person>>;
    /// The one query that surfaces ONLY soft-deleted rows.
    fn find_deleted(&self) -> RepoResult<Vec<Person>>;
    fn find_without_block(&self) -> RepoResult<Vec<Person>>;
    fn set_block(&self, person: PersonId) -> RepoResult<BlockId>;
    fn clear_block(&self, person: PersonId) -> RepoResult<()>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Wraps a connection after verifying it carries the expected schema.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not match
    ///   the latest migration (the connection skipped `db::open_db`).
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the physical
    ///   schema lost a table or column this repository depends on.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = crate::db::migrations::latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for &table in REQUIRED_TABLES {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(
                    SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
                );",
                [table],
                |row| row.get(0),
            )?;
            if exists == 0 {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('people');")?;
        let mut rows = stmt.query([])?;
        let mut present = Vec::new();
        while let Some(row) = rows.next()? {
            present.push(row.get::<_, String>(0)?);
        }
        for &column in REQUIRED_PEOPLE_COLUMNS {
            if !present.iter().any(|name| name == column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: "people",
                    column,
                });
            }
        }

        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        person.validate()?;

        self.conn.execute(
            "INSERT INTO people (
                uuid,
                name,
                hobby,
                address,
                job,
                phone_number,
                blood_type,
                birth_year,
                birth_month,
                birth_day,
                deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                person.uuid.to_string(),
                person.name.as_str(),
                person.hobby.as_deref(),
                person.address.as_deref(),
                person.job.as_deref(),
                person.phone_number.as_deref(),
                person.blood_type.as_deref(),
                person.birthday.map(|birthday| birthday.year),
                person.birthday.map(|birthday| birthday.month),
                person.birthday.map(|birthday| birthday.day),
                bool_to_int(person.deleted),
            ],
        )?;

        Ok(person.uuid)
    }

    fn update_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;

        let changed = self.conn.execute(
            "UPDATE people
             SET
                name = ?1,
                hobby = ?2,
                address = ?3,
                job = ?4,
                phone_number = ?5,
                blood_type = ?6,
                birth_year = ?7,
                birth_month = ?8,
                birth_day = ?9,
                deleted = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?11;",
            params![
                person.name.as_str(),
                person.hobby.as_deref(),
                person.address.as_deref(),
                person.job.as_deref(),
                person.phone_number.as_deref(),
                person.blood_type.as_deref(),
                person.birthday.map(|birthday| birthday.year),
                person.birthday.map(|birthday| birthday.month),
                person.birthday.map(|birthday| birthday.day),
                bool_to_int(person.deleted),
                person.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(person.uuid));
        }

        Ok(())
    }

    fn get_person(&self, id: PersonId, include_deleted: bool) -> RepoResult<Option<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL}
             WHERE p.uuid = ?1
               AND (?2 = 1 OR p.deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }

        Ok(None)
    }

    fn list_people(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>> {
        let mut sql = format!("{PERSON_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND p.deleted = 0");
        }

        sql.push_str(" ORDER BY p.rowid ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        collect_people(self.conn, &sql, bind_values)
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Vec<Person>> {
        collect_people(
            self.conn,
            &format!(
                "{PERSON_SELECT_SQL}
                 WHERE p.deleted = 0 AND p.name = ?
                 ORDER BY p.rowid ASC;"
            ),
            vec![Value::Text(name.to_string())],
        )
    }

    fn find_by_blood_type(&self, blood_type: &str) -> RepoResult<Vec<Person>> {
        collect_people(
            self.conn,
            &format!(
                "{PERSON_SELECT_SQL}
                 WHERE p.deleted = 0 AND p.blood_type = ?
                 ORDER BY p.rowid ASC;"
            ),
            vec![Value::Text(blood_type.to_string())],
        )
    }

    fn find_by_birth_month(&self, month: u32) -> RepoResult<Vec<Person>> {
        collect_people(
            self.conn,
            &format!(
                "{PERSON_SELECT_SQL}
                 WHERE p.deleted = 0 AND p.birth_month = ?
                 ORDER BY p.rowid ASC;"
            ),
            vec![Value::Integer(i64::from(month))],
        )
    }

    fn find_birthday_on(&self, days: &[(u32, u32)]) -> RepoResult<Vec<Person>> {
        if days.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!("{PERSON_SELECT_SQL} WHERE p.deleted = 0 AND (");
        let mut bind_values: Vec<Value> = Vec::new();
        for (index, (month, day)) in days.iter().enumerate() {
            if index > 0 {
                sql.push_str(" OR ");
            }
            sql.push_str("(p.birth_month = ? AND p.birth_day = ?)");
            bind_values.push(Value::Integer(i64::from(*month)));
            bind_values.push(Value::Integer(i64::from(*day)));
        }
        sql.push_str(") ORDER BY p.rowid ASC;");

        collect_people(self.conn, &sql, bind_values)
    }

    fn find_deleted(&self) -> RepoResult<Vec<Person>> {
        collect_people(
            self.conn,
            &format!("{PERSON_SELECT_SQL} WHERE p.deleted = 1 ORDER BY p.rowid ASC;"),
            Vec::new(),
        )
    }

    fn find_without_block(&self) -> RepoResult<Vec<Person>> {
        collect_people(
            self.conn,
            &format!(
                "{PERSON_SELECT_SQL}
                 WHERE p.deleted = 0 AND b.uuid IS NULL
                 ORDER BY p.rowid ASC;"
            ),
            Vec::new(),
        )
    }

    fn set_block(&self, person: PersonId) -> RepoResult<BlockId> {
        // ON CONFLICT keeps the existing marker; the UNIQUE constraint is
        // the at-most-one-block-per-person invariant.
        self.conn.execute(
            "INSERT INTO blocks (uuid, person_uuid) VALUES (?1, ?2)
             ON CONFLICT (person_uuid) DO NOTHING;",
            params![Uuid::new_v4().to_string(), person.to_string()],
        )?;

        let block_text: String = self.conn.query_row(
            "SELECT uuid FROM blocks WHERE person_uuid = ?1;",
            [person.to_string()],
            |row| row.get(0),
        )?;
        parse_uuid(&block_text, "blocks.uuid")
    }

    fn clear_block(&self, person: PersonId) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM blocks WHERE person_uuid = ?1;",
            [person.to_string()],
        )?;
        Ok(())
    }
}

fn collect_people(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<Person>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut people = Vec::new();

    while let Some(row) = rows.next()? {
        people.push(parse_person_row(row)?);
    }

    Ok(people)
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "people.uuid")?;

    let birthday = parse_birthday(
        row.get("birth_year")?,
        row.get("birth_month")?,
        row.get("birth_day")?,
    )?;

    let deleted = match row.get::<_, i64>("deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid deleted value `{other}` in people.deleted"
            )));
        }
    };

    let block = match row.get::<_, Option<String>>("block_uuid")? {
        Some(text) => Some(parse_uuid(&text, "blocks.uuid")?),
        None => None,
    };

    let person = Person {
        uuid,
        name: row.get("name")?,
        hobby: row.get("hobby")?,
        address: row.get("address")?,
        job: row.get("job")?,
        phone_number: row.get("phone_number")?,
        blood_type: row.get("blood_type")?,
        birthday,
        deleted,
        block,
    };
    person.validate()?;
    Ok(person)
}

fn parse_birthday(
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
) -> RepoResult<Option<Birthday>> {
    match (year, month, day) {
        (None, None, None) => Ok(None),
        (Some(year), Some(month), Some(day)) => {
            let year = i32::try_from(year).map_err(|_| invalid_birthday(year, month, day))?;
            let month = u32::try_from(month)
                .map_err(|_| invalid_birthday(i64::from(year), month, day))?;
            let day = u32::try_from(day)
                .map_err(|_| invalid_birthday(i64::from(year), i64::from(month), day))?;
            let birthday = Birthday::new(year, month, day)
                .map_err(|err| RepoError::InvalidData(format!("{err} in people row")))?;
            Ok(Some(birthday))
        }
        _ => Err(RepoError::InvalidData(
            "partial birthday triple in people row".to_string(),
        )),
    }
}

fn invalid_birthday(year: i64, month: i64, day: i64) -> RepoError {
    RepoError::InvalidData(format!(
        "birthday {year}-{month}-{day} out of range in people row"
    ))
}

fn parse_uuid(text: &str, source: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {source}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
