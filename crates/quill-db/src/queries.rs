use crate::models::{FeedbackRow, NewUserRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    /// Insert a user. Returns `false` when the username is already taken.
    pub fn insert_user(&self, user: &NewUserRow<'_>) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password, email, first_name, last_name)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(username) DO NOTHING",
                rusqlite::params![
                    user.username,
                    user.password,
                    user.email,
                    user.first_name,
                    user.last_name,
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, username))
    }

    /// Delete a user; their feedback goes with them via ON DELETE CASCADE.
    pub fn delete_user(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM users WHERE username = ?1", [username])?;
            Ok(deleted == 1)
        })
    }

    // -- Feedback --

    pub fn insert_feedback(&self, username: &str, title: &str, content: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO feedback (title, content, username) VALUES (?1, ?2, ?3)",
                rusqlite::params![title, content, username],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_feedback(&self, id: i64) -> Result<Option<FeedbackRow>> {
        self.with_conn(|conn| query_feedback(conn, id))
    }

    /// Update title and content in one transaction and return the stored row,
    /// or `None` if the post no longer exists.
    pub fn update_feedback(&self, id: i64, title: &str, content: &str) -> Result<Option<FeedbackRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE feedback SET title = ?1, content = ?2 WHERE id = ?3",
                rusqlite::params![title, content, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let row = query_feedback(&tx, id)?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn delete_feedback(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM feedback WHERE id = ?1", [id])?;
            Ok(deleted == 1)
        })
    }

    pub fn list_feedback_for_user(&self, username: &str) -> Result<Vec<FeedbackRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, content, username FROM feedback
                 WHERE username = ?1
                 ORDER BY id",
            )?;

            let rows = stmt
                .query_map([username], map_feedback)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_feedback_for_user(&self, username: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM feedback WHERE username = ?1",
                [username],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }
}

fn query_user(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT username, password, email, first_name, last_name FROM users WHERE username = ?1",
    )?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                username: row.get(0)?,
                password: row.get(1)?,
                email: row.get(2)?,
                first_name: row.get(3)?,
                last_name: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_feedback(conn: &Connection, id: i64) -> Result<Option<FeedbackRow>> {
    let mut stmt = conn.prepare("SELECT id, title, content, username FROM feedback WHERE id = ?1")?;
    let row = stmt.query_row([id], map_feedback).optional()?;
    Ok(row)
}

fn map_feedback(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRow> {
    Ok(FeedbackRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        username: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUserRow<'_> {
        NewUserRow {
            username,
            password: "$argon2id$fake",
            email: "someone@example.com",
            first_name: "Some",
            last_name: "One",
        }
    }

    #[test]
    fn duplicate_username_is_not_inserted() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_user(&new_user("ann")).unwrap());
        assert!(!db.insert_user(&new_user("ann")).unwrap());

        let row = db.get_user("ann").unwrap().unwrap();
        assert_eq!(row.email, "someone@example.com");
        assert!(db.get_user("bob").unwrap().is_none());
    }

    #[test]
    fn usernames_longer_than_twenty_chars_violate_schema() {
        let db = Database::open_in_memory().unwrap();
        let long = "x".repeat(21);
        assert!(db.insert_user(&new_user(&long)).is_err());
    }

    #[test]
    fn feedback_crud() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("ann")).unwrap();

        let id = db.insert_feedback("ann", "Hi", "Hello").unwrap();
        let row = db.get_feedback(id).unwrap().unwrap();
        assert_eq!(row.title, "Hi");
        assert_eq!(row.username.as_deref(), Some("ann"));

        let updated = db.update_feedback(id, "Hey", "Hello again").unwrap().unwrap();
        assert_eq!(updated.title, "Hey");
        assert_eq!(updated.content, "Hello again");
        assert!(db.update_feedback(id + 100, "x", "y").unwrap().is_none());

        assert!(db.delete_feedback(id).unwrap());
        assert!(!db.delete_feedback(id).unwrap());
        assert!(db.get_feedback(id).unwrap().is_none());
    }

    #[test]
    fn feedback_requires_existing_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.insert_feedback("ghost", "Hi", "Hello").is_err());
    }

    #[test]
    fn list_is_scoped_and_in_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("ann")).unwrap();
        db.insert_user(&new_user("bob")).unwrap();

        db.insert_feedback("ann", "first", "a").unwrap();
        db.insert_feedback("bob", "other", "b").unwrap();
        db.insert_feedback("ann", "second", "c").unwrap();

        let titles: Vec<String> = db
            .list_feedback_for_user("ann")
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn deleting_user_cascades_to_feedback() {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&new_user("ann")).unwrap();
        db.insert_user(&new_user("bob")).unwrap();
        db.insert_feedback("ann", "one", "a").unwrap();
        db.insert_feedback("ann", "two", "b").unwrap();
        db.insert_feedback("bob", "three", "c").unwrap();

        assert_eq!(db.count_feedback_for_user("ann").unwrap(), 2);
        assert!(db.delete_user("ann").unwrap());
        assert_eq!(db.count_feedback_for_user("ann").unwrap(), 0);
        assert_eq!(db.count_feedback_for_user("bob").unwrap(), 1);
        assert!(!db.delete_user("ann").unwrap());
    }
}
