//! # Store SQLite
//! src/store/sqlite.rs
//!
//! Implementación de [`UserStore`] sobre una conexión `rusqlite`.
//! Con la ruta `:memory:` la base vive sólo mientras dure el proceso.

use super::{hash_password, NewUser, StoreError, User, UserChanges, UserPage, UserQuery, UserStore};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, name, email, created_at";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Abre (o crea) la base y asegura el esquema
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        create_schema(&conn)?;

        log::info!("Base de datos abierta: {}", path);
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }
}

/// Crea la tabla `users` si no existe
pub fn create_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Las violaciones de UNIQUE se reportan como conflicto
fn map_write_error(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, message) if err.code == ErrorCode::ConstraintViolation => {
            StoreError::Conflict(message.clone().unwrap_or_else(|| err.to_string()))
        }
        _ => StoreError::Backend(e),
    }
}

fn like_pattern(value: &str) -> Value {
    Value::Text(format!("%{}%", value))
}

impl UserStore for SqliteStore {
    fn create_user(&mut self, user: &NewUser) -> Result<User, StoreError> {
        self.conn
            .execute(
                "INSERT INTO users (name, email, password) VALUES (?1, ?2, ?3)",
                params![user.name, user.email, hash_password(&user.password)],
            )
            .map_err(map_write_error)?;

        let id = self.conn.last_insert_rowid();
        log::debug!("Usuario creado: id={} name={}", id, user.name);

        self.get_user(id)?
            .ok_or(StoreError::Backend(rusqlite::Error::QueryReturnedNoRows))
    }

    fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                [id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn list_users(&self, query: &UserQuery) -> Result<UserPage, StoreError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(search) = &query.search {
            clauses.push("(name LIKE ? OR email LIKE ?)".to_string());
            args.push(like_pattern(search));
            args.push(like_pattern(search));
        }

        for (column, value) in &query.filters {
            clauses.push(format!("{} LIKE ?", column.column()));
            args.push(like_pattern(value));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM users{}", where_sql),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;

        let sql = format!(
            "SELECT {} FROM users{} ORDER BY id LIMIT ? OFFSET ?",
            USER_COLUMNS, where_sql
        );
        args.push(Value::Integer(i64::from(query.limit)));
        args.push(Value::Integer(i64::from(query.offset)));

        let mut stmt = self.conn.prepare(&sql)?;
        let users = stmt
            .query_map(params_from_iter(args.iter()), row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserPage {
            users,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    fn update_user(&mut self, id: i64, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        if changes.is_empty() {
            return self.get_user(id);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(name) = &changes.name {
            sets.push("name = ?");
            args.push(Value::Text(name.clone()));
        }
        if let Some(email) = &changes.email {
            sets.push("email = ?");
            args.push(Value::Text(email.clone()));
        }
        if let Some(password) = &changes.password {
            sets.push("password = ?");
            args.push(Value::Text(hash_password(password)));
        }
        args.push(Value::Integer(id));

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let updated = self
            .conn
            .execute(&sql, params_from_iter(args.iter()))
            .map_err(map_write_error)?;

        if updated == 0 {
            return Ok(None);
        }

        log::debug!("Usuario actualizado: id={}", id);
        self.get_user(id)
    }

    fn delete_user(&mut self, id: i64) -> Result<bool, StoreError> {
        let deleted = self.conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        if deleted > 0 {
            log::debug!("Usuario eliminado: id={}", id);
        }
        Ok(deleted > 0)
    }
}
