//! Builds parameterized INSERT, SELECT, UPDATE, DELETE for the students table.

use crate::schema::{Column, FieldChange, Student};
use std::fmt;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// A bound text parameter. Secret values are redacted from `Debug` output so
/// query logging never prints a password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Param {
    pub value: Option<String>,
    pub secret: bool,
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, self.secret) {
            (None, _) => f.write_str("NULL"),
            (Some(_), true) => f.write_str("\"***\""),
            (Some(v), false) => write!(f, "{:?}", v),
        }
    }
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Param>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, value: Option<String>, secret: bool) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(Param { value, secret });
        n
    }
}

/// Every column, in table order.
fn column_list() -> String {
    Column::ALL
        .iter()
        .map(|c| quoted(c.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn key() -> String {
    quoted(Column::MatricNumber.name())
}

/// INSERT one full row, returning it.
pub fn insert(table: &str, student: &Student) -> QueryBuf {
    let mut q = QueryBuf::new();
    let f = &student.fields;
    let values = [
        (Some(f.matric_number.clone()), false),
        (Some(f.first_name.clone()), false),
        (Some(f.last_name.clone()), false),
        (f.email.clone(), false),
        (Some(student.password.clone()), true),
    ];
    let placeholders: Vec<String> = values
        .into_iter()
        .map(|(v, secret)| format!("${}", q.push_param(v, secret)))
        .collect();
    let cols = column_list();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols,
        placeholders.join(", "),
        cols
    );
    q
}

/// SELECT every row ordered by key.
pub fn select_all(table: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT {} FROM {} ORDER BY {}", column_list(), table, key());
    q
}

/// SELECT one row by key. `for_update` locks the row until the surrounding transaction ends.
pub fn select_by_key(table: &str, matric_number: &str, for_update: bool) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Some(matric_number.to_string()), false);
    let lock = if for_update { " FOR UPDATE" } else { "" };
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}{}",
        column_list(),
        table,
        key(),
        n,
        lock
    );
    q
}

/// UPDATE only the supplied columns, returning the row. Caller handles an empty change set.
pub fn update(table: &str, matric_number: &str, changes: &[FieldChange]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut set_parts = Vec::with_capacity(changes.len());
    for change in changes {
        let n = q.push_param(change.value.clone(), change.column.is_secret());
        set_parts.push(format!("{} = ${}", quoted(change.column.name()), n));
    }
    let key_param = q.push_param(Some(matric_number.to_string()), false);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        set_parts.join(", "),
        key(),
        key_param,
        column_list()
    );
    q
}

/// DELETE one row by key, returning it.
pub fn delete(table: &str, matric_number: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(Some(matric_number.to_string()), false);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        table,
        key(),
        n,
        column_list()
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StudentFields;

    const TABLE: &str = "\"public\".\"students\"";
    const COLS: &str = "\"matric_number\", \"first_name\", \"last_name\", \"email\", \"password\"";

    #[test]
    fn quoting_escapes_double_quotes() {
        assert_eq!(quoted("a\"b"), "\"a\"\"b\"");
        assert_eq!(qualified_table("public", "students"), TABLE);
    }

    #[test]
    fn insert_binds_all_columns_in_order() {
        let student = Student {
            fields: StudentFields {
                matric_number: "21cg029882".into(),
                first_name: "Adebola".into(),
                last_name: "Odufuwa".into(),
                email: None,
            },
            password: "$argon2id$hash".into(),
        };
        let q = insert(TABLE, &student);
        assert_eq!(
            q.sql,
            format!(
                "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
                TABLE, COLS, COLS
            )
        );
        assert_eq!(q.params.len(), 5);
        assert_eq!(q.params[3].value, None);
        assert!(q.params[4].secret);
    }

    #[test]
    fn update_sets_only_supplied_columns() {
        let changes = vec![
            FieldChange {
                column: Column::Email,
                value: None,
            },
            FieldChange {
                column: Column::Password,
                value: Some("$argon2id$hash".into()),
            },
        ];
        let q = update(TABLE, "21cg029882", &changes);
        assert_eq!(
            q.sql,
            format!(
                "UPDATE {} SET \"email\" = $1, \"password\" = $2 WHERE \"matric_number\" = $3 RETURNING {}",
                TABLE, COLS
            )
        );
        assert_eq!(q.params[2].value.as_deref(), Some("21cg029882"));
    }

    #[test]
    fn select_by_key_can_lock() {
        let q = select_by_key(TABLE, "k", true);
        assert!(q.sql.ends_with("WHERE \"matric_number\" = $1 FOR UPDATE"));
        let q = select_by_key(TABLE, "k", false);
        assert!(q.sql.ends_with("WHERE \"matric_number\" = $1"));
    }

    #[test]
    fn select_all_orders_by_key() {
        let q = select_all(TABLE);
        assert_eq!(
            q.sql,
            format!("SELECT {} FROM {} ORDER BY \"matric_number\"", COLS, TABLE)
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn delete_returns_row() {
        let q = delete(TABLE, "k");
        assert_eq!(
            q.sql,
            format!("DELETE FROM {} WHERE \"matric_number\" = $1 RETURNING {}", TABLE, COLS)
        );
    }

    #[test]
    fn secret_params_are_redacted_in_debug() {
        let p = Param {
            value: Some("$argon2id$hash".into()),
            secret: true,
        };
        assert_eq!(format!("{:?}", p), "\"***\"");
        let p = Param {
            value: None,
            secret: false,
        };
        assert_eq!(format!("{:?}", p), "NULL");
    }
}
