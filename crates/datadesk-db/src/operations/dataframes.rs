//! Dataframe, variable and categorical value operations.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use datadesk_core::{CategoricalValue, Dataframe, DataframeDraft, Variable};
use rusqlite::{params, Connection};
use tracing::{debug, info};

impl Database {
    /// Write a fully described dataset, its columns and their values in one transaction.
    pub fn register_full_dataframe(&self, draft: &DataframeDraft) -> DbResult<Dataframe> {
        let dataframe = Dataframe::from_draft(draft);

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO dataframes (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                dataframe.id,
                dataframe.name,
                dataframe.description,
                dataframe.created_at.to_rfc3339(),
            ],
        )?;

        for (position, variable) in dataframe.variables.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO variables (id, dataframe_id, position, name, description, is_categorical)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    variable.id,
                    variable.dataframe_id,
                    position as i64,
                    variable.name,
                    variable.description,
                    variable.is_categorical,
                ],
            )?;

            for (value_position, value) in variable.values.iter().enumerate() {
                tx.execute(
                    r#"
                    INSERT INTO categorical_values (id, variable_id, position, name, description)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![
                        value.id,
                        value.variable_id,
                        value_position as i64,
                        value.name,
                        value.description,
                    ],
                )?;
            }
        }

        tx.commit()?;

        info!(
            "Registered dataframe '{}' ({} variables) as {}",
            dataframe.name,
            dataframe.variables.len(),
            dataframe.id
        );

        Ok(dataframe)
    }

    /// Get a dataframe with its variables and values.
    pub fn get_dataframe(&self, id: &str) -> DbResult<Dataframe> {
        let conn = self.conn()?;
        let mut dataframe = conn
            .query_row(
                "SELECT id, name, description, created_at FROM dataframes WHERE id = ?1",
                params![id],
                row_to_dataframe,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("Dataframe not found: {}", id))
                }
                _ => DbError::from(e),
            })?;

        dataframe.variables = load_variables(&conn, &dataframe.id)?;
        Ok(dataframe)
    }

    /// List dataframes, newest first.
    pub fn list_dataframes(&self, limit: Option<i64>) -> DbResult<Vec<Dataframe>> {
        let conn = self.conn()?;
        let limit = limit.unwrap_or(100);

        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_at FROM dataframes ORDER BY created_at DESC LIMIT ?1",
        )?;
        let mut dataframes = stmt
            .query_map(params![limit], row_to_dataframe)?
            .collect::<Result<Vec<_>, _>>()?;

        for dataframe in dataframes.iter_mut() {
            dataframe.variables = load_variables(&conn, &dataframe.id)?;
        }

        Ok(dataframes)
    }

    /// Count stored dataframes.
    pub fn count_dataframes(&self) -> DbResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM dataframes", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn load_variables(conn: &Connection, dataframe_id: &str) -> DbResult<Vec<Variable>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, dataframe_id, name, description, is_categorical
        FROM variables WHERE dataframe_id = ?1 ORDER BY position
        "#,
    )?;
    let mut variables = stmt
        .query_map(params![dataframe_id], |row| {
            Ok(Variable {
                id: row.get(0)?,
                dataframe_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                is_categorical: row.get(4)?,
                values: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut value_stmt = conn.prepare(
        r#"
        SELECT id, variable_id, name, description
        FROM categorical_values WHERE variable_id = ?1 ORDER BY position
        "#,
    )?;
    for variable in variables.iter_mut() {
        variable.values = value_stmt
            .query_map(params![variable.id], |row| {
                Ok(CategoricalValue {
                    id: row.get(0)?,
                    variable_id: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
    }

    debug!("Loaded {} variables for dataframe {}", variables.len(), dataframe_id);
    Ok(variables)
}

fn row_to_dataframe(row: &rusqlite::Row) -> rusqlite::Result<Dataframe> {
    let created_at_str: String = row.get(3)?;
    Ok(Dataframe {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: parse_timestamp(&created_at_str),
        variables: Vec::new(),
    })
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datadesk_core::{ValueDraft, VariableDraft};

    fn draft() -> DataframeDraft {
        DataframeDraft {
            name: "people".to_string(),
            description: "census extract".to_string(),
            variables: vec![
                VariableDraft {
                    name: "age".to_string(),
                    description: "age in years".to_string(),
                    is_categorical: false,
                    values: vec![],
                },
                VariableDraft {
                    name: "city".to_string(),
                    description: "home city".to_string(),
                    is_categorical: true,
                    values: vec![
                        ValueDraft::new("NY", "New York"),
                        ValueDraft::new("LA", "Los Angeles"),
                        ValueDraft::new("SF", "San Francisco"),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_register_and_get_dataframe() {
        let db = Database::open_in_memory().unwrap();
        let stored = db.register_full_dataframe(&draft()).unwrap();

        let loaded = db.get_dataframe(&stored.id).unwrap();
        assert_eq!(loaded.name, "people");
        assert_eq!(loaded.variables.len(), 2);
        assert_eq!(loaded.variables[0].name, "age");
        assert!(!loaded.variables[0].is_categorical);
        assert!(loaded.variables[0].values.is_empty());

        let city = &loaded.variables[1];
        assert!(city.is_categorical);
        let names: Vec<_> = city.values.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["NY", "LA", "SF"]);
        assert_eq!(city.values[2].description, "San Francisco");
        assert_eq!(city.values[0].id, stored.variables[1].values[0].id);
    }

    #[test]
    fn test_get_missing_dataframe() {
        let db = Database::open_in_memory().unwrap();
        let result = db.get_dataframe("nope");
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_list_and_count() {
        let db = Database::open_in_memory().unwrap();
        db.register_full_dataframe(&draft()).unwrap();
        db.register_full_dataframe(&draft()).unwrap();

        assert_eq!(db.count_dataframes().unwrap(), 2);
        let listed = db.list_dataframes(Some(1)).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].variables.len(), 2);
    }
}
