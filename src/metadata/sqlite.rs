//! SQLite catalog introspection.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use super::schema::{ForeignKey, SchemaModel, SqlType, Table};
use super::MetadataResult;

/// Reads tables, columns and foreign keys from a SQLite database.
pub struct SqliteIntrospector {
    conn: Connection,
}

impl SqliteIntrospector {
    /// Open a database file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> MetadataResult<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Snapshot the catalog. Internal `sqlite_*` tables are skipped.
    pub fn introspect(&self) -> MetadataResult<SchemaModel> {
        let mut schema = SchemaModel::new();
        for name in self.table_names()? {
            let table = self.table(&name)?;
            log::debug!("introspected table '{}' ({} columns)", name, table.columns.len());
            schema.tables.push(table);
            schema.foreign_keys.extend(self.foreign_keys(&name)?);
        }
        Ok(schema)
    }

    fn table_names(&self) -> MetadataResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn table(&self, name: &str) -> MetadataResult<Table> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([name], |row| {
                let column: String = row.get(0)?;
                let declared: String = row.get(1)?;
                Ok((column, declared))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut table = Table::new(name);
        for (column, declared) in columns {
            let sql_type = SqlType::parse(&declared);
            if let SqlType::Other(other) = &sql_type {
                log::warn!(
                    "column {}.{} has unrecognized type '{}', treating as text",
                    name,
                    column,
                    other
                );
            }
            table = table.with_column(column, sql_type);
        }
        Ok(table)
    }

    /// Foreign keys declared on `table`, one per constraint id.
    fn foreign_keys(&self, table: &str) -> MetadataResult<Vec<ForeignKey>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, seq, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) \
             ORDER BY id, seq",
        )?;
        let rows = stmt
            .query_map([table], |row| {
                let id: i64 = row.get(0)?;
                let seq: i64 = row.get(1)?;
                let target: String = row.get(2)?;
                let from: String = row.get(3)?;
                let to: Option<String> = row.get(4)?;
                Ok((id, seq, target, from, to))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // None marks a key dropped because a target column could not be resolved.
        let mut keys: Vec<(i64, Option<ForeignKey>)> = Vec::new();
        let mut primary_keys: HashMap<String, Vec<String>> = HashMap::new();
        for (id, seq, target, from, to) in rows {
            // A key without explicit target columns references the primary key,
            // column by column in key order.
            let to = match to {
                Some(to) => Some(to),
                None => {
                    if !primary_keys.contains_key(&target) {
                        let columns = self.primary_key(&target)?;
                        primary_keys.insert(target.clone(), columns);
                    }
                    primary_keys
                        .get(&target)
                        .zip(usize::try_from(seq).ok())
                        .and_then(|(columns, position)| columns.get(position))
                        .cloned()
                }
            };
            if to.is_none() {
                log::warn!(
                    "skipping foreign key {}.{} -> {}: no target column",
                    table,
                    from,
                    target
                );
            }

            match keys.last_mut() {
                Some((last, slot)) if *last == id => match (slot.as_mut(), to) {
                    (Some(key), Some(to)) => key.column_pairs.push((from, to)),
                    _ => *slot = None,
                },
                _ => keys.push((
                    id,
                    to.map(|to| ForeignKey::new(table, target).with_pair(from, to)),
                )),
            }
        }
        Ok(keys.into_iter().filter_map(|(_, key)| key).collect())
    }

    /// Primary-key columns of `table` in key order.
    fn primary_key(&self, table: &str) -> MetadataResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk")?;
        let columns = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }
}
