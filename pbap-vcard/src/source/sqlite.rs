// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQLite-backed record source.

use std::collections::VecDeque;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use super::migration::{all_migrations, MigrationRunner};
use super::{
    CallRecord, CallType, Category, ContactRecord, IdMatch, LabeledValue, ListOrder,
    OrderedView, PhoneKind, PhoneNumber, Presentation, RecordCursor, RecordHandle,
    RecordSource, Selection, SourceError,
};

/// Record store kept in a local SQLite database.
pub struct SqliteRecordSource {
    conn: Connection,
}

impl SqliteRecordSource {
    /// Opens or creates a record store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Creates an in-memory record store (for testing).
    pub fn in_memory() -> Result<Self, SourceError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, SourceError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        MigrationRunner::run(&conn, &all_migrations())?;
        Ok(SqliteRecordSource { conn })
    }

    /// Returns the current schema version.
    pub fn schema_version(&self) -> Result<u32, SourceError> {
        MigrationRunner::current_version(&self.conn)
    }

    // === Contact Operations ===

    /// Inserts a contact and its data rows, returning the assigned identity.
    pub fn insert_contact(&self, contact: &ContactRecord) -> Result<i64, SourceError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO contacts
             (display_name, given_name, family_name, nickname, organization, title,
              note, birthday, photo, in_visible_group)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                contact.display_name,
                contact.given_name,
                contact.family_name,
                contact.nickname,
                contact.organization,
                contact.title,
                contact.note,
                contact.birthday,
                contact.photo.as_deref(),
                contact.visible,
            ],
        )?;
        let id = tx.last_insert_rowid();

        let mut rows: Vec<(&str, Option<&str>, Option<&str>, &str)> = Vec::new();
        for phone in &contact.phones {
            rows.push((
                "phone",
                Some(phone.kind.as_str()),
                phone.label.as_deref(),
                &phone.number,
            ));
        }
        for email in &contact.emails {
            rows.push(("email", None, email.label.as_deref(), &email.value));
        }
        for address in &contact.addresses {
            rows.push(("postal", None, address.label.as_deref(), &address.value));
        }
        for website in &contact.websites {
            rows.push(("website", None, None, website));
        }
        for im in &contact.ims {
            rows.push(("im", None, im.label.as_deref(), &im.value));
        }
        for sip in &contact.sip_addresses {
            rows.push(("sip", None, None, sip));
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO contact_data (contact_id, kind, subtype, label, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (kind, subtype, label, value) in rows {
                stmt.execute(params![id, kind, subtype, label, value])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }

    /// Deletes a contact by identity.
    pub fn delete_contact(&self, id: i64) -> Result<bool, SourceError> {
        self.conn
            .execute("DELETE FROM contact_data WHERE contact_id = ?1", params![id])?;
        let rows_affected = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    /// Loads a contact by identity.
    pub fn load_contact(&self, id: i64) -> Result<Option<ContactRecord>, SourceError> {
        let contact = self
            .conn
            .query_row(
                "SELECT id, display_name, given_name, family_name, nickname, organization,
                        title, note, birthday, photo, in_visible_group
                 FROM contacts WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ContactRecord {
                        id: row.get(0)?,
                        display_name: row.get(1)?,
                        given_name: row.get(2)?,
                        family_name: row.get(3)?,
                        nickname: row.get(4)?,
                        organization: row.get(5)?,
                        title: row.get(6)?,
                        note: row.get(7)?,
                        birthday: row.get(8)?,
                        photo: row.get(9)?,
                        visible: row.get(10)?,
                        ..Default::default()
                    })
                },
            )
            .optional()?;

        let Some(mut contact) = contact else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare_cached(
            "SELECT kind, subtype, label, value FROM contact_data
             WHERE contact_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        for row in rows {
            let (kind, subtype, label, value) = row?;
            match kind.as_str() {
                "phone" => contact.phones.push(PhoneNumber {
                    kind: PhoneKind::parse(subtype.as_deref().unwrap_or_default()),
                    label,
                    number: value,
                }),
                "email" => contact.emails.push(LabeledValue { label, value }),
                "postal" => contact.addresses.push(LabeledValue { label, value }),
                "website" => contact.websites.push(value),
                "im" => contact.ims.push(LabeledValue { label, value }),
                "sip" => contact.sip_addresses.push(value),
                other => {
                    return Err(SourceError::Corrupt(format!(
                        "unknown data kind '{}' on contact {}",
                        other, id
                    )))
                }
            }
        }

        Ok(Some(contact))
    }

    // === Call Log Operations ===

    /// Inserts a call-log entry, returning the assigned identity.
    pub fn insert_call(&self, call: &CallRecord) -> Result<i64, SourceError> {
        self.conn.execute(
            "INSERT INTO calls
             (number, presentation, call_type, date_ms, cached_name, cached_number_kind)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                call.number,
                call.presentation as i64,
                call.call_type as i64,
                call.date_ms,
                call.cached_name,
                call.cached_number_kind.map(|kind| kind.as_str()),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Deletes a call-log entry by identity.
    pub fn delete_call(&self, id: i64) -> Result<bool, SourceError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM calls WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    /// Loads a call-log entry by identity.
    pub fn load_call(&self, id: i64) -> Result<Option<CallRecord>, SourceError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, number, presentation, call_type, date_ms, cached_name,
                        cached_number_kind
                 FROM calls WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, number, presentation, call_type, date_ms, cached_name, kind)) = row else {
            return Ok(None);
        };
        let call_type = CallType::from_code(call_type).ok_or_else(|| {
            SourceError::Corrupt(format!("call {} has unknown type {}", id, call_type))
        })?;

        Ok(Some(CallRecord {
            id,
            number,
            presentation: Presentation::from_code(presentation),
            call_type,
            date_ms,
            cached_name,
            cached_number_kind: kind.as_deref().map(PhoneKind::parse),
        }))
    }

    fn select_ids(&self, selection: &Selection) -> Result<VecDeque<i64>, SourceError> {
        let (id_clause, values) = id_clause(&selection.ids)?;
        let sql = format!(
            "SELECT id FROM {} WHERE {} AND {} ORDER BY {}",
            table(selection.category),
            category_clause(selection.category),
            id_clause,
            order_clause(selection.category, selection.order),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, i64>(0))?
            .collect::<Result<VecDeque<_>, _>>()?;
        Ok(ids)
    }
}

fn table(category: Category) -> &'static str {
    if category.is_call_log() {
        "calls"
    } else {
        "contacts"
    }
}

fn category_clause(category: Category) -> String {
    match category.call_type() {
        Some(call_type) => format!("call_type = {}", call_type as i64),
        None if category.is_call_log() => "1 = 1".to_string(),
        None => "in_visible_group = 1".to_string(),
    }
}

fn name_column(category: Category) -> &'static str {
    if category.is_call_log() {
        "cached_name"
    } else {
        "display_name"
    }
}

fn order_clause(category: Category, order: ListOrder) -> String {
    match order {
        ListOrder::IdAscending => "id ASC".to_string(),
        ListOrder::IdDescending => "id DESC".to_string(),
        ListOrder::NameAscending => {
            format!("{} COLLATE NOCASE ASC, id ASC", name_column(category))
        }
    }
}

/// SQL predicate and bound values for an identity match.
///
/// A set is bound as one JSON array so its size is not limited by the
/// number of host parameters SQLite accepts.
fn id_clause(ids: &IdMatch) -> Result<(String, Vec<Value>), SourceError> {
    Ok(match ids {
        IdMatch::Exact(id) => ("id = ?".to_string(), vec![Value::Integer(*id)]),
        IdMatch::Range { low, high } => (
            "id BETWEEN ? AND ?".to_string(),
            vec![Value::Integer(*low), Value::Integer(*high)],
        ),
        IdMatch::Set(set) if set.is_empty() => ("0 = 1".to_string(), Vec::new()),
        IdMatch::Set(set) => {
            let json = serde_json::to_string(set)
                .map_err(|e| SourceError::Corrupt(format!("identity set: {}", e)))?;
            (
                "id IN (SELECT value FROM json_each(?))".to_string(),
                vec![Value::Text(json)],
            )
        }
        IdMatch::All => ("1 = 1".to_string(), Vec::new()),
    })
}

fn handle_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, Option<String>)> {
    Ok((row.get(0)?, row.get(1)?))
}

/// Positional view backed by `LIMIT ... OFFSET ...` queries over one
/// ordering.
struct SqliteOrderedView<'a> {
    conn: &'a Connection,
    sql: String,
}

impl SqliteOrderedView<'_> {
    fn query(&self, start: usize, limit: usize) -> Result<Vec<RecordHandle>, SourceError> {
        let offset = i64::try_from(start - 1)
            .map_err(|_| SourceError::Corrupt(format!("ordinal {} out of range", start)))?;
        // SQLite treats any negative limit as unbounded.
        let limit = i64::try_from(limit).unwrap_or(-1);
        let mut stmt = self.conn.prepare_cached(&self.sql)?;
        let rows = stmt.query_map(params![limit, offset], handle_row)?;
        let mut handles = Vec::new();
        for (index, row) in rows.enumerate() {
            let (id, name) = row?;
            handles.push(RecordHandle {
                id,
                ordinal: start + index,
                name,
            });
        }
        Ok(handles)
    }
}

impl OrderedView for SqliteOrderedView<'_> {
    fn seek(&mut self, ordinal: usize) -> Result<Option<RecordHandle>, SourceError> {
        if ordinal == 0 {
            return Ok(None);
        }
        Ok(self.query(ordinal, 1)?.pop())
    }

    fn range(&mut self, start: usize, end: usize) -> Result<Vec<RecordHandle>, SourceError> {
        if start == 0 || start > end {
            return Ok(Vec::new());
        }
        self.query(start, end - start + 1)
    }
}

type Loader<T> = fn(&SqliteRecordSource, i64) -> Result<Option<T>, SourceError>;

/// Cursor over pre-selected identities; each record is loaded on demand.
struct SqliteCursor<'a, T> {
    source: &'a SqliteRecordSource,
    ids: VecDeque<i64>,
    load: Loader<T>,
}

impl<T> RecordCursor<T> for SqliteCursor<'_, T> {
    fn has_next(&self) -> bool {
        !self.ids.is_empty()
    }

    fn advance(&mut self) -> Result<T, SourceError> {
        let id = self.ids.pop_front().ok_or(SourceError::Exhausted)?;
        (self.load)(self.source, id)?.ok_or(SourceError::Vanished(id))
    }
}

impl RecordSource for SqliteRecordSource {
    fn count(&self, category: Category) -> Result<usize, SourceError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            table(category),
            category_clause(category)
        );
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| SourceError::Corrupt(format!("negative count {}", count)))
    }

    fn open_ordered(
        &self,
        category: Category,
        order: ListOrder,
    ) -> Result<Box<dyn OrderedView + '_>, SourceError> {
        let sql = format!(
            "SELECT id, {} FROM {} WHERE {} ORDER BY {} LIMIT ?1 OFFSET ?2",
            name_column(category),
            table(category),
            category_clause(category),
            order_clause(category, order),
        );
        Ok(Box::new(SqliteOrderedView {
            conn: &self.conn,
            sql,
        }))
    }

    fn select_contacts(
        &self,
        selection: &Selection,
    ) -> Result<Box<dyn RecordCursor<ContactRecord> + '_>, SourceError> {
        if selection.category.is_call_log() {
            return Err(SourceError::Corrupt(format!(
                "{:?} is not a contact category",
                selection.category
            )));
        }
        Ok(Box::new(SqliteCursor {
            source: self,
            ids: self.select_ids(selection)?,
            load: SqliteRecordSource::load_contact,
        }))
    }

    fn select_calls(
        &self,
        selection: &Selection,
    ) -> Result<Box<dyn RecordCursor<CallRecord> + '_>, SourceError> {
        if !selection.category.is_call_log() {
            return Err(SourceError::Corrupt(format!(
                "{:?} is not a call-log category",
                selection.category
            )));
        }
        Ok(Box::new(SqliteCursor {
            source: self,
            ids: self.select_ids(selection)?,
            load: SqliteRecordSource::load_call,
        }))
    }

    fn lookup_by_number(&self, number: &str) -> Result<Vec<RecordHandle>, SourceError> {
        let rows: Vec<(i64, Option<String>)> = if number.is_empty() {
            let mut stmt = self.conn.prepare(
                "SELECT id, display_name FROM contacts
                 WHERE in_visible_group = 1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], handle_row)?.collect::<Result<_, _>>()?;
            rows
        } else {
            let mut stmt = self.conn.prepare(
                "SELECT DISTINCT c.id, c.display_name
                 FROM contacts c JOIN contact_data d ON d.contact_id = c.id
                 WHERE d.kind = 'phone' AND d.value = ?1 AND c.in_visible_group = 1
                 ORDER BY c.id ASC",
            )?;
            let rows = stmt
                .query_map(params![number], handle_row)?
                .collect::<Result<_, _>>()?;
            rows
        };

        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(index, (id, name))| RecordHandle {
                id,
                ordinal: index + 1,
                name,
            })
            .collect())
    }
}
