use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{
    Connection, OptionalExtension, Row, ToSql, TransactionBehavior, params, params_from_iter,
};

use super::schema::SCHEMA;
use super::{MenuMerge, Store};
use crate::error::{Error, Result};
use crate::types::*;

/// First per-category item sequence, giving codes like `1211`.
const FIRST_ITEM_SEQUENCE: i64 = 11;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(*self)))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        Role::try_from(raw).map_err(|_| FromSqlError::OutOfRange(raw))
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

/// Concatenates a category code and a sequence number into an item code,
/// e.g. `(12, 11)` → `1211`.
fn item_code(category_code: i64, sequence: i64) -> Result<i64> {
    format!("{category_code}{sequence}")
        .parse()
        .map_err(|_| Error::Malformed(format!("item code overflow for category {category_code}")))
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

const MENU_COLUMNS: &str = "id, m_menu_sl, m_menu_name, m_category_id, company_id, branch_id, \
                            ingredients, m_cost, m_price, m_status, m_image";

fn menu_row(row: &Row<'_>) -> rusqlite::Result<MenuCacheRow> {
    Ok(MenuCacheRow {
        id: row.get(0)?,
        m_menu_sl: row.get(1)?,
        m_menu_name: row.get(2)?,
        m_category_id: row.get(3)?,
        company_id: row.get(4)?,
        branch_id: row.get(5)?,
        ingredients: row.get(6)?,
        m_cost: row.get(7)?,
        m_price: row.get(8)?,
        m_status: row.get(9)?,
        m_image: row.get(10)?,
    })
}

const RESERVATION_COLUMNS: &str =
    "id, name, phone, guest_number, event_name, notes, date, time, table_number";

fn reservation_row(row: &Row<'_>) -> rusqlite::Result<Reservation> {
    Ok(Reservation {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        guest_number: row.get(3)?,
        event_name: row.get(4)?,
        notes: row.get(5)?,
        date: row.get(6)?,
        time: row.get(7)?,
        table_number: row.get(8)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password, phone, address, apartment, district_id, \
                            thana_id, role, photo_url, created_at";

fn user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        apartment: row.get(6)?,
        district_id: row.get(7)?,
        thana_id: row.get(8)?,
        role: row.get(9)?,
        photo_url: row.get(10)?,
        created_at: parse_datetime(&row.get::<_, String>(11)?),
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Settings

    fn get_company_code(&self) -> Result<Option<String>> {
        let code: Option<String> = self
            .conn()
            .query_row(
                "SELECT company_code FROM settings WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(code.filter(|c| !c.trim().is_empty()))
    }

    fn set_company_code(&self, code: &str) -> Result<()> {
        self.conn().execute(
            "INSERT INTO settings (id, company_code, updated_at) VALUES (1, ?1, datetime('now'))
             ON CONFLICT(id) DO UPDATE SET company_code = excluded.company_code,
                                           updated_at = excluded.updated_at",
            params![code],
        )?;
        Ok(())
    }

    // POS menu cache

    fn list_menu_cache(&self) -> Result<Vec<MenuCacheRow>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MENU_COLUMNS} FROM menu ORDER BY company_id, id"
        ))?;

        let rows = stmt.query_map([], menu_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn replace_menu_cache(&self, company_id: i64, merge: &MenuMerge<'_>) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let snapshot: ImageSnapshot = {
            let mut stmt = tx.prepare(
                "SELECT m_menu_sl, m_image FROM menu WHERE m_image IS NOT NULL AND m_image != ''",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect::<std::result::Result<_, _>>()?
        };

        let replacement = merge(&snapshot);

        tx.execute("DELETE FROM menu WHERE company_id = ?1", params![company_id])?;

        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO menu ({MENU_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ))?;
            for row in &replacement {
                stmt.execute(params![
                    row.id,
                    row.m_menu_sl,
                    row.m_menu_name,
                    row.m_category_id,
                    row.company_id,
                    row.branch_id,
                    row.ingredients,
                    row.m_cost,
                    row.m_price,
                    row.m_status,
                    row.m_image,
                ])?;
            }
        }

        tx.commit()?;
        Ok(replacement.len())
    }

    fn get_menu_images(&self, serials: &[String]) -> Result<ImageSnapshot> {
        if serials.is_empty() {
            return Ok(ImageSnapshot::new());
        }

        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT m_menu_sl, m_image FROM menu
             WHERE m_image IS NOT NULL AND m_image != '' AND m_menu_sl IN ({})",
            placeholders(serials.len())
        ))?;

        let rows = stmt.query_map(params_from_iter(serials), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;

        rows.collect::<std::result::Result<_, _>>()
            .map_err(Error::from)
    }

    fn set_menu_image(&self, serial: &str, image: &str) -> Result<usize> {
        let rows = self.conn().execute(
            "UPDATE menu SET m_image = ?1 WHERE m_menu_sl = ?2",
            params![image, serial],
        )?;
        Ok(rows)
    }

    // Local catalog

    fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name, code FROM menu_categories ORDER BY name")?;

        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                code: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_category(&self, name: &str) -> Result<Category> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let code: i64 = tx.query_row(
            "SELECT COALESCE(MAX(code), 10) + 1 FROM menu_categories",
            [],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO menu_categories (name, code, next_item_seq) VALUES (?1, ?2, ?3)",
            params![name, code, FIRST_ITEM_SEQUENCE],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(Category {
            id,
            name: name.to_string(),
            code,
        })
    }

    fn list_menu_items(&self) -> Result<Vec<MenuItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT mi.id, mi.category_id, mi.name, mi.description, mi.price, mi.code, mc.name
             FROM menu_items mi
             LEFT JOIN menu_categories mc ON mi.category_id = mc.code
             ORDER BY mi.id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(MenuItem {
                id: row.get(0)?,
                category_id: row.get(1)?,
                name: row.get(2)?,
                description: row.get(3)?,
                price: row.get(4)?,
                code: row.get(5)?,
                category_name: row.get(6)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn create_menu_item(&self, item: &MenuItemInput) -> Result<MenuItem> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let category: Option<(String, i64)> = tx
            .query_row(
                "SELECT name, next_item_seq FROM menu_categories WHERE code = ?1",
                params![item.category_code],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (category_name, mut sequence) = category.ok_or(Error::NotFound)?;

        // Skip codes already held by rows imported before the counter existed.
        let code = loop {
            let candidate = item_code(item.category_code, sequence)?;
            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM menu_items WHERE code = ?1)",
                params![candidate],
                |row| row.get(0),
            )?;
            if !taken {
                break candidate;
            }
            sequence += 1;
        };

        tx.execute(
            "UPDATE menu_categories SET next_item_seq = ?1 WHERE code = ?2",
            params![sequence + 1, item.category_code],
        )?;
        tx.execute(
            "INSERT INTO menu_items (category_id, name, description, price, code)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.category_code,
                item.name,
                item.description,
                item.price,
                code
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(MenuItem {
            id,
            category_id: item.category_code,
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            code,
            category_name: Some(category_name),
        })
    }

    fn update_menu_item(&self, id: i64, item: &MenuItemInput) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE menu_items SET name = ?1, category_id = ?2, price = ?3, description = ?4
             WHERE id = ?5",
            params![
                item.name,
                item.category_code,
                item.price,
                item.description,
                id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_menu_items(&self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let rows = self.conn().execute(
            &format!(
                "DELETE FROM menu_items WHERE id IN ({})",
                placeholders(ids.len())
            ),
            params_from_iter(ids),
        )?;
        Ok(rows)
    }

    // Reservations

    fn create_reservation(&self, reservation: &ReservationInput) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO reservation (name, phone, guest_number, event_name, notes, date, time, table_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                reservation.name,
                reservation.phone,
                reservation.guest_number,
                reservation.event_name,
                reservation.notes,
                reservation.date,
                reservation.time,
                reservation.table_number,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_reservation(&self, id: i64) -> Result<Option<Reservation>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {RESERVATION_COLUMNS} FROM reservation WHERE id = ?1"),
            params![id],
            reservation_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_reservations(&self) -> Result<Vec<Reservation>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservation ORDER BY date DESC, time ASC"
        ))?;

        let rows = stmt.query_map([], reservation_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_reservation(&self, id: i64, reservation: &ReservationInput) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE reservation
             SET name = ?1, phone = ?2, guest_number = ?3, event_name = ?4, notes = ?5,
                 date = ?6, time = ?7, table_number = ?8
             WHERE id = ?9",
            params![
                reservation.name,
                reservation.phone,
                reservation.guest_number,
                reservation.event_name,
                reservation.notes,
                reservation.date,
                reservation.time,
                reservation.table_number,
                id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_reservation(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM reservation WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Users

    fn create_user(&self, user: &NewUser) -> Result<i64> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (name, email, password, role) VALUES (?1, ?2, ?3, ?4)",
            params![user.name, user.email, user.password_hash, user.role],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_profile(&self, profile: &ProfileUpdate) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users
             SET name = ?1, phone = ?2, address = ?3, apartment = ?4, district_id = ?5,
                 thana_id = ?6, photo_url = COALESCE(?7, photo_url)
             WHERE id = ?8",
            params![
                profile.name,
                profile.phone,
                profile.address,
                profile.apartment,
                profile.district_id,
                profile.thana_id,
                profile.photo_url,
                profile.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn list_districts(&self) -> Result<Vec<District>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name FROM district ORDER BY name")?;

        let rows = stmt.query_map([], |row| {
            Ok(District {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_thanas(&self, district_id: i64) -> Result<Vec<Thana>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, district_id FROM thana WHERE district_id = ?1 ORDER BY name",
        )?;

        let rows = stmt.query_map(params![district_id], |row| {
            Ok(Thana {
                id: row.get(0)?,
                name: row.get(1)?,
                district_id: row.get(2)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Site content

    fn create_review(&self, name: &str, review_text: &str, rating: i64) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO review (name, review_text, rating) VALUES (?1, ?2, ?3)",
            params![name, review_text, rating],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_reviews(&self) -> Result<Vec<Review>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, review_text, rating, created_at
             FROM review ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Review {
                id: row.get(0)?,
                name: row.get(1)?,
                review_text: row.get(2)?,
                rating: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_about(&self) -> Result<Option<About>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, heading, text, image FROM about ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok(About {
                    id: row.get(0)?,
                    heading: row.get(1)?,
                    text: row.get(2)?,
                    image: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn replace_about(
        &self,
        heading: &str,
        text: &str,
        image: Option<&str>,
    ) -> Result<(i64, Vec<String>)> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let old_images: Vec<String> = {
            let mut stmt = tx.prepare("SELECT image FROM about WHERE image IS NOT NULL")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<std::result::Result<_, _>>()?
        };

        tx.execute("DELETE FROM about", [])?;
        tx.execute(
            "INSERT INTO about (heading, text, image) VALUES (?1, ?2, ?3)",
            params![heading, text, image],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok((id, old_images))
    }

    fn get_hero(&self) -> Result<Option<Hero>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, image FROM hero ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok(Hero {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    image: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn replace_hero(&self, name: &str, image: &str) -> Result<Vec<String>> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let old_images: Vec<String> = {
            let mut stmt = tx.prepare("SELECT image FROM hero")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<std::result::Result<_, _>>()?
        };

        tx.execute("DELETE FROM hero", [])?;
        tx.execute(
            "INSERT INTO hero (name, image) VALUES (?1, ?2)",
            params![name, image],
        )?;

        tx.commit()?;
        Ok(old_images)
    }

    fn list_table_layout(&self) -> Result<Vec<TableLayoutItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, label, table_number, capacity, shape, rotation, pos_x, pos_y, type,
                    is_bookable, width, height
             FROM table_layout ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(TableLayoutItem {
                id: row.get(0)?,
                label: row.get(1)?,
                table_number: row.get(2)?,
                capacity: row.get(3)?,
                shape: row.get(4)?,
                rotation: row.get(5)?,
                pos_x: row.get(6)?,
                pos_y: row.get(7)?,
                kind: row.get(8)?,
                is_bookable: row.get(9)?,
                width: row.get(10)?,
                height: row.get(11)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn replace_table_layout(&self, layout: &[TableLayoutItem]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM table_layout", [])?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO table_layout (id, label, table_number, capacity, shape, rotation,
                                           pos_x, pos_y, type, is_bookable, width, height)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for item in layout {
                stmt.execute(params![
                    item.id,
                    item.label,
                    item.table_number,
                    item.capacity,
                    item.shape,
                    item.rotation,
                    item.pos_x,
                    item.pos_y,
                    item.kind,
                    item.is_bookable,
                    item.width,
                    item.height,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.conn()
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}
