pub const SCHEMA: &str = r#"
-- Singleton row holding the POS tenant identifier
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    company_code TEXT NOT NULL,
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Mirror of the POS catalog; rebuilt per company on every sync
CREATE TABLE IF NOT EXISTS menu (
    id INTEGER NOT NULL,              -- item id assigned by the POS
    m_menu_sl TEXT NOT NULL,          -- POS serial, stable across syncs
    m_menu_name TEXT NOT NULL,
    m_category_id INTEGER,
    company_id INTEGER NOT NULL,
    branch_id TEXT,                   -- e.g. "1-2"
    ingredients TEXT,                 -- JSON array
    m_cost REAL NOT NULL DEFAULT 0,
    m_price REAL NOT NULL DEFAULT 0,
    m_status INTEGER NOT NULL DEFAULT 1,
    m_image TEXT,                     -- locally uploaded, survives resync

    UNIQUE(company_id, m_menu_sl)
);

-- Locally authored catalog
CREATE TABLE IF NOT EXISTS menu_categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    code INTEGER NOT NULL UNIQUE,
    next_item_seq INTEGER NOT NULL DEFAULT 11,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS menu_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id INTEGER NOT NULL,     -- menu_categories.code
    name TEXT NOT NULL,
    description TEXT,
    price REAL NOT NULL DEFAULT 0,
    code INTEGER NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS district (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS thana (
    id INTEGER PRIMARY KEY,
    district_id INTEGER NOT NULL REFERENCES district(id) ON DELETE CASCADE,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,           -- bcrypt hash
    phone TEXT,
    address TEXT,
    apartment TEXT,
    district_id INTEGER REFERENCES district(id) ON DELETE SET NULL,
    thana_id INTEGER REFERENCES thana(id) ON DELETE SET NULL,
    role INTEGER NOT NULL DEFAULT 1,  -- 1 customer, 2 admin
    photo_url TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- No overlap constraint: several bookings may claim the same table and slot
CREATE TABLE IF NOT EXISTS reservation (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    guest_number INTEGER NOT NULL,
    event_name TEXT,
    notes TEXT,
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    table_number TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS review (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    review_text TEXT NOT NULL,
    rating INTEGER NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS about (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    heading TEXT NOT NULL,
    text TEXT NOT NULL,
    image TEXT
);

CREATE TABLE IF NOT EXISTS hero (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    image TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS table_layout (
    id TEXT PRIMARY KEY,
    label TEXT,
    table_number TEXT,
    capacity INTEGER NOT NULL DEFAULT 0,
    shape TEXT NOT NULL DEFAULT 'square',
    rotation REAL NOT NULL DEFAULT 0,
    pos_x REAL NOT NULL DEFAULT 0,
    pos_y REAL NOT NULL DEFAULT 0,
    type TEXT,
    is_bookable INTEGER NOT NULL DEFAULT 0,
    width REAL NOT NULL DEFAULT 100,
    height REAL NOT NULL DEFAULT 100
);

CREATE INDEX IF NOT EXISTS idx_menu_serial ON menu(m_menu_sl);
CREATE INDEX IF NOT EXISTS idx_menu_items_category ON menu_items(category_id);
CREATE INDEX IF NOT EXISTS idx_thana_district ON thana(district_id);
CREATE INDEX IF NOT EXISTS idx_reservation_date ON reservation(date, time);
"#;
