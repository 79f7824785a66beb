pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    key         TEXT NOT NULL UNIQUE,
    label       TEXT NOT NULL,
    icon        TEXT NOT NULL DEFAULT '',
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS user_categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id    TEXT NOT NULL,
    category_id INTEGER NOT NULL REFERENCES categories(id),
    created_at  TEXT NOT NULL,
    deleted_at  TEXT,
    UNIQUE(owner_id, category_id)
);

CREATE TABLE IF NOT EXISTS budgets (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id         TEXT NOT NULL,
    name             TEXT NOT NULL,
    starting_amount  TEXT NOT NULL,
    current_amount   TEXT NOT NULL,
    is_active        BOOLEAN NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_budgets_owner ON budgets(owner_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_budgets_one_active ON budgets(owner_id) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS transactions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    budget_id    INTEGER NOT NULL REFERENCES budgets(id),
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    kind         TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
    description  TEXT NOT NULL,
    amount       TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    deleted_at   TEXT
);

CREATE INDEX IF NOT EXISTS idx_transactions_budget ON transactions(budget_id);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

CREATE TABLE IF NOT EXISTS category_budgets (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    budget_id       INTEGER NOT NULL REFERENCES budgets(id),
    category_id     INTEGER NOT NULL REFERENCES categories(id),
    planned_amount  TEXT NOT NULL,
    UNIQUE(budget_id, category_id)
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
