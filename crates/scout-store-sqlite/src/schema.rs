//! SQL schema for the storage tooling database.
//!
//! Executed once at connection startup. Every statement is idempotent, so
//! reopening an existing file is safe.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Label tables: one row per distinct name.
CREATE TABLE IF NOT EXISTS zone (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS switch (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS fabric (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS health (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS status (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS entitytype (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Stack topology. Stacks are updated in place; webpools and webs are
-- insert-if-absent.
CREATE TABLE IF NOT EXISTS stacks (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    stack          TEXT NOT NULL UNIQUE,
    locallocation  TEXT NOT NULL,
    prodlocation   TEXT NOT NULL,
    remotelocation TEXT NOT NULL,
    datecreated    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS webpools (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    stackid     INTEGER NOT NULL REFERENCES stacks(id),
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS webs (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    webpoolid   INTEGER NOT NULL REFERENCES webpools(id),
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Cleared and fully reloaded on every pass.
CREATE TABLE IF NOT EXISTS customers (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    contextid   TEXT NOT NULL,
    customer    TEXT NOT NULL,
    status      INTEGER NOT NULL CHECK (status IN (0, 1)),
    stackid     TEXT NOT NULL,
    datecreated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- One row per pass; AUTOINCREMENT keeps ids monotonic and never reused.
CREATE TABLE IF NOT EXISTS run (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    capturedatetime TEXT NOT NULL
);

-- Fabric snapshots are append-only. No UPDATE is ever issued against them.
CREATE TABLE IF NOT EXISTS sannaventities (
    runid        INTEGER NOT NULL REFERENCES run(id),
    id           TEXT NOT NULL,
    wwn          TEXT NOT NULL,
    portnumber   TEXT NOT NULL,
    slotnumber   TEXT NOT NULL,
    remotewwn    TEXT NOT NULL,
    ipaddress    TEXT NOT NULL,
    devicename   TEXT NOT NULL CHECK (length(devicename) <= 50),
    entitytypeid INTEGER NOT NULL REFERENCES entitytype(id),
    fabricid     INTEGER NOT NULL REFERENCES fabric(id),
    healthid     INTEGER NOT NULL REFERENCES health(id),
    statusid     INTEGER NOT NULL REFERENCES status(id),
    switchid     INTEGER NOT NULL REFERENCES switch(id),
    zoneid       INTEGER NOT NULL REFERENCES zone(id),
    datecreated  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (runid, id)
);
CREATE TABLE IF NOT EXISTS activezones (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    runid          INTEGER NOT NULL,
    sannaventityid TEXT NOT NULL,
    zoneid         INTEGER NOT NULL REFERENCES zone(id),
    datecreated    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (runid, sannaventityid) REFERENCES sannaventities(runid, id)
);

-- Last successful refresh per source family; always exactly one row.
CREATE TABLE IF NOT EXISTS updatetracking (
    id             INTEGER PRIMARY KEY CHECK (id = 1),
    stacks         TEXT,
    customers      TEXT,
    sannaventities TEXT
);
INSERT OR IGNORE INTO updatetracking (id) VALUES (1);

CREATE INDEX IF NOT EXISTS run_capture_idx         ON run(capturedatetime);
CREATE INDEX IF NOT EXISTS activezones_run_idx     ON activezones(runid);
CREATE INDEX IF NOT EXISTS customers_contextid_idx ON customers(contextid);

PRAGMA user_version = 1;
";
