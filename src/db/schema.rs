//! DDL for the two inventory tables.
//! Written in the common subset understood by both MySQL and SQLite.

/// `DigitalDisplay.modelNo` is not a declared foreign key; the storage layer
/// checks the reference on insert/update and removes orphaned models on delete.
pub const INVENTORY_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS Model (
    modelNo VARCHAR(64) NOT NULL PRIMARY KEY,
    width DOUBLE NOT NULL,
    height DOUBLE NOT NULL,
    weight DOUBLE NOT NULL,
    depth DOUBLE NOT NULL,
    screenSize DOUBLE NOT NULL
);

CREATE TABLE IF NOT EXISTS DigitalDisplay (
    serialNo VARCHAR(64) NOT NULL PRIMARY KEY,
    schedulerSystem VARCHAR(64) NOT NULL,
    modelNo VARCHAR(64) NOT NULL
);
"#;
