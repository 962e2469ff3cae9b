//!
//! Connection Options
//!
//! Recognized keys (all boolean):
//! - "open-read-only"    - restrict to read access
//! - "open-create"       - create the file if absent (default true)
//! - "open-no-mutex"     - disable the engine's internal locking
//! - "open-shared-cache" - use the engine's shared page cache
//!
//! Any other key is an UNKNOWN-OPTION error so that typos never pass silently.
//!

use quarry_std_core::{Item, Record};
use rusqlite::OpenFlags;

use crate::error::{Result, SqliteError};

pub const OPT_READ_ONLY: &str = "open-read-only";
pub const OPT_CREATE: &str = "open-create";
pub const OPT_NO_MUTEX: &str = "open-no-mutex";
pub const OPT_SHARED_CACHE: &str = "open-shared-cache";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    pub read_only: bool,
    pub create: bool,
    pub no_mutex: bool,
    pub shared_cache: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            create: true,
            no_mutex: false,
            shared_cache: false,
        }
    }
}

impl ConnectOptions {
    pub fn from_record(record: &Record) -> Result<Self> {
        let mut options = Self::default();
        for (key, value) in record {
            let slot = match key.as_str() {
                OPT_READ_ONLY => &mut options.read_only,
                OPT_CREATE => &mut options.create,
                OPT_NO_MUTEX => &mut options.no_mutex,
                OPT_SHARED_CACHE => &mut options.shared_cache,
                _ => return Err(SqliteError::UnknownOption(key.clone())),
            };
            *slot = match value {
                Item::Boolean(b) => *b,
                other => {
                    return Err(SqliteError::InvalidValue(format!(
                        "option '{}' must be a boolean, got {}",
                        key,
                        other.kind()
                    )));
                }
            };
        }
        Ok(options)
    }

    /// Native open flags. Read-only never requests read-write, and the
    /// engine rejects read-only together with create, so read-only wins.
    pub fn open_flags(&self) -> OpenFlags {
        let mut flags = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            let mut f = OpenFlags::SQLITE_OPEN_READ_WRITE;
            if self.create {
                f |= OpenFlags::SQLITE_OPEN_CREATE;
            }
            f
        };
        if self.no_mutex {
            flags |= OpenFlags::SQLITE_OPEN_NO_MUTEX;
        }
        if self.shared_cache {
            flags |= OpenFlags::SQLITE_OPEN_SHARED_CACHE;
        }
        flags
    }

    /// Flag names joined with " | ", for diagnostics
    pub fn describe(&self) -> String {
        let flags = self.open_flags();
        let names = [
            (OpenFlags::SQLITE_OPEN_CREATE, "SQLITE_OPEN_CREATE"),
            (OpenFlags::SQLITE_OPEN_READ_ONLY, "SQLITE_OPEN_READONLY"),
            (OpenFlags::SQLITE_OPEN_READ_WRITE, "SQLITE_OPEN_READWRITE"),
            (OpenFlags::SQLITE_OPEN_NO_MUTEX, "SQLITE_OPEN_NOMUTEX"),
            (OpenFlags::SQLITE_OPEN_SHARED_CACHE, "SQLITE_OPEN_SHAREDCACHE"),
        ];
        names
            .iter()
            .filter(|(flag, _)| flags.contains(*flag))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Item)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let options = ConnectOptions::from_record(&Record::new()).unwrap();
        assert_eq!(options, ConnectOptions::default());
        assert!(options.create);
        assert_eq!(options.describe(), "SQLITE_OPEN_CREATE | SQLITE_OPEN_READWRITE");
    }

    #[test]
    fn test_all_recognized_keys() {
        let options = ConnectOptions::from_record(&record(&[
            (OPT_READ_ONLY, Item::Boolean(false)),
            (OPT_CREATE, Item::Boolean(false)),
            (OPT_NO_MUTEX, Item::Boolean(true)),
            (OPT_SHARED_CACHE, Item::Boolean(true)),
        ]))
        .unwrap();
        assert!(!options.create);
        assert!(options.no_mutex);
        assert!(options.shared_cache);
        let flags = options.open_flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_WRITE));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_NO_MUTEX));
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_SHARED_CACHE));
    }

    #[test]
    fn test_read_only_excludes_read_write_and_create() {
        let options =
            ConnectOptions::from_record(&record(&[(OPT_READ_ONLY, Item::Boolean(true))])).unwrap();
        let flags = options.open_flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_READ_WRITE));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
        assert_eq!(options.describe(), "SQLITE_OPEN_READONLY");
    }

    #[test]
    fn test_unknown_key() {
        let err = ConnectOptions::from_record(&record(&[("frobnicate", Item::Boolean(true))]))
            .unwrap_err();
        assert_eq!(err, SqliteError::UnknownOption("frobnicate".to_string()));
    }

    #[test]
    fn test_non_boolean_value() {
        let err = ConnectOptions::from_record(&record(&[(OPT_CREATE, Item::from("yes"))]))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID-VALUE");
    }
}
