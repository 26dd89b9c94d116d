use libmdbx::{Database, DatabaseOptions, WriteMap, WriteFlags, TableFlags};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::path::Path;

#[derive(Clone)]
pub struct InnerDatabase {
    db: Arc<Mutex<Database<WriteMap>>>,
}

/// Key/value storage used by every handler. Values are JSON strings, keys are
/// entity keys (numeric ids rendered as strings, names, addresses). Tables are
/// created lazily on first write.
pub trait SafeDatabase: Clone + Send + Sync + 'static {

    fn new<P: AsRef<Path>>(path: P) -> Result<Self, libmdbx::Error> where Self: Sized;

    fn write(&self, key: &str, value: &str, table: &str) -> Result<(), libmdbx::Error>;

    fn read(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>, libmdbx::Error>;

    fn read_all(&self, table: &str) -> Result<HashMap<Vec<u8>, Vec<u8>>, libmdbx::Error>;

    /// Removes a key. Returns false when the key (or the table) did not exist.
    fn delete(&self, key: &str, table: &str) -> Result<bool, libmdbx::Error>;

    /// Bumps a named counter inside a single write transaction and returns the
    /// new value. First call for a key yields 1.
    fn increment(&self, key: &str, table: &str) -> Result<u64, libmdbx::Error>;

    fn batch_write<K, V>(&self, items: &[(K, V)], table: &str) -> Result<(), libmdbx::Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>;
}


impl SafeDatabase for InnerDatabase {

    fn new<P: AsRef<Path>>(path: P) -> Result<Self, libmdbx::Error> {
        let mut options = DatabaseOptions::default();
        options.max_tables = Some(100);
        let db = Database::<WriteMap>::open_with_options(path, options)?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    fn write(&self, key: &str, value: &str, table: &str) -> Result<(), libmdbx::Error> {
        let db = self.db.lock().expect("Failed to lock database mutex");
        let transaction = db.begin_rw_txn()?;
        let table = transaction.create_table(Some(table), TableFlags::default())?;

        transaction.put(&table, key, value, WriteFlags::default())?;
        transaction.commit()?;
        Ok(())
    }

    fn read(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>, libmdbx::Error> {
        let db = self.db.lock().expect("Failed to lock database mutex");
        let transaction = db.begin_ro_txn()?;

        if let Ok(table) = transaction.open_table(Some(table)) {
            let result = transaction.get(&table, key.as_bytes())?;
            return Ok(result);
        }

        Ok(None)
    }

    fn read_all(&self, table: &str) -> Result<HashMap<Vec<u8>, Vec<u8>>, libmdbx::Error> {
        let mut map = HashMap::new();
        let db = self.db.lock().expect("Failed to lock database mutex");
        let transaction = db.begin_ro_txn()?;

        if let Ok(table) = transaction.open_table(Some(table)) {
            let cursor = transaction.cursor(&table)?;

            for item in cursor {
                let (key, value): (std::borrow::Cow<'_, [u8]>, std::borrow::Cow<'_, [u8]>) = item?;
                map.insert(key.into_owned(), value.into_owned());
            }
        }

        Ok(map)
    }

    fn delete(&self, key: &str, table: &str) -> Result<bool, libmdbx::Error> {
        let db = self.db.lock().expect("Failed to lock database mutex");
        let transaction = db.begin_rw_txn()?;

        if let Ok(table) = transaction.open_table(Some(table)) {
            let removed = transaction.del(&table, key, None)?;
            transaction.commit()?;
            return Ok(removed);
        }

        Ok(false)
    }

    fn increment(&self, key: &str, table: &str) -> Result<u64, libmdbx::Error> {
        let db = self.db.lock().expect("Failed to lock database mutex");
        let transaction = db.begin_rw_txn()?;
        let table = transaction.create_table(Some(table), TableFlags::default())?;

        let current: Option<Vec<u8>> = transaction.get(&table, key.as_bytes())?;
        // A counter that no longer parses must not restart at 1, that would
        // hand out ids already in use.
        let next = match current {
            Some(raw) => {
                String::from_utf8(raw)
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .ok_or(libmdbx::Error::Corrupted)?
                    + 1
            }
            None => 1,
        };

        transaction.put(&table, key, next.to_string(), WriteFlags::default())?;
        transaction.commit()?;
        Ok(next)
    }

    fn batch_write<K, V>(&self, items: &[(K, V)], table: &str) -> Result<(), libmdbx::Error>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let db = self.db.lock().expect("Failed to lock database mutex");
        let transaction = db.begin_rw_txn()?;
        let table = transaction.create_table(Some(table), TableFlags::default())?;

        for (key, value) in items {
            transaction.put(&table, key, value, WriteFlags::default())?;
        }

        transaction.commit()?;
        Ok(())
    }
}
