use std::sync::Arc;

use ratezilla_database::basic_db::SafeDatabase;
use ratezilla_service::store::Store;
use ratezilla_social::github::GitHubClient;
use ratezilla_social::twitter::TwitterClient;

/// Shared handler state: the store plus the outbound API clients. The Twitter
/// client is behind an `Arc` because its rate gate must be shared by every
/// request.
#[derive(Clone)]
pub struct AppState<T: SafeDatabase> {
    pub store: Store<T>,
    pub github: GitHubClient,
    pub twitter: Arc<TwitterClient>,
    pub horizon_override: Option<String>,
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    use ratezilla_database::basic_db::InnerDatabase;
    use tempfile::TempDir;

    pub fn test_state() -> (TempDir, AppState<InnerDatabase>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = InnerDatabase::new(dir.path().join("db")).expect("database");
        (dir, state_with(db))
    }

    /// Delegates to a real database but fails every read against one table,
    /// for exercising handler behavior on storage errors.
    #[derive(Clone)]
    pub struct FlakyDb {
        inner: InnerDatabase,
        fail_read_table: &'static str,
    }

    pub fn flaky_state(fail_read_table: &'static str) -> (TempDir, AppState<FlakyDb>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let inner = InnerDatabase::new(dir.path().join("db")).expect("database");
        let db = FlakyDb {
            inner,
            fail_read_table,
        };
        (dir, state_with(db))
    }

    fn state_with<T: SafeDatabase>(db: T) -> AppState<T> {
        AppState {
            store: Store::new(db),
            github: GitHubClient::new(None),
            twitter: Arc::new(TwitterClient::new(None)),
            horizon_override: None,
        }
    }

    impl SafeDatabase for FlakyDb {
        fn new<P: AsRef<Path>>(path: P) -> Result<Self, libmdbx::Error> {
            Ok(Self {
                inner: InnerDatabase::new(path)?,
                fail_read_table: "",
            })
        }

        fn write(&self, key: &str, value: &str, table: &str) -> Result<(), libmdbx::Error> {
            self.inner.write(key, value, table)
        }

        fn read(&self, key: &str, table: &str) -> Result<Option<Vec<u8>>, libmdbx::Error> {
            if table == self.fail_read_table {
                return Err(libmdbx::Error::Corrupted);
            }
            self.inner.read(key, table)
        }

        fn read_all(&self, table: &str) -> Result<HashMap<Vec<u8>, Vec<u8>>, libmdbx::Error> {
            if table == self.fail_read_table {
                return Err(libmdbx::Error::Corrupted);
            }
            self.inner.read_all(table)
        }

        fn delete(&self, key: &str, table: &str) -> Result<bool, libmdbx::Error> {
            self.inner.delete(key, table)
        }

        fn increment(&self, key: &str, table: &str) -> Result<u64, libmdbx::Error> {
            self.inner.increment(key, table)
        }

        fn batch_write<K, V>(&self, items: &[(K, V)], table: &str) -> Result<(), libmdbx::Error>
        where
            K: AsRef<[u8]>,
            V: AsRef<[u8]>,
        {
            self.inner.batch_write(items, table)
        }
    }
}
