//! CRUD layer over the key/value store. All invariants the handlers rely on
//! live here: unique project/category names (kept in name index tables),
//! vote upsert by (project, user), and the explicit cascade when a project is
//! deleted.

use ratezilla_database::basic_db::SafeDatabase;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    unix_now, Category, Contract, Project, SocialMetrics, StoredLogo, User, Vote,
};

pub const PROJECTS: &str = "projects";
pub const PROJECT_NAMES: &str = "project_names";
pub const CATEGORIES: &str = "categories";
pub const CATEGORY_NAMES: &str = "category_names";
pub const CONTRACTS: &str = "contracts";
pub const SOCIAL_METRICS: &str = "social_metrics";
pub const VOTES: &str = "votes";
pub const USERS: &str = "users";
pub const LOGOS: &str = "logos";
pub const SEQUENCES: &str = "sequences";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContract {
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub contract_type: String,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub blockchain: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<u64>,
    #[serde(default)]
    pub contracts: Vec<NewContract>,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct Store<T: SafeDatabase> {
    db: T,
}

impl<T: SafeDatabase> Store<T> {
    pub fn new(db: T) -> Self {
        Self { db }
    }

    fn db_err(e: libmdbx::Error) -> StoreError {
        StoreError::Database(e.to_string())
    }

    fn ser_err(e: serde_json::Error) -> StoreError {
        StoreError::Serialization(e.to_string())
    }

    fn get_json<V: DeserializeOwned>(&self, key: &str, table: &str) -> Result<Option<V>, StoreError> {
        let raw = self.db.read(key, table).map_err(Self::db_err)?;
        match raw {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(Self::ser_err)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn put_json<V: Serialize>(&self, key: &str, table: &str, value: &V) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(Self::ser_err)?;
        self.db.write(key, &json, table).map_err(Self::db_err)
    }

    fn all_json<V: DeserializeOwned>(&self, table: &str) -> Result<Vec<V>, StoreError> {
        let entries = self.db.read_all(table).map_err(Self::db_err)?;
        let mut values = Vec::with_capacity(entries.len());
        for (_, bytes) in entries {
            values.push(serde_json::from_slice(&bytes).map_err(Self::ser_err)?);
        }
        Ok(values)
    }

    fn next_id(&self, entity: &str) -> Result<u64, StoreError> {
        self.db.increment(entity, SEQUENCES).map_err(Self::db_err)
    }

    // ---- projects ----

    pub fn create_project(&self, new: NewProject) -> Result<Project, StoreError> {
        if self.db.read(&new.name, PROJECT_NAMES).map_err(Self::db_err)?.is_some() {
            return Err(StoreError::Conflict(
                "A project with that name already exists".to_string(),
            ));
        }
        for category_id in &new.category_ids {
            self.get_category(*category_id)?;
        }
        for contract in &new.contracts {
            if self.db.read(&contract.address, CONTRACTS).map_err(Self::db_err)?.is_some() {
                return Err(StoreError::Conflict(format!(
                    "A contract with address {} already exists",
                    contract.address
                )));
            }
        }

        let id = self.next_id("project")?;
        let now = unix_now();
        let project = Project {
            id,
            name: new.name,
            description: new.description,
            website: new.website,
            github_url: new.github_url,
            twitter_url: new.twitter_url,
            logo_url: new.logo_url,
            blockchain: new.blockchain.unwrap_or_else(|| "stellar".to_string()),
            category_ids: new.category_ids,
            created_at: now,
            updated_at: now,
        };

        self.put_json(&id.to_string(), PROJECTS, &project)?;
        self.db
            .write(&project.name, &id.to_string(), PROJECT_NAMES)
            .map_err(Self::db_err)?;
        self.put_json(&id.to_string(), SOCIAL_METRICS, &SocialMetrics::zeroed(id))?;

        for contract in new.contracts {
            let record = Contract {
                name: contract.name,
                address: contract.address.clone(),
                contract_type: contract.contract_type,
                project_id: id,
                interactions: 0,
                last_interaction: now,
            };
            self.put_json(&contract.address, CONTRACTS, &record)?;
        }

        Ok(project)
    }

    pub fn get_project(&self, id: u64) -> Result<Project, StoreError> {
        self.get_json(&id.to_string(), PROJECTS)?
            .ok_or_else(|| StoreError::NotFound("Project not found".to_string()))
    }

    pub fn find_project_by_name(&self, name: &str) -> Result<Project, StoreError> {
        let raw = self.db.read(name, PROJECT_NAMES).map_err(Self::db_err)?;
        let id = raw
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| StoreError::NotFound("Project not found".to_string()))?;
        self.get_project(id)
    }

    pub fn list_projects(&self, blockchain: Option<&str>) -> Result<Vec<Project>, StoreError> {
        let mut projects: Vec<Project> = self.all_json(PROJECTS)?;
        if let Some(chain) = blockchain {
            projects.retain(|p| p.blockchain == chain);
        }
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    pub fn project_count(&self) -> Result<usize, StoreError> {
        Ok(self.db.read_all(PROJECTS).map_err(Self::db_err)?.len())
    }

    pub fn update_project(&self, id: u64, new: NewProject) -> Result<Project, StoreError> {
        let existing = self.get_project(id)?;

        if new.name != existing.name {
            let taken = self.db.read(&new.name, PROJECT_NAMES).map_err(Self::db_err)?;
            if taken.is_some() {
                return Err(StoreError::Conflict(
                    "A project with that name already exists".to_string(),
                ));
            }
        }
        for category_id in &new.category_ids {
            self.get_category(*category_id)?;
        }

        let project = Project {
            id,
            name: new.name,
            description: new.description,
            website: new.website,
            github_url: new.github_url,
            twitter_url: new.twitter_url,
            logo_url: new.logo_url,
            blockchain: new.blockchain.unwrap_or_else(|| "stellar".to_string()),
            category_ids: new.category_ids,
            created_at: existing.created_at,
            updated_at: unix_now(),
        };

        if project.name != existing.name {
            self.db.delete(&existing.name, PROJECT_NAMES).map_err(Self::db_err)?;
            self.db
                .write(&project.name, &id.to_string(), PROJECT_NAMES)
                .map_err(Self::db_err)?;
        }
        self.put_json(&id.to_string(), PROJECTS, &project)?;
        Ok(project)
    }

    /// Deletes dependent rows first, then the project itself. The cascade is
    /// explicit and sequential, matching the delete endpoint contract.
    pub fn delete_project(&self, id: u64) -> Result<(), StoreError> {
        let project = self.get_project(id)?;
        let key = id.to_string();

        self.db.delete(&key, SOCIAL_METRICS).map_err(Self::db_err)?;

        for vote in self.votes_for_project(id)? {
            let vote_key = vote_key(id, &vote.user_id);
            self.db.delete(&vote_key, VOTES).map_err(Self::db_err)?;
        }

        for contract in self.contracts_for_project(id)? {
            self.db.delete(&contract.address, CONTRACTS).map_err(Self::db_err)?;
        }

        self.db.delete(&project.name, PROJECT_NAMES).map_err(Self::db_err)?;
        self.db.delete(&key, PROJECTS).map_err(Self::db_err)?;
        Ok(())
    }

    // ---- votes ----

    /// Upserts the user's vote for a project. Unknown users are registered on
    /// first vote; there is no authentication, the address is only a voter key.
    pub fn submit_vote(&self, project_id: u64, user_id: &str, value: f64) -> Result<Vote, StoreError> {
        self.get_project(project_id)?;

        if self.db.read(user_id, USERS).map_err(Self::db_err)?.is_none() {
            let user = User {
                address: user_id.to_string(),
                created_at: unix_now(),
            };
            self.put_json(user_id, USERS, &user)?;
        }

        let vote = Vote {
            project_id,
            user_id: user_id.to_string(),
            value,
        };
        self.put_json(&vote_key(project_id, user_id), VOTES, &vote)?;
        Ok(vote)
    }

    pub fn votes_for_project(&self, project_id: u64) -> Result<Vec<Vote>, StoreError> {
        let mut votes: Vec<Vote> = self.all_json(VOTES)?;
        votes.retain(|v| v.project_id == project_id);
        Ok(votes)
    }

    /// Seeds voter records in one batch. Used at startup only.
    pub fn register_users(&self, addresses: &[&str]) -> Result<(), StoreError> {
        let now = unix_now();
        let mut items = Vec::with_capacity(addresses.len());
        for address in addresses {
            let user = User {
                address: address.to_string(),
                created_at: now,
            };
            let json = serde_json::to_string(&user).map_err(Self::ser_err)?;
            items.push((address.to_string(), json));
        }
        self.db.batch_write(&items, USERS).map_err(Self::db_err)
    }

    // ---- categories ----

    pub fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        if self.db.read(&new.name, CATEGORY_NAMES).map_err(Self::db_err)?.is_some() {
            return Err(StoreError::Conflict(
                "A category with that name already exists".to_string(),
            ));
        }

        let id = self.next_id("category")?;
        let category = Category {
            id,
            name: new.name,
            description: new.description,
        };
        self.put_json(&id.to_string(), CATEGORIES, &category)?;
        self.db
            .write(&category.name, &id.to_string(), CATEGORY_NAMES)
            .map_err(Self::db_err)?;
        Ok(category)
    }

    pub fn get_category(&self, id: u64) -> Result<Category, StoreError> {
        self.get_json(&id.to_string(), CATEGORIES)?
            .ok_or_else(|| StoreError::NotFound("Category not found".to_string()))
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> = self.all_json(CATEGORIES)?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    pub fn category_project_count(&self, category_id: u64) -> Result<usize, StoreError> {
        let projects: Vec<Project> = self.all_json(PROJECTS)?;
        Ok(projects
            .iter()
            .filter(|p| p.category_ids.contains(&category_id))
            .count())
    }

    pub fn update_category(&self, id: u64, new: NewCategory) -> Result<Category, StoreError> {
        let existing = self.get_category(id)?;

        if new.name != existing.name {
            let taken = self.db.read(&new.name, CATEGORY_NAMES).map_err(Self::db_err)?;
            if taken.is_some() {
                return Err(StoreError::Conflict(
                    "A category with that name already exists".to_string(),
                ));
            }
            self.db.delete(&existing.name, CATEGORY_NAMES).map_err(Self::db_err)?;
            self.db
                .write(&new.name, &id.to_string(), CATEGORY_NAMES)
                .map_err(Self::db_err)?;
        }

        let category = Category {
            id,
            name: new.name,
            description: new.description,
        };
        self.put_json(&id.to_string(), CATEGORIES, &category)?;
        Ok(category)
    }

    /// Removes the category and drops its id from every referencing project.
    pub fn delete_category(&self, id: u64) -> Result<(), StoreError> {
        let category = self.get_category(id)?;

        let projects: Vec<Project> = self.all_json(PROJECTS)?;
        for mut project in projects {
            if project.category_ids.contains(&id) {
                project.category_ids.retain(|c| *c != id);
                self.put_json(&project.id.to_string(), PROJECTS, &project)?;
            }
        }

        self.db.delete(&category.name, CATEGORY_NAMES).map_err(Self::db_err)?;
        self.db.delete(&id.to_string(), CATEGORIES).map_err(Self::db_err)?;
        Ok(())
    }

    // ---- contracts ----

    pub fn contract_by_address(&self, address: &str) -> Result<Contract, StoreError> {
        self.get_json(address, CONTRACTS)?
            .ok_or_else(|| StoreError::NotFound("Contract not found".to_string()))
    }

    pub fn contracts_for_project(&self, project_id: u64) -> Result<Vec<Contract>, StoreError> {
        let mut contracts: Vec<Contract> = self.all_json(CONTRACTS)?;
        contracts.retain(|c| c.project_id == project_id);
        contracts.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(contracts)
    }

    pub fn record_interaction(&self, address: &str) -> Result<Contract, StoreError> {
        let mut contract = self.contract_by_address(address)?;
        contract.interactions += 1;
        contract.last_interaction = unix_now();
        self.put_json(address, CONTRACTS, &contract)?;
        Ok(contract)
    }

    // ---- social metrics ----

    pub fn metrics_for_project(&self, project_id: u64) -> Result<SocialMetrics, StoreError> {
        self.get_json(&project_id.to_string(), SOCIAL_METRICS)?
            .ok_or_else(|| StoreError::NotFound("Social metrics not found".to_string()))
    }

    pub fn save_metrics(&self, metrics: &SocialMetrics) -> Result<(), StoreError> {
        self.put_json(&metrics.project_id.to_string(), SOCIAL_METRICS, metrics)
    }

    // ---- logos ----

    pub fn save_logo(&self, filename: &str, logo: &StoredLogo) -> Result<(), StoreError> {
        self.put_json(filename, LOGOS, logo)
    }

    pub fn get_logo(&self, filename: &str) -> Result<StoredLogo, StoreError> {
        self.get_json(filename, LOGOS)?
            .ok_or_else(|| StoreError::NotFound("Logo not found".to_string()))
    }
}

fn vote_key(project_id: u64, user_id: &str) -> String {
    format!("{project_id}:{user_id}")
}

/// Mean vote value, 0 when there are no votes.
pub fn average_rating(votes: &[Vote]) -> f64 {
    if votes.is_empty() {
        return 0.0;
    }
    votes.iter().map(|v| v.value).sum::<f64>() / votes.len() as f64
}
