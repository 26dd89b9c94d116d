//! Startup seed: the initial Stellar project directory plus a handful of dummy
//! voters so listing pages have ratings to show. Runs only against an empty
//! store.

use ratezilla_database::basic_db::SafeDatabase;

use crate::store::{NewProject, Store, StoreError};

const SEED_USERS: [&str; 5] = [
    "GUSERDUMMYADDRESS0",
    "GUSERDUMMYADDRESS1",
    "GUSERDUMMYADDRESS2",
    "GUSERDUMMYADDRESS3",
    "GUSERDUMMYADDRESS4",
];

const SEED_VOTE_VALUES: [f64; 5] = [4.0, 3.5, 4.5, 3.0, 5.0];

struct SeedProject {
    name: &'static str,
    description: &'static str,
    website: &'static str,
    github_url: &'static str,
    twitter_url: &'static str,
}

const STELLAR_PROJECTS: [SeedProject; 6] = [
    SeedProject {
        name: "Blend",
        description: "Blend Capital Protocol",
        website: "https://docs.blend.capital/mainnet-deployments",
        github_url: "https://github.com/blend-capital",
        twitter_url: "https://x.com/blend_capital",
    },
    SeedProject {
        name: "FxDAO",
        description: "FxDAO Protocol",
        website: "https://fxdao.io/",
        github_url: "https://github.com/FxDAO/",
        twitter_url: "https://x.com/FxDAO_io",
    },
    SeedProject {
        name: "Soroswap",
        description: "Soroswap Finance",
        website: "https://app.soroswap.finance/",
        github_url: "https://github.com/soroswap/",
        twitter_url: "https://x.com/SoroswapFinance",
    },
    SeedProject {
        name: "Phoenix-hub",
        description: "Phoenix Protocol",
        website: "https://www.phoenix-hub.io/",
        github_url: "https://github.com/Phoenix-Protocol-Group",
        twitter_url: "https://x.com/PhoenixDefiHub",
    },
    SeedProject {
        name: "Aquarius",
        description: "Aqua Network",
        website: "https://aqua.network/",
        github_url: "https://github.com/AquaToken",
        twitter_url: "https://x.com/aqua_token",
    },
    SeedProject {
        name: "KALE farm",
        description: "KALE Farm Protocol",
        website: "https://kalefarm.xyz/",
        github_url: "https://github.com/kalepail/KALE-sc",
        twitter_url: "https://x.com/kaleonstellar",
    },
];

/// Returns the number of projects seeded, zero when the store already has data.
pub fn seed_if_empty<T: SafeDatabase>(store: &Store<T>) -> Result<usize, StoreError> {
    if store.project_count()? > 0 {
        return Ok(0);
    }

    store.register_users(&SEED_USERS)?;

    for (index, seed) in STELLAR_PROJECTS.iter().enumerate() {
        let project = store.create_project(NewProject {
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            website: Some(seed.website.to_string()),
            github_url: Some(seed.github_url.to_string()),
            twitter_url: Some(seed.twitter_url.to_string()),
            blockchain: Some("stellar".to_string()),
            ..NewProject::default()
        })?;

        // Rotate the fixed spread so projects do not all share one average.
        for (offset, user) in SEED_USERS.iter().enumerate() {
            let value = SEED_VOTE_VALUES[(index + offset) % SEED_VOTE_VALUES.len()];
            store.submit_vote(project.id, user, value)?;
        }
    }

    Ok(STELLAR_PROJECTS.len())
}


#[cfg(test)]
mod tests {
    use super::*;
    use ratezilla_database::basic_db::InnerDatabase;
    use tempfile::tempdir;

    #[test]
    fn seeds_once_and_only_once() {
        let dir = tempdir().unwrap();
        let db = InnerDatabase::new(dir.path().join("db")).unwrap();
        let store = Store::new(db);

        assert_eq!(seed_if_empty(&store).unwrap(), 6);
        assert_eq!(seed_if_empty(&store).unwrap(), 0);

        let projects = store.list_projects(Some("stellar")).unwrap();
        assert_eq!(projects.len(), 6);
        for project in &projects {
            assert_eq!(store.votes_for_project(project.id).unwrap().len(), 5);
        }
    }
}
