use serde::{Deserialize, Serialize};

/// Which biography section a document feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Mission,
    Education,
    Jobs,
    Charities,
}

/// Where a dataset is cached, fetched from and mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetConfig {
    pub dataset: Dataset,
    pub heading: &'static str,
    pub cache_key: &'static str,
    pub locator: &'static str,
    pub mount_id: &'static str,
}

pub static DATASETS: [DatasetConfig; 4] = [
    DatasetConfig {
        dataset: Dataset::Mission,
        heading: "Mission",
        cache_key: "mission-data",
        locator: "data/mission.json",
        mount_id: "mission-block",
    },
    DatasetConfig {
        dataset: Dataset::Education,
        heading: "Education",
        cache_key: "education-data",
        locator: "data/schools.json",
        mount_id: "education-block",
    },
    DatasetConfig {
        dataset: Dataset::Jobs,
        heading: "Experience",
        cache_key: "job-data",
        locator: "data/jobs.json",
        mount_id: "job-block",
    },
    DatasetConfig {
        dataset: Dataset::Charities,
        heading: "Charities",
        cache_key: "charity-data",
        locator: "data/charities.json",
        mount_id: "charity-block",
    },
];

impl Dataset {
    pub fn config(self) -> &'static DatasetConfig {
        match self {
            Dataset::Mission => &DATASETS[0],
            Dataset::Education => &DATASETS[1],
            Dataset::Jobs => &DATASETS[2],
            Dataset::Charities => &DATASETS[3],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mission {
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct School {
    pub name: String,
    pub link: String,
    pub image: String,
    pub degree: String,
    pub attended: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    pub company: String,
    pub link: String,
    pub image: String,
    pub role: String,
    pub attended: String,
    pub description: String,
    pub experience_gained: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Charity {
    pub name: String,
    pub link: String,
    pub image: String,
    pub description: String,
    pub contribution: String,
}
