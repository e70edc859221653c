use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(ChainId);
id_newtype!(LocationId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Dev,
    Qa,
    Stage,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Dev,
        Environment::Qa,
        Environment::Stage,
        Environment::Prod,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Stage => "stage",
            Environment::Prod => "prod",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Environment::Dev => "Development",
            Environment::Qa => "QA",
            Environment::Stage => "Staging",
            Environment::Prod => "Production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown environment '{0}' (expected dev, qa, stage or prod)")]
pub struct ParseEnvironmentError(pub String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ParseEnvironmentError(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppKind {
    #[serde(rename = "UI")]
    Ui,
    Backend,
}

impl AppKind {
    pub fn label(self) -> &'static str {
        match self {
            AppKind::Ui => "UI",
            AppKind::Backend => "Backend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub url: String,
    pub kind: AppKind,
    pub source_code_url: String,
    pub ci_url: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentGroup {
    pub environment: Environment,
    pub apps: Vec<Application>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalAddress {
    pub address_type: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub postal_code_extension: String,
    pub country: String,
}

/// A business chain as returned by the business search; the parent of its locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub row_number: u32,
    pub sales_organization_code: String,
    pub sales_organization_name: String,
    pub sales_channel_code: String,
    pub sales_channel_name: String,
    pub partner_id: String,
    pub partner_name: String,
    pub partner_group_id: String,
    pub partner_group_name: String,
    pub super_chain_id: String,
    pub super_chain_name: String,
    pub chain_id: ChainId,
    pub chain_entity_id: String,
    pub chain_name: String,
    pub dba_name: String,
    pub legal_name: String,
    pub federal_tax_id: String,
    pub physical_address: PhysicalAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub chain_id: ChainId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub is_active: bool,
}

impl Location {
    /// Single-line postal form used for map lookups.
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.address, self.city, self.state, self.postal_code
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationStats {
    pub active: usize,
    pub inactive: usize,
}

impl LocationStats {
    pub fn from_locations<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Self {
        locations
            .into_iter()
            .fold(Self::default(), |mut stats, location| {
                if location.is_active {
                    stats.active += 1;
                } else {
                    stats.inactive += 1;
                }
                stats
            })
    }

    pub fn total(&self) -> usize {
        self.active + self.inactive
    }
}
