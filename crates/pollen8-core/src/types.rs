use chrono::{DateTime, NaiveDate, Utc};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::{Pollen8Error, Result};

pub type UserId = Uuid;
pub type ConnectionId = Uuid;
pub type InviteId = Uuid;

/// Weight assigned to every connection when accumulating network value.
#[allow(clippy::approx_constant)]
pub const CONNECTION_VALUE: f64 = 3.14;

/// Industry tag on a profile. Deserializes from either `"Tech"` or `{ "name": "Tech" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "NamedTag")]
pub struct Industry {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "NamedTag")]
pub struct Interest {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedTag {
    Bare(String),
    Named { name: String },
}

impl NamedTag {
    fn into_name(self) -> String {
        match self {
            NamedTag::Bare(name) | NamedTag::Named { name } => name,
        }
    }
}

impl From<NamedTag> for Industry {
    fn from(tag: NamedTag) -> Self {
        Self {
            name: tag.into_name(),
        }
    }
}

impl From<NamedTag> for Interest {
    fn from(tag: NamedTag) -> Self {
        Self {
            name: tag.into_name(),
        }
    }
}

impl Industry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Interest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Directed edge from one user to another in the social graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub id: ConnectionId,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub connected_user_id: UserId,
    #[serde(default = "Connection::default_value")]
    pub connection_value: f64,
    pub connected_at: DateTime<Utc>,
    #[serde(default)]
    pub industries: Vec<String>,
}

impl Connection {
    pub fn new(user_id: UserId, connected_user_id: UserId, connected_at: DateTime<Utc>) -> Self {
        Self {
            id: ConnectionId::new_v4(),
            user_id,
            connected_user_id,
            connection_value: CONNECTION_VALUE,
            connected_at,
            industries: Vec::new(),
        }
    }

    fn default_value() -> f64 {
        CONNECTION_VALUE
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.connection_value = value;
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industries.push(industry.into());
        self
    }

    pub fn with_industries<I, S>(mut self, industries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.industries.extend(industries.into_iter().map(Into::into));
        self
    }
}

/// Profile fields that feed the strength score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub industries: Vec<Industry>,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn with_industries<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.industries
            .extend(names.into_iter().map(|n| Industry::new(n)));
        self
    }

    pub fn with_interests<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests
            .extend(names.into_iter().map(|n| Interest::new(n)));
        self
    }

    pub fn with_location(mut self, city: Option<&str>, zip_code: Option<&str>) -> Self {
        self.city = city.map(str::to_string);
        self.zip_code = zip_code.map(str::to_string);
        self
    }

    /// A location field counts only when set to something other than whitespace.
    pub fn has_city(&self) -> bool {
        is_present(self.city.as_deref())
    }

    pub fn has_zip_code(&self) -> bool {
        is_present(self.zip_code.as_deref())
    }
}

fn is_present(field: Option<&str>) -> bool {
    field.is_some_and(|v| !v.trim().is_empty())
}

/// Shareable invite code owned by a user, with per-day click counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteLink {
    #[serde(default)]
    pub id: InviteId,
    #[serde(default)]
    pub user_id: UserId,
    pub code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "InviteLink::default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub click_count: u64,
    #[serde(default)]
    pub daily_clicks: BTreeMap<NaiveDate, u64>,
}

impl InviteLink {
    pub fn new(user_id: UserId, code_length: usize, created_at: DateTime<Utc>) -> Self {
        Self::with_code(user_id, generate_invite_code(code_length), created_at)
    }

    pub fn with_code(user_id: UserId, code: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: InviteId::new_v4(),
            user_id,
            code: code.into(),
            created_at,
            is_active: true,
            click_count: 0,
            daily_clicks: BTreeMap::new(),
        }
    }

    fn default_active() -> bool {
        true
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn record_click(&mut self, at: DateTime<Utc>) -> Result<()> {
        if !self.is_active {
            return Err(Pollen8Error::invalid_input(format!(
                "invite {} is inactive",
                self.code
            )));
        }
        self.click_count += 1;
        *self.daily_clicks.entry(at.date_naive()).or_insert(0) += 1;
        Ok(())
    }

    pub fn clicks_on(&self, date: NaiveDate) -> u64 {
        self.daily_clicks.get(&date).copied().unwrap_or(0)
    }
}

/// Random ASCII alphanumeric code.
pub fn generate_invite_code(length: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), length)
}
