use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{TeamSummary, UserSummary};
use crate::reducer::{reduce, Identified, JoinRow, ReduceError};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl Identified for ProjectSummary {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Flattened row of `projects × leads × teams × members`
#[derive(Debug, Clone, Default, FromRow)]
pub struct ProjectJoinRow {
    pub id: i32,
    pub name: String,
    pub description: String,

    pub lead_id: Option<i32>,
    pub lead_name: Option<String>,
    pub lead_last_name: Option<String>,
    pub lead_email: Option<String>,
    pub lead_university: Option<String>,
    pub lead_department: Option<String>,

    pub member_id: Option<i32>,
    pub member_name: Option<String>,
    pub member_last_name: Option<String>,
    pub member_email: Option<String>,
    pub member_university: Option<String>,
    pub member_department: Option<String>,

    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub team_description: Option<String>,
}

impl JoinRow for ProjectJoinRow {
    const ENTITY: &'static str = "Project";

    type Parent = ProjectSummary;
    type Person = UserSummary;
    type Related = TeamSummary;

    fn parent(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    fn lead(&self) -> Option<UserSummary> {
        self.lead_id.map(|id| UserSummary {
            id,
            name: self.lead_name.clone().unwrap_or_default(),
            last_name: self.lead_last_name.clone().unwrap_or_default(),
            email: self.lead_email.clone().unwrap_or_default(),
            university: self.lead_university.clone().unwrap_or_default(),
            department: self.lead_department.clone().unwrap_or_default(),
        })
    }

    fn member(&self) -> Option<UserSummary> {
        self.member_id.map(|id| UserSummary {
            id,
            name: self.member_name.clone().unwrap_or_default(),
            last_name: self.member_last_name.clone().unwrap_or_default(),
            email: self.member_email.clone().unwrap_or_default(),
            university: self.member_university.clone().unwrap_or_default(),
            department: self.member_department.clone().unwrap_or_default(),
        })
    }

    fn related(&self) -> Option<TeamSummary> {
        self.team_id.map(|id| TeamSummary {
            id,
            name: self.team_name.clone().unwrap_or_default(),
            description: self.team_description.clone().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub leads: Vec<UserSummary>,
    pub members: Vec<UserSummary>,
    pub teams: Vec<TeamSummary>,
}

impl ProjectDetails {
    pub fn from_rows(rows: &[ProjectJoinRow]) -> Result<Self, ReduceError> {
        let reduced = reduce(rows)?;

        Ok(Self {
            id: reduced.parent.id,
            name: reduced.parent.name,
            description: reduced.parent.description,
            leads: reduced.leads,
            members: reduced.members,
            teams: reduced.related,
        })
    }
}
