use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ProjectSummary, UserSummary};
use crate::reducer::{reduce, Identified, JoinRow, ReduceError};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Team {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl Identified for TeamSummary {
    fn id(&self) -> i32 {
        self.id
    }
}

/// Flattened row of `teams × leads × projects × members`
#[derive(Debug, Clone, Default, FromRow)]
pub struct TeamJoinRow {
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

    pub project_id: Option<i32>,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
}

impl JoinRow for TeamJoinRow {
    const ENTITY: &'static str = "Team";

    type Parent = TeamSummary;
    type Person = UserSummary;
    type Related = ProjectSummary;

    fn parent(&self) -> TeamSummary {
        TeamSummary {
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

    fn related(&self) -> Option<ProjectSummary> {
        self.project_id.map(|id| ProjectSummary {
            id,
            name: self.project_name.clone().unwrap_or_default(),
            description: self.project_description.clone().unwrap_or_default(),
        })
    }
}

/// Team with its leads, members and linked projects
#[derive(Debug, Clone, Serialize)]
pub struct TeamDetails {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub leads: Vec<UserSummary>,
    pub members: Vec<UserSummary>,
    pub projects: Vec<ProjectSummary>,
}

impl TeamDetails {
    pub fn from_rows(rows: &[TeamJoinRow]) -> Result<Self, ReduceError> {
        let reduced = reduce(rows)?;

        Ok(Self {
            id: reduced.parent.id,
            name: reduced.parent.name,
            description: reduced.parent.description,
            leads: reduced.leads,
            members: reduced.members,
            projects: reduced.related,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(lead: Option<i32>, project: Option<i32>, member: Option<i32>) -> TeamJoinRow {
        TeamJoinRow {
            id: 1,
            name: "Vision".into(),
            description: "Computer vision group".into(),
            lead_id: lead,
            lead_name: lead.map(|id| format!("lead {}", id)),
            member_id: member,
            member_name: member.map(|id| format!("member {}", id)),
            project_id: project,
            project_name: project.map(|id| format!("project {}", id)),
            ..Default::default()
        }
    }

    #[test]
    fn details_serialize_nested_lists() {
        let rows = vec![row(Some(1), Some(1), Some(5)), row(Some(1), Some(2), Some(5))];
        let details = TeamDetails::from_rows(&rows).unwrap();
        let body = serde_json::to_value(&details).unwrap();

        assert_eq!(body["id"], 1);
        assert_eq!(body["leads"].as_array().unwrap().len(), 1);
        assert_eq!(body["leads"][0]["name"], "lead 1");
        assert_eq!(body["members"][0]["id"], 5);
        assert_eq!(body["projects"][1]["name"], "project 2");
    }

    #[test]
    fn lonely_team_serializes_empty_arrays() {
        let details = TeamDetails::from_rows(&[row(None, None, None)]).unwrap();
        let body = serde_json::to_value(&details).unwrap();

        assert_eq!(body["leads"], json!([]));
        assert_eq!(body["members"], json!([]));
        assert_eq!(body["projects"], json!([]));
    }
}
