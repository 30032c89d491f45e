use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ProjectSummary, TeamSummary};
use crate::reducer::{collect_unique, Identified, ReduceError};
use crate::types::GlobalRole;

/// Active user row. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub telephone_number: String,
    pub university: String,
    pub department: String,
    pub date_of_birth: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub role: GlobalRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user shape embedded in team, project and news payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub university: String,
    pub department: String,
}

impl Identified for UserSummary {
    fn id(&self) -> i32 {
        self.id
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            university: user.university.clone(),
            department: user.department.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub telephone_number: String,
    pub university: String,
    pub department: String,
    pub date_of_birth: DateTime<Utc>,
    pub role: GlobalRole,
}

/// Partial update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub telephone_number: Option<String>,
    pub university: Option<String>,
    pub department: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub role: Option<GlobalRole>,
}

/// One row of `users × teams × projects` for a single user
#[derive(Debug, Clone, FromRow)]
pub struct UserJoinRow {
    #[sqlx(flatten)]
    pub user: User,
    pub team_id: Option<i32>,
    pub team_name: Option<String>,
    pub team_description: Option<String>,
    pub project_id: Option<i32>,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
}

impl UserJoinRow {
    fn team(&self) -> Option<TeamSummary> {
        self.team_id.map(|id| TeamSummary {
            id,
            name: self.team_name.clone().unwrap_or_default(),
            description: self.team_description.clone().unwrap_or_default(),
        })
    }

    fn project(&self) -> Option<ProjectSummary> {
        self.project_id.map(|id| ProjectSummary {
            id,
            name: self.project_name.clone().unwrap_or_default(),
            description: self.project_description.clone().unwrap_or_default(),
        })
    }
}

/// User with every active team and project they belong to
#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    #[serde(flatten)]
    pub user: User,
    pub teams: Vec<TeamSummary>,
    pub projects: Vec<ProjectSummary>,
}

impl UserDetails {
    pub fn from_rows(rows: &[UserJoinRow]) -> Result<Self, ReduceError> {
        let first = rows.first().ok_or(ReduceError::NotFound("User"))?;

        Ok(Self {
            user: first.user.clone(),
            teams: collect_unique(rows, UserJoinRow::team),
            projects: collect_unique(rows, UserJoinRow::project),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 3,
            name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@lab.test".into(),
            password: "$argon2id$secret".into(),
            telephone_number: String::new(),
            university: "UCL".into(),
            department: "Maths".into(),
            date_of_birth: now,
            role: GlobalRole::Member,
            created_at: now,
            updated_at: now,
        }
    }

    fn row(team: Option<i32>, project: Option<i32>) -> UserJoinRow {
        UserJoinRow {
            user: user(),
            team_id: team,
            team_name: team.map(|id| format!("team {}", id)),
            team_description: team.map(|_| String::new()),
            project_id: project,
            project_name: project.map(|id| format!("project {}", id)),
            project_description: project.map(|_| String::new()),
        }
    }

    #[test]
    fn password_is_never_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "member");
    }

    #[test]
    fn user_details_dedupes_teams_and_projects() {
        let rows = vec![row(Some(1), Some(10)), row(Some(1), Some(11)), row(Some(2), Some(10))];
        let details = UserDetails::from_rows(&rows).unwrap();

        let teams: Vec<i32> = details.teams.iter().map(|t| t.id).collect();
        let projects: Vec<i32> = details.projects.iter().map(|p| p.id).collect();
        assert_eq!(teams, vec![1, 2]);
        assert_eq!(projects, vec![10, 11]);
    }

    #[test]
    fn user_without_memberships_has_empty_lists() {
        let details = UserDetails::from_rows(&[row(None, None)]).unwrap();
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["teams"], serde_json::json!([]));
        assert_eq!(json["projects"], serde_json::json!([]));
        assert_eq!(json["email"], "ada@lab.test");
    }

    #[test]
    fn no_rows_means_no_user() {
        assert!(matches!(
            UserDetails::from_rows(&[]),
            Err(ReduceError::NotFound("User"))
        ));
    }
}
