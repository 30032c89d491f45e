//! Folding flat join rows into one parent with nested relation lists.
//!
//! A detail query left-joins several one-to-many relations onto a single
//! parent, so the result set is their Cartesian product: every lead is
//! repeated once per (project, member) pair and so on. Each relation is
//! collected independently and deduplicated by primary key, first
//! occurrence wins, which keeps the query's `ORDER BY` as the output order.

use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReduceError {
    /// The detail query returned no rows for the parent
    #[error("{0} not found")]
    NotFound(&'static str),
}

/// Anything with a primary key the reducer can deduplicate on
pub trait Identified {
    fn id(&self) -> i32;
}

/// One row of a parent × leads × related × members join.
/// A relation accessor returns `None` when that part of the row did not match.
pub trait JoinRow {
    /// Entity name used in the not-found error
    const ENTITY: &'static str;

    type Parent;
    type Person: Identified;
    type Related: Identified;

    fn parent(&self) -> Self::Parent;
    fn lead(&self) -> Option<Self::Person>;
    fn member(&self) -> Option<Self::Person>;
    fn related(&self) -> Option<Self::Related>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reduced<P, U, R> {
    pub parent: P,
    pub leads: Vec<U>,
    pub members: Vec<U>,
    pub related: Vec<R>,
}

/// Reduce the rows of one parent. Parent scalars come from the first row.
pub fn reduce<J: JoinRow>(rows: &[J]) -> Result<Reduced<J::Parent, J::Person, J::Related>, ReduceError> {
    let first = rows.first().ok_or(ReduceError::NotFound(J::ENTITY))?;

    Ok(Reduced {
        parent: first.parent(),
        leads: collect_unique(rows, J::lead),
        members: collect_unique(rows, J::member),
        related: collect_unique(rows, J::related),
    })
}

/// Collect one relation across all rows.
///
/// If the first row has no match for the relation the result is empty: with
/// independent left joins an existing relation appears on every row. Otherwise
/// every matching row contributes, keeping the first occurrence of each id.
pub fn collect_unique<R, T, F>(rows: &[R], extract: F) -> Vec<T>
where
    T: Identified,
    F: Fn(&R) -> Option<T>,
{
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    if extract(first).is_none() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(&extract)
        .filter(|item| seen.insert(item.id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entity(i32);

    impl Identified for Entity {
        fn id(&self) -> i32 {
            self.0
        }
    }

    #[derive(Debug, Clone)]
    struct Row {
        team: (i32, &'static str),
        lead: Option<i32>,
        project: Option<i32>,
        member: Option<i32>,
    }

    impl JoinRow for Row {
        const ENTITY: &'static str = "Team";

        type Parent = (i32, &'static str);
        type Person = Entity;
        type Related = Entity;

        fn parent(&self) -> Self::Parent {
            self.team
        }

        fn lead(&self) -> Option<Entity> {
            self.lead.map(Entity)
        }

        fn member(&self) -> Option<Entity> {
            self.member.map(Entity)
        }

        fn related(&self) -> Option<Entity> {
            self.project.map(Entity)
        }
    }

    fn row(lead: Option<i32>, project: Option<i32>, member: Option<i32>) -> Row {
        Row {
            team: (1, "Robotics"),
            lead,
            project,
            member,
        }
    }

    fn ids(items: &[Entity]) -> Vec<i32> {
        items.iter().map(Entity::id).collect()
    }

    #[test]
    fn two_rows_collapse_into_one_team() {
        let rows = vec![row(Some(1), Some(1), Some(7)), row(Some(1), Some(2), Some(7))];
        let reduced = reduce(&rows).unwrap();

        assert_eq!(reduced.parent, (1, "Robotics"));
        assert_eq!(ids(&reduced.leads), vec![1]);
        assert_eq!(ids(&reduced.members), vec![7]);
        assert_eq!(ids(&reduced.related), vec![1, 2]);
    }

    #[test]
    fn all_null_row_yields_empty_lists() {
        let reduced = reduce(&[row(None, None, None)]).unwrap();

        assert!(reduced.leads.is_empty());
        assert!(reduced.members.is_empty());
        assert!(reduced.related.is_empty());
    }

    #[test]
    fn empty_result_set_is_not_found() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(reduce(&rows), Err(ReduceError::NotFound("Team")));
    }

    #[test]
    fn cartesian_product_keeps_first_seen_order() {
        // leads {4, 2} × projects {9} × members {5, 3}
        let rows = vec![
            row(Some(4), Some(9), Some(5)),
            row(Some(4), Some(9), Some(3)),
            row(Some(2), Some(9), Some(5)),
            row(Some(2), Some(9), Some(3)),
        ];
        let reduced = reduce(&rows).unwrap();

        assert_eq!(ids(&reduced.leads), vec![4, 2]);
        assert_eq!(ids(&reduced.members), vec![5, 3]);
        assert_eq!(ids(&reduced.related), vec![9]);
    }

    #[test]
    fn relations_are_gated_independently() {
        let rows = vec![row(None, Some(3), Some(8)), row(None, Some(4), Some(8))];
        let reduced = reduce(&rows).unwrap();

        assert!(reduced.leads.is_empty());
        assert_eq!(ids(&reduced.members), vec![8]);
        assert_eq!(ids(&reduced.related), vec![3, 4]);
    }

    #[test]
    fn first_row_without_match_empties_the_relation() {
        let rows = vec![row(None, None, None), row(Some(6), None, None)];
        assert!(reduce(&rows).unwrap().leads.is_empty());
    }

    #[test]
    fn reducing_the_output_again_is_stable() {
        let rows = vec![
            row(Some(1), Some(1), Some(7)),
            row(Some(1), Some(2), Some(7)),
            row(Some(3), Some(1), Some(8)),
            row(Some(3), Some(2), Some(8)),
        ];
        let first = reduce(&rows).unwrap();

        // One row per entity, padded with unmatched columns
        let longest = first.leads.len().max(first.members.len()).max(first.related.len());
        let flattened: Vec<Row> = (0..longest)
            .map(|i| {
                row(
                    first.leads.get(i).map(Entity::id),
                    first.related.get(i).map(Entity::id),
                    first.members.get(i).map(Entity::id),
                )
            })
            .collect();
        let second = reduce(&flattened).unwrap();

        assert_eq!(second, first);
    }
}
