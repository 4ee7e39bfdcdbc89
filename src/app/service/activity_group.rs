use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{TITLE_REQUIRED, is_blank, is_empty};
use crate::app::models::{ActivityGroup, Empty, NewActivityGroup, Outcome};
use crate::app::repository::ActivityGroupRepository;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateActivityGroup {
    pub title: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateActivityGroup {
    pub title: Option<String>,
}

fn not_found<T>(id: i64) -> Outcome<T> {
    Outcome::NotFound(format!("Activity with ID {} Not Found", id))
}

pub struct ActivityGroupService<R> {
    repo: R,
}

impl<R: ActivityGroupRepository> ActivityGroupService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[cfg(test)]
    pub(crate) fn repository(&self) -> &R {
        &self.repo
    }

    /// Groups for `email` when one is given, otherwise every group. Child
    /// items are always stripped.
    pub fn list(&self, email: Option<&str>) -> Result<Outcome<Vec<ActivityGroup>>> {
        let email = email.filter(|e| !e.is_empty());
        info!(filtered = email.is_some(), "Listing activity groups");
        let groups = match email {
            Some(email) => {
                debug!(email, "Filtering activity groups by email");
                self.repo.find_by_email_capped(email)?
            }
            None => self.repo.find_all_capped()?,
        };
        Ok(Outcome::Success(
            groups.into_iter().map(ActivityGroup::without_items).collect(),
        ))
    }

    pub fn get(&self, id: i64) -> Result<Outcome<ActivityGroup>> {
        info!(id, "Fetching activity group");
        if !self.repo.exists_by_id(id)? {
            return Ok(not_found(id));
        }
        Ok(match self.repo.find_by_id(id)? {
            Some(group) => Outcome::Success(group),
            None => not_found(id),
        })
    }

    pub fn create(&self, request: CreateActivityGroup) -> Result<Outcome<ActivityGroup>> {
        info!("Creating activity group");
        if is_empty(request.title.as_deref()) {
            warn!("Rejected activity group without title");
            return Ok(Outcome::BadRequest(TITLE_REQUIRED));
        }

        let now = Utc::now();
        let draft = NewActivityGroup {
            title: request.title.unwrap_or_default(),
            email: request.email,
            created_at: now,
            updated_at: now,
        };
        let group = self.repo.insert(&draft)?;
        debug!(id = group.id, "Activity group created");
        Ok(Outcome::Created(group))
    }

    /// Title is validated before the id is looked up, so a blank title on an
    /// unknown id is a bad request, not a not-found.
    pub fn update(&self, id: i64, request: UpdateActivityGroup) -> Result<Outcome<ActivityGroup>> {
        info!(id, "Updating activity group");
        if is_blank(request.title.as_deref()) {
            warn!(id, "Rejected activity group update without title");
            return Ok(Outcome::BadRequest(TITLE_REQUIRED));
        }
        if !self.repo.exists_by_id(id)? {
            return Ok(not_found(id));
        }
        let Some(mut group) = self.repo.find_by_id(id)? else {
            return Ok(not_found(id));
        };

        group.title = request.title.unwrap_or_default();
        group.updated_at = Utc::now();
        let saved = self.repo.update(&group)?;
        Ok(Outcome::Success(saved.without_items()))
    }

    pub fn delete(&self, id: i64) -> Result<Outcome<Empty>> {
        info!(id, "Deleting activity group");
        if !self.repo.exists_by_id(id)? {
            return Ok(not_found(id));
        }
        self.repo.delete_by_id(id)?;
        Ok(Outcome::Success(Empty {}))
    }
}
