use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{GROUP_ID_REQUIRED, TITLE_OR_STATUS_REQUIRED, TITLE_REQUIRED, is_blank};
use crate::app::models::{DEFAULT_PRIORITY, Empty, NewTodoItem, Outcome, TodoItem};
use crate::app::repository::TodoItemRepository;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodoItem {
    pub activity_group_id: Option<i64>,
    pub title: Option<String>,
    pub priority: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodoItem {
    pub title: Option<String>,
    pub is_active: Option<bool>,
}

fn not_found<T>(id: i64) -> Outcome<T> {
    Outcome::NotFound(format!("Todo with ID {} Not Found", id))
}

pub struct TodoItemService<R> {
    repo: R,
}

impl<R: TodoItemRepository> TodoItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    #[cfg(test)]
    pub(crate) fn repository(&self) -> &R {
        &self.repo
    }

    pub fn list(&self, activity_group_id: Option<i64>) -> Result<Outcome<Vec<TodoItem>>> {
        info!(?activity_group_id, "Listing todo items");
        let items = match activity_group_id {
            Some(group_id) => self.repo.find_by_parent(group_id)?,
            None => self.repo.find_all()?,
        };
        Ok(Outcome::Success(items))
    }

    pub fn get(&self, id: i64) -> Result<Outcome<TodoItem>> {
        info!(id, "Fetching todo item");
        if !self.repo.exists_by_id(id)? {
            return Ok(not_found(id));
        }
        Ok(match self.repo.find_by_id(id)? {
            Some(item) => Outcome::Success(item),
            None => not_found(id),
        })
    }

    /// The parent id is checked before the title: a request missing both is
    /// reported as a missing `activity_group_id`.
    pub fn create(&self, request: CreateTodoItem) -> Result<Outcome<TodoItem>> {
        info!(activity_group_id = ?request.activity_group_id, "Creating todo item");
        let Some(activity_group_id) = request.activity_group_id else {
            warn!("Rejected todo item without activity_group_id");
            return Ok(Outcome::BadRequest(GROUP_ID_REQUIRED));
        };
        if is_blank(request.title.as_deref()) {
            warn!(activity_group_id, "Rejected todo item without title");
            return Ok(Outcome::BadRequest(TITLE_REQUIRED));
        }

        let now = Utc::now();
        let draft = NewTodoItem {
            activity_group_id,
            title: request.title.unwrap_or_default(),
            is_active: request.is_active.unwrap_or(true),
            priority: request
                .priority
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            created_at: now,
            updated_at: now,
        };
        let item = self.repo.insert(&draft)?;
        debug!(id = item.id, "Todo item created");
        Ok(Outcome::Created(item))
    }

    /// Applies either `is_active` or `title`, never both. When `is_active` is
    /// present the title in the request is ignored.
    pub fn update(&self, id: i64, request: UpdateTodoItem) -> Result<Outcome<TodoItem>> {
        info!(id, "Updating todo item");
        if is_blank(request.title.as_deref()) && request.is_active.is_none() {
            warn!(id, "Rejected todo item update without title or status");
            return Ok(Outcome::BadRequest(TITLE_OR_STATUS_REQUIRED));
        }
        if !self.repo.exists_by_id(id)? {
            return Ok(not_found(id));
        }
        let Some(mut item) = self.repo.find_by_id(id)? else {
            return Ok(not_found(id));
        };

        match (request.is_active, request.title) {
            (Some(is_active), _) => {
                debug!(id, is_active, "Applying status change");
                item.is_active = is_active;
            }
            (None, Some(title)) => item.title = title,
            (None, None) => {}
        }
        item.updated_at = Utc::now();
        let saved = self.repo.update(&item)?;
        Ok(Outcome::Success(saved))
    }

    pub fn delete(&self, id: i64) -> Result<Outcome<Empty>> {
        info!(id, "Deleting todo item");
        if !self.repo.exists_by_id(id)? {
            return Ok(not_found(id));
        }
        self.repo.delete_by_id(id)?;
        Ok(Outcome::Success(Empty {}))
    }
}
