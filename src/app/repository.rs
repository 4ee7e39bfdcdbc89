//! Persistence gateway consumed by the services.
//!
//! The services only ever see these two traits. `TodoDb` implements them
//! directly; `DbHandle` implements them by taking the connection lock for
//! each call.

use anyhow::Result;

use super::db::{DbHandle, TodoDb};
use super::models::{ActivityGroup, NewActivityGroup, NewTodoItem, TodoItem};

pub trait ActivityGroupRepository {
    fn exists_by_id(&self, id: i64) -> Result<bool>;

    /// Loads the group together with its todo items.
    fn find_by_id(&self, id: i64) -> Result<Option<ActivityGroup>>;

    /// All groups, oldest `updated_at` first, at most `LIST_CAP` rows.
    fn find_all_capped(&self) -> Result<Vec<ActivityGroup>>;

    /// Groups owned by `email`, same order and cap as `find_all_capped`.
    fn find_by_email_capped(&self, email: &str) -> Result<Vec<ActivityGroup>>;

    fn insert(&self, draft: &NewActivityGroup) -> Result<ActivityGroup>;

    fn update(&self, group: &ActivityGroup) -> Result<ActivityGroup>;

    fn delete_by_id(&self, id: i64) -> Result<()>;
}

pub trait TodoItemRepository {
    fn exists_by_id(&self, id: i64) -> Result<bool>;

    fn find_by_id(&self, id: i64) -> Result<Option<TodoItem>>;

    fn find_all(&self) -> Result<Vec<TodoItem>>;

    fn find_by_parent(&self, activity_group_id: i64) -> Result<Vec<TodoItem>>;

    fn insert(&self, draft: &NewTodoItem) -> Result<TodoItem>;

    fn update(&self, item: &TodoItem) -> Result<TodoItem>;

    fn delete_by_id(&self, id: i64) -> Result<()>;
}

impl ActivityGroupRepository for TodoDb {
    fn exists_by_id(&self, id: i64) -> Result<bool> {
        self.activity_group_exists(id)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<ActivityGroup>> {
        self.get_activity_group(id)
    }

    fn find_all_capped(&self) -> Result<Vec<ActivityGroup>> {
        self.list_activity_groups()
    }

    fn find_by_email_capped(&self, email: &str) -> Result<Vec<ActivityGroup>> {
        self.list_activity_groups_by_email(email)
    }

    fn insert(&self, draft: &NewActivityGroup) -> Result<ActivityGroup> {
        self.create_activity_group(draft)
    }

    fn update(&self, group: &ActivityGroup) -> Result<ActivityGroup> {
        self.update_activity_group(group)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_activity_group(id).map(|_| ())
    }
}

impl TodoItemRepository for TodoDb {
    fn exists_by_id(&self, id: i64) -> Result<bool> {
        self.todo_item_exists(id)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<TodoItem>> {
        self.get_todo_item(id)
    }

    fn find_all(&self) -> Result<Vec<TodoItem>> {
        self.list_todo_items()
    }

    fn find_by_parent(&self, activity_group_id: i64) -> Result<Vec<TodoItem>> {
        self.list_todo_items_by_group(activity_group_id)
    }

    fn insert(&self, draft: &NewTodoItem) -> Result<TodoItem> {
        self.create_todo_item(draft)
    }

    fn update(&self, item: &TodoItem) -> Result<TodoItem> {
        self.update_todo_item(item)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_todo_item(id).map(|_| ())
    }
}

impl ActivityGroupRepository for DbHandle {
    fn exists_by_id(&self, id: i64) -> Result<bool> {
        self.lock_sync()?.activity_group_exists(id)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<ActivityGroup>> {
        self.lock_sync()?.get_activity_group(id)
    }

    fn find_all_capped(&self) -> Result<Vec<ActivityGroup>> {
        self.lock_sync()?.list_activity_groups()
    }

    fn find_by_email_capped(&self, email: &str) -> Result<Vec<ActivityGroup>> {
        self.lock_sync()?.list_activity_groups_by_email(email)
    }

    fn insert(&self, draft: &NewActivityGroup) -> Result<ActivityGroup> {
        self.lock_sync()?.create_activity_group(draft)
    }

    fn update(&self, group: &ActivityGroup) -> Result<ActivityGroup> {
        self.lock_sync()?.update_activity_group(group)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.lock_sync()?.delete_activity_group(id).map(|_| ())
    }
}

impl TodoItemRepository for DbHandle {
    fn exists_by_id(&self, id: i64) -> Result<bool> {
        self.lock_sync()?.todo_item_exists(id)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<TodoItem>> {
        self.lock_sync()?.get_todo_item(id)
    }

    fn find_all(&self) -> Result<Vec<TodoItem>> {
        self.lock_sync()?.list_todo_items()
    }

    fn find_by_parent(&self, activity_group_id: i64) -> Result<Vec<TodoItem>> {
        self.lock_sync()?.list_todo_items_by_group(activity_group_id)
    }

    fn insert(&self, draft: &NewTodoItem) -> Result<TodoItem> {
        self.lock_sync()?.create_todo_item(draft)
    }

    fn update(&self, item: &TodoItem) -> Result<TodoItem> {
        self.lock_sync()?.update_todo_item(item)
    }

    fn delete_by_id(&self, id: i64) -> Result<()> {
        self.lock_sync()?.delete_todo_item(id).map(|_| ())
    }
}
