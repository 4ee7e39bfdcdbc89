//! Validation and orchestration for the two resources.
//!
//! Services are stateless apart from the repository they are constructed
//! with. Every operation returns `anyhow::Result<Outcome<_>>`: business-rule
//! failures (bad input, unknown id) are `Ok(Outcome::BadRequest | NotFound)`,
//! while `Err` only ever carries a persistence failure.

pub mod activity_group;
pub mod todo_item;

pub use activity_group::{ActivityGroupService, CreateActivityGroup, UpdateActivityGroup};
pub use todo_item::{CreateTodoItem, TodoItemService, UpdateTodoItem};

pub const TITLE_REQUIRED: &str = "title cannot be null";
pub const GROUP_ID_REQUIRED: &str = "activity_group_id cannot be null";
pub const TITLE_OR_STATUS_REQUIRED: &str = "title and status cannot be null";

fn is_empty(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory stand-in for the SQLite gateway.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use anyhow::Result;

    use crate::app::models::*;
    use crate::app::repository::{ActivityGroupRepository, TodoItemRepository};

    #[derive(Default)]
    pub struct FakeStore {
        groups: Mutex<Vec<ActivityGroup>>,
        items: Mutex<Vec<TodoItem>>,
        next_id: AtomicI64,
        calls: AtomicUsize,
    }

    impl FakeStore {
        /// Number of repository calls made so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        fn next_id(&self) -> i64 {
            self.next_id.fetch_add(1, Ordering::SeqCst) + 1
        }

        pub fn items(&self) -> Vec<TodoItem> {
            self.items.lock().unwrap().clone()
        }

        fn capped(mut groups: Vec<ActivityGroup>) -> Vec<ActivityGroup> {
            groups.sort_by_key(|g| (g.updated_at, g.id));
            groups.truncate(LIST_CAP as usize);
            groups
        }
    }

    impl ActivityGroupRepository for FakeStore {
        fn exists_by_id(&self, id: i64) -> Result<bool> {
            self.touch();
            Ok(self.groups.lock().unwrap().iter().any(|g| g.id == id))
        }

        fn find_by_id(&self, id: i64) -> Result<Option<ActivityGroup>> {
            self.touch();
            let group = self
                .groups
                .lock()
                .unwrap()
                .iter()
                .find(|g| g.id == id)
                .cloned();
            Ok(group.map(|mut g| {
                g.todo_items = Some(
                    self.items()
                        .into_iter()
                        .filter(|i| i.activity_group_id == id)
                        .collect(),
                );
                g
            }))
        }

        fn find_all_capped(&self) -> Result<Vec<ActivityGroup>> {
            self.touch();
            // Rows come back with children attached so callers have to strip them.
            let groups = self.groups.lock().unwrap().clone();
            let items = self.items();
            Ok(Self::capped(groups)
                .into_iter()
                .map(|mut g| {
                    g.todo_items = Some(
                        items
                            .iter()
                            .filter(|i| i.activity_group_id == g.id)
                            .cloned()
                            .collect(),
                    );
                    g
                })
                .collect())
        }

        fn find_by_email_capped(&self, email: &str) -> Result<Vec<ActivityGroup>> {
            self.touch();
            let groups: Vec<ActivityGroup> = self
                .groups
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.email.as_deref() == Some(email))
                .map(|g| {
                    let mut g = g.clone();
                    g.todo_items = Some(Vec::new());
                    g
                })
                .collect();
            Ok(Self::capped(groups))
        }

        fn insert(&self, draft: &NewActivityGroup) -> Result<ActivityGroup> {
            self.touch();
            let group = ActivityGroup {
                id: self.next_id(),
                title: draft.title.clone(),
                email: draft.email.clone(),
                created_at: draft.created_at,
                updated_at: draft.updated_at,
                todo_items: None,
            };
            self.groups.lock().unwrap().push(group.clone());
            Ok(group)
        }

        fn update(&self, group: &ActivityGroup) -> Result<ActivityGroup> {
            self.touch();
            let mut groups = self.groups.lock().unwrap();
            let slot = groups
                .iter_mut()
                .find(|g| g.id == group.id)
                .ok_or_else(|| anyhow::anyhow!("group {} vanished", group.id))?;
            *slot = group.clone();
            Ok(group.clone())
        }

        fn delete_by_id(&self, id: i64) -> Result<()> {
            self.touch();
            self.groups.lock().unwrap().retain(|g| g.id != id);
            Ok(())
        }
    }

    impl TodoItemRepository for FakeStore {
        fn exists_by_id(&self, id: i64) -> Result<bool> {
            self.touch();
            Ok(self.items.lock().unwrap().iter().any(|i| i.id == id))
        }

        fn find_by_id(&self, id: i64) -> Result<Option<TodoItem>> {
            self.touch();
            Ok(self.items.lock().unwrap().iter().find(|i| i.id == id).cloned())
        }

        fn find_all(&self) -> Result<Vec<TodoItem>> {
            self.touch();
            Ok(self.items())
        }

        fn find_by_parent(&self, activity_group_id: i64) -> Result<Vec<TodoItem>> {
            self.touch();
            Ok(self
                .items()
                .into_iter()
                .filter(|i| i.activity_group_id == activity_group_id)
                .collect())
        }

        fn insert(&self, draft: &NewTodoItem) -> Result<TodoItem> {
            self.touch();
            let item = TodoItem {
                id: self.next_id(),
                activity_group_id: draft.activity_group_id,
                title: draft.title.clone(),
                is_active: draft.is_active,
                priority: draft.priority.clone(),
                created_at: draft.created_at,
                updated_at: draft.updated_at,
            };
            self.items.lock().unwrap().push(item.clone());
            Ok(item)
        }

        fn update(&self, item: &TodoItem) -> Result<TodoItem> {
            self.touch();
            let mut items = self.items.lock().unwrap();
            let slot = items
                .iter_mut()
                .find(|i| i.id == item.id)
                .ok_or_else(|| anyhow::anyhow!("item {} vanished", item.id))?;
            *slot = item.clone();
            Ok(item.clone())
        }

        fn delete_by_id(&self, id: i64) -> Result<()> {
            self.touch();
            self.items.lock().unwrap().retain(|i| i.id != id);
            Ok(())
        }
    }
}
