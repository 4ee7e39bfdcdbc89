//! To-do HTTP back-end: activity groups and the todo items filed under them.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │  Client  │ ───────> │  server.rs  (axum Router, start_server)          │
//! │          │ <─────── │    └─ api.rs  (route handlers, AppState)         │
//! └──────────┘   JSON   │         │                                        │
//!                       │         │ spawn_blocking → service call          │
//!                       │         v                                        │
//!                       │  service/  (ActivityGroupService,                │
//!                       │             TodoItemService → Outcome<T>)        │
//!                       │         │                                        │
//!                       │         │ repository traits                      │
//!                       │         v                                        │
//!                       │  db.rs  (TodoDb over rusqlite, DbHandle)         │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module       | Responsibility                                           |
//! |--------------|----------------------------------------------------------|
//! | `models`     | `ActivityGroup`, `TodoItem`, `Envelope`, `Outcome`       |
//! | `repository` | `ActivityGroupRepository` / `TodoItemRepository` traits  |
//!
//! ## Typical Request Flow (update a todo item)
//!
//! 1. `PATCH /todo-items/{id}` → `api::update_todo_item()`
//! 2. The handler moves the request onto the blocking pool and calls
//!    `TodoItemService::update()`.
//! 3. The service validates the body, probes existence, then loads,
//!    modifies and saves the record through `TodoItemRepository`.
//! 4. The returned `Outcome` is rendered as an `Envelope` with the matching
//!    HTTP status.

pub mod api;
pub mod db;
pub mod models;
pub mod repository;
pub mod server;
pub mod service;
