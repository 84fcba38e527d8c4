//! # Repository Module
//!
//! Database repository implementations for the report filter.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Back office                           Report generation               │
//! │       │                                      │                          │
//! │       │  db.categories().set_excluded(..)    │  service.get_sale_details│
//! │       ▼                                      ▼                          │
//! │  CategoryRepository                    OrderRepository                 │
//! │  ├── create / rename                   ├── create_product              │
//! │  ├── set_excluded                      ├── insert_order                │
//! │  ├── list_excluded_names               └── find(&OrderQuery)           │
//! │  └── exclusion_set                                                     │
//! │       │                                      │                          │
//! │       │  SQL Query                           │                          │
//! │       ▼                                      ▼                          │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Category flag store
//! - [`OrderRepository`](order::OrderRepository) - Order snapshot for the hourly histogram

pub mod category;
pub mod order;
