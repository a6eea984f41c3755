//! Embedded SQL migrations, in application order

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            id: "001_commits_and_snapshots",
            sql: include_str!("../../migrations/001_commits_and_snapshots.sql"),
        },
        Migration {
            id: "002_snapshot_history_index",
            sql: include_str!("../../migrations/002_snapshot_history_index.sql"),
        },
    ]
}
