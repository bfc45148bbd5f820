//! SQLite route store (feature `sqlite`).
//!
//! Two tables: `routes` (one row per route) and `route_nodes` (ordered stops).
//! A partial unique index on `routes(assigned_to)` restricted to open
//! statuses backs up the check in `insert_if_idle`, so even a second process
//! writing the same file cannot give an operator two open routes.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

use wr_core::{NodeId, OperatorId, RouteId, Timestamp};

use crate::{NewRoute, Route, RouteError, RouteResult, RouteStatus, RouteStore};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS routes (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        assigned_to    TEXT    NOT NULL,
        total_distance REAL    NOT NULL,
        status         TEXT    NOT NULL,
        created_at     INTEGER NOT NULL,
        started_at     INTEGER,
        completed_at   INTEGER
    );
    CREATE TABLE IF NOT EXISTS route_nodes (
        route_id INTEGER NOT NULL REFERENCES routes(id),
        seq      INTEGER NOT NULL,
        node_id  INTEGER NOT NULL,
        PRIMARY KEY (route_id, seq)
    );
    CREATE INDEX IF NOT EXISTS routes_by_operator
        ON routes (assigned_to, status, created_at DESC);
    CREATE UNIQUE INDEX IF NOT EXISTS one_open_route_per_operator
        ON routes (assigned_to) WHERE status IN ('pending', 'active');
";

const OPEN_FOR_OPERATOR: &str = "SELECT id FROM routes \
     WHERE assigned_to = ?1 AND status IN ('pending', 'active') \
     ORDER BY created_at DESC, id DESC LIMIT 1";

/// Route records in an SQLite database.
pub struct SqliteRouteStore {
    conn: Mutex<Connection>,
}

impl SqliteRouteStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> RouteResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// A private in-memory database; contents vanish with the store.
    pub fn open_in_memory() -> RouteResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> RouteResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> RouteResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RouteError::Storage("route store lock poisoned".into()))
    }
}

impl RouteStore for SqliteRouteStore {
    fn insert_if_idle(&self, draft: NewRoute) -> RouteResult<Route> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let open: Option<i64> = tx
            .query_row(OPEN_FOR_OPERATOR, params![draft.assigned_to.as_str()], |r| r.get(0))
            .optional()?;
        if let Some(id) = open {
            return Err(RouteError::OperatorBusy {
                operator: draft.assigned_to,
                route:    RouteId(id as u64),
            });
        }

        tx.execute(
            "INSERT INTO routes (assigned_to, total_distance, status, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                draft.assigned_to.as_str(),
                draft.total_distance,
                RouteStatus::Pending.as_str(),
                draft.created_at.unix_millis(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO route_nodes (route_id, seq, node_id) VALUES (?1, ?2, ?3)",
            )?;
            for (seq, node) in draft.nodes.iter().enumerate() {
                stmt.execute(params![id, seq as i64, node.0])?;
            }
        }
        tx.commit()?;

        Ok(draft.into_route(RouteId(id as u64)))
    }

    fn get(&self, id: RouteId) -> RouteResult<Option<Route>> {
        let conn = self.lock()?;
        load_route(&conn, id)
    }

    fn transition(&self, id: RouteId, to: RouteStatus, at: Timestamp) -> RouteResult<Route> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut route = load_route(&tx, id)?.ok_or(RouteError::NotFound(id))?;
        route.apply_transition(to, at)?;

        tx.execute(
            "UPDATE routes SET status = ?1, started_at = ?2, completed_at = ?3 WHERE id = ?4",
            params![
                route.status.as_str(),
                route.started_at.map(Timestamp::unix_millis),
                route.completed_at.map(Timestamp::unix_millis),
                id.0 as i64,
            ],
        )?;
        tx.commit()?;
        Ok(route)
    }

    fn latest_open(&self, operator: &OperatorId) -> RouteResult<Option<Route>> {
        let conn = self.lock()?;
        let open: Option<i64> = conn
            .query_row(OPEN_FOR_OPERATOR, params![operator.as_str()], |r| r.get(0))
            .optional()?;
        match open {
            Some(id) => load_route(&conn, RouteId(id as u64)),
            None => Ok(None),
        }
    }

    fn completed(&self, operator: &OperatorId) -> RouteResult<Vec<Route>> {
        let conn = self.lock()?;
        let ids = select_ids(
            &conn,
            "SELECT id FROM routes WHERE assigned_to = ?1 AND status = 'completed' \
             ORDER BY completed_at DESC, id DESC",
            params![operator.as_str()],
        )?;
        load_all(&conn, ids)
    }

    fn list(&self) -> RouteResult<Vec<Route>> {
        let conn = self.lock()?;
        let ids = select_ids(&conn, "SELECT id FROM routes ORDER BY created_at DESC, id DESC", params![])?;
        load_all(&conn, ids)
    }
}

// ── Row mapping ───────────────────────────────────────────────────────────────

struct RouteRow {
    id:             i64,
    assigned_to:    String,
    total_distance: f64,
    status:         String,
    created_at:     i64,
    started_at:     Option<i64>,
    completed_at:   Option<i64>,
}

impl RouteRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id:             row.get(0)?,
            assigned_to:    row.get(1)?,
            total_distance: row.get(2)?,
            status:         row.get(3)?,
            created_at:     row.get(4)?,
            started_at:     row.get(5)?,
            completed_at:   row.get(6)?,
        })
    }
}

fn load_route(conn: &Connection, id: RouteId) -> RouteResult<Option<Route>> {
    let row = conn
        .query_row(
            "SELECT id, assigned_to, total_distance, status, created_at, started_at, completed_at \
             FROM routes WHERE id = ?1",
            params![id.0 as i64],
            RouteRow::from_row,
        )
        .optional()?;
    let Some(row) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare_cached("SELECT node_id FROM route_nodes WHERE route_id = ?1 ORDER BY seq")?;
    let nodes = stmt
        .query_map(params![row.id], |r| r.get::<_, i64>(0))?
        .map(|n| n.map(|n| NodeId(n as u32)))
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let status = row.status.parse::<RouteStatus>().map_err(RouteError::Storage)?;

    Ok(Some(Route {
        id:             RouteId(row.id as u64),
        assigned_to:    OperatorId::new(row.assigned_to),
        nodes,
        total_distance: row.total_distance,
        status,
        created_at:     Timestamp(row.created_at),
        started_at:     row.started_at.map(Timestamp),
        completed_at:   row.completed_at.map(Timestamp),
    }))
}

fn select_ids(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> RouteResult<Vec<RouteId>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let ids = stmt
        .query_map(args, |r| r.get::<_, i64>(0))?
        .map(|id| id.map(|id| RouteId(id as u64)))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ids)
}

fn load_all(conn: &Connection, ids: Vec<RouteId>) -> RouteResult<Vec<Route>> {
    ids.into_iter()
        .filter_map(|id| load_route(conn, id).transpose())
        .collect()
}
