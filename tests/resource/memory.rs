#![allow(dead_code)]
use log::LevelFilter;
use sluice::{Connection, EntitySink, RecordSink, Result, SchemaProvider};
use std::{cell::RefCell, collections::BTreeMap, env, rc::Rc};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub struct MemoryConnection {
    pub descriptor: String,
    pub columns: Vec<String>,
}

impl SchemaProvider for MemoryConnection {
    fn column_names(&mut self, _schema: &str, _table: &str) -> Result<Vec<String>> {
        Ok(self.columns.clone())
    }
}

impl Connection for MemoryConnection {
    fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

/// What happened to a sink, shared with the test after the sink is consumed.
pub struct Journal<E> {
    /// Rows added by native statements, per table.
    pub loaded: BTreeMap<String, u64>,
    pub stored: Vec<E>,
    pub pending: Vec<E>,
    pub statements: Vec<String>,
    pub commits: usize,
    pub rollbacks: usize,
    pub flushes: usize,
    pub closed: usize,
}

impl<E> Default for Journal<E> {
    fn default() -> Self {
        Self {
            loaded: BTreeMap::new(),
            stored: Vec::new(),
            pending: Vec::new(),
            statements: Vec::new(),
            commits: 0,
            rollbacks: 0,
            flushes: 0,
            closed: 0,
        }
    }
}

/// Table named by `INSERT INTO <table>` or `INTO TABLE <table>`.
fn target_table(sql: &str) -> &str {
    let Some((_, rest)) = sql.split_once("INTO ") else {
        return "";
    };
    let rest = rest.strip_prefix("TABLE ").unwrap_or(rest);
    rest.split([' ', '(']).next().unwrap_or_default()
}

pub struct MemorySink<E> {
    pub connection: MemoryConnection,
    pub journal: Rc<RefCell<Journal<E>>>,
    /// Simulates the native loader, returns the rows it added.
    pub on_execute: Box<dyn FnMut(&str) -> Result<u64>>,
    /// Number of inserts after which `insert` fails.
    pub fail_after: Option<usize>,
}

impl<E> MemorySink<E> {
    pub fn new(descriptor: &str) -> (Self, Rc<RefCell<Journal<E>>>) {
        let journal = Rc::new(RefCell::new(Journal::default()));
        (
            Self {
                connection: MemoryConnection {
                    descriptor: descriptor.into(),
                    columns: Vec::new(),
                },
                journal: journal.clone(),
                on_execute: Box::new(|_| Ok(0)),
                fail_after: None,
            },
            journal,
        )
    }
}

impl<E> RecordSink for MemorySink<E> {
    type Connection = MemoryConnection;

    fn connection(&mut self) -> &mut Self::Connection {
        &mut self.connection
    }

    fn count(&mut self, _schema: &str, table: &str) -> Result<u64> {
        let journal = self.journal.borrow();
        Ok(journal.loaded.get(table).copied().unwrap_or_default() + journal.stored.len() as u64)
    }

    fn remove_all(&mut self, _schema: &str, table: &str) -> Result<u64> {
        let mut journal = self.journal.borrow_mut();
        let removed =
            journal.loaded.remove(table).unwrap_or_default() + journal.stored.len() as u64;
        journal.stored.clear();
        Ok(removed)
    }

    fn execute_native(&mut self, sql: &str) -> Result<u64> {
        self.journal.borrow_mut().statements.push(sql.into());
        let added = (self.on_execute)(sql)?;
        *self
            .journal
            .borrow_mut()
            .loaded
            .entry(target_table(sql).into())
            .or_default() += added;
        Ok(added)
    }

    fn commit_and_continue(&mut self) -> Result<()> {
        self.journal.borrow_mut().commits += 1;
        Ok(())
    }

    fn rollback_and_continue(&mut self) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        journal.rollbacks += 1;
        journal.pending.clear();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.journal.borrow_mut().closed += 1;
        Ok(())
    }
}

impl<E> EntitySink<E> for MemorySink<E> {
    fn insert(&mut self, entity: E) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        let inserted = journal.stored.len() + journal.pending.len();
        if self.fail_after.is_some_and(|v| inserted >= v) {
            return Err(sluice::Error::msg("Insert refused"));
        }
        journal.pending.push(entity);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let mut journal = self.journal.borrow_mut();
        journal.flushes += 1;
        let pending: Vec<E> = journal.pending.drain(..).collect();
        journal.stored.extend(pending);
        Ok(())
    }

    fn clear(&mut self) {}
}
