//! Process-wide state shared by probes.
//!
//! Some detections are expensive and their result cannot change while the
//! process runs (the boot time, the list of media players). A probe computes
//! those once through [`ProcessContext::detect_once`] and every later caller
//! gets the same shared snapshot.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::Config;
use crate::error::{ProbeError, Result};
use crate::format::Value;
use crate::output::{ModuleSpec, PrintReport, Printer};

/// A lazily computed, shared value.
///
/// The computation runs under the lock, so concurrent first callers wait for
/// one result instead of computing their own.
#[derive(Debug)]
pub struct Memo<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Memo<T> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Get the value, computing it with `init` on first use.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.as_ref() {
            return Arc::clone(value);
        }

        let value = Arc::new(init());
        *slot = Some(Arc::clone(&value));
        value
    }

    /// Like [`get_or_init`](Self::get_or_init), for fallible computations.
    ///
    /// An error leaves the slot empty; the next caller tries again.
    pub fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<Arc<T>, E> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(init()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }

    /// The value, if already computed.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

type MemoTable = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Configuration, printer, and memoized detections for one process.
pub struct ProcessContext {
    config: Config,
    printer: Printer,
    memos: Mutex<MemoTable>,
}

impl std::fmt::Debug for ProcessContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessContext")
            .field("config", &self.config)
            .field("printer", &self.printer)
            .finish_non_exhaustive()
    }
}

impl ProcessContext {
    /// Create a context from parts.
    pub fn new(config: Config, printer: Printer) -> Self {
        Self {
            config,
            printer,
            memos: Mutex::new(HashMap::new()),
        }
    }

    /// Create a context whose printer is built from `config`.
    pub fn from_config(config: Config, use_colors: bool) -> Result<Self> {
        let printer = Printer::from_config(&config, use_colors)?;
        Ok(Self::new(config, printer))
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The module printer.
    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    /// The memo slot for snapshots of type `T`.
    pub fn memo<T: Send + Sync + 'static>(&self) -> Arc<Memo<T>> {
        let mut memos = self.memos.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = memos.get(&TypeId::of::<T>()) {
            if let Ok(memo) = Arc::clone(existing).downcast::<Memo<T>>() {
                return memo;
            }
        }

        let memo = Arc::new(Memo::<T>::new());
        memos.insert(
            TypeId::of::<T>(),
            memo.clone() as Arc<dyn Any + Send + Sync>,
        );
        memo
    }

    /// Compute a `T` snapshot once per process.
    ///
    /// The table lock is released before `detect` runs, so detections of
    /// different types do not wait on each other.
    pub fn detect_once<T, F>(&self, detect: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        self.memo::<T>().get_or_init(detect)
    }

    /// Fallible [`detect_once`](Self::detect_once); failures are not memoized.
    pub fn try_detect_once<T, F>(&self, detect: F) -> std::result::Result<Arc<T>, ProbeError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> std::result::Result<T, ProbeError>,
    {
        self.memo::<T>().get_or_try_init(detect)
    }

    /// Print a module using its configured key and format.
    pub fn print_module<'v, W, F>(
        &self,
        out: &mut W,
        name: &str,
        arg_count: u32,
        detect: F,
    ) -> io::Result<PrintReport>
    where
        W: Write + ?Sized,
        F: FnOnce() -> std::result::Result<Vec<Value<'v>>, ProbeError>,
    {
        let spec = ModuleSpec::configured(name, arg_count, &self.config);
        self.printer.print_from_cache(out, &spec, detect)
    }
}
