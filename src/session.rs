// Location: src/session.rs

use std::path::Path;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info};

use crate::backend::{Backend, BootstrapRequest};
use crate::config::ModelConfig;
use crate::error::{EngineError, Result};

/// Observable lifecycle of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Bootstrapping,
    Ready,
    Released,
    Failed,
}

/// Releases engine state on drop unless handed over with [`into_inner`](StateGuard::into_inner)
struct StateGuard<'a, B: Backend> {
    backend: &'a B,
    state: Option<B::State>,
}

impl<'a, B: Backend> StateGuard<'a, B> {
    fn state_mut(&mut self) -> &mut B::State {
        self.state.as_mut().expect("engine state taken before guard dropped")
    }

    fn into_inner(mut self) -> B::State {
        self.state.take().expect("engine state taken twice")
    }
}

impl<B: Backend> Drop for StateGuard<'_, B> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            self.backend.release_state(state);
        }
    }
}

/// One loaded model inside the native engine.
///
/// The engine state sits behind a mutex, so predict calls against the same
/// session run one at a time. The lifecycle lives in its own cell and can be
/// read while a prediction holds the engine.
///
/// Lock order is `engine` then `lifecycle`.
pub struct Session<B: Backend> {
    backend: B,
    lifecycle: RwLock<SessionState>,
    engine: Mutex<Option<B::State>>,
}

impl<B: Backend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            lifecycle: RwLock::new(SessionState::Uninitialized),
            engine: Mutex::new(None),
        }
    }

    /// Create a session and bootstrap it in one step
    pub fn load(backend: B, model_path: impl AsRef<Path>, config: &ModelConfig) -> Result<Self> {
        let session = Self::new(backend);
        session.bootstrap(model_path.as_ref(), config)?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        *self.lifecycle.read()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// Allocate engine state and load the model.
    ///
    /// Only valid from `Uninitialized`. On an engine failure the state is
    /// freed right away and the session ends up `Failed`.
    pub fn bootstrap(&self, model_path: &Path, config: &ModelConfig) -> Result<()> {
        {
            let mut lifecycle = self.lifecycle.write();
            if *lifecycle != SessionState::Uninitialized {
                return Err(EngineError::session(format!(
                    "cannot bootstrap a session that is {:?}",
                    *lifecycle
                )));
            }
            *lifecycle = SessionState::Bootstrapping;
        }

        info!(model = %model_path.display(), context_size = config.context_size, "loading model");

        let state = match self.backend.allocate_state() {
            Ok(state) => state,
            Err(e) => {
                *self.lifecycle.write() = SessionState::Failed;
                return Err(e);
            }
        };
        let mut guard = StateGuard {
            backend: &self.backend,
            state: Some(state),
        };

        let request = BootstrapRequest::new(model_path, config);
        let status = self.backend.bootstrap(guard.state_mut(), &request);
        if status != 0 {
            drop(guard);
            *self.lifecycle.write() = SessionState::Failed;
            error!(model = %model_path.display(), status, "loading the model failed");
            return Err(EngineError::Bootstrap {
                model_path: model_path.to_path_buf(),
                status,
            });
        }

        let mut engine = self.engine.lock();
        *engine = Some(guard.into_inner());
        *self.lifecycle.write() = SessionState::Ready;
        drop(engine);

        info!("model loaded successfully");
        Ok(())
    }

    /// Run `f` against the engine state while holding the engine lock
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&B, &mut B::State) -> R) -> Result<R> {
        let mut engine = self.engine.lock();
        match engine.as_mut() {
            Some(state) => Ok(f(&self.backend, state)),
            None => Err(EngineError::session(format!(
                "session is {:?}, not Ready",
                self.state()
            ))),
        }
    }

    /// Free the engine state. Returns `Ok(false)` if nothing was left to free.
    ///
    /// Waits for an in-flight prediction to finish first.
    pub fn release(&self) -> Result<bool> {
        let mut engine = self.engine.lock();
        let previous = {
            let mut lifecycle = self.lifecycle.write();
            if *lifecycle == SessionState::Bootstrapping {
                return Err(EngineError::session("cannot release a session while it is bootstrapping"));
            }
            std::mem::replace(&mut *lifecycle, SessionState::Released)
        };

        match engine.take() {
            Some(state) => {
                self.backend.release_state(state);
                info!("session released");
                Ok(true)
            }
            None => {
                debug!(state = ?previous, "release on a session without engine state");
                Ok(false)
            }
        }
    }
}

impl<B: Backend> Drop for Session<B> {
    fn drop(&mut self) {
        *self.lifecycle.get_mut() = SessionState::Released;
        if let Some(state) = self.engine.get_mut().take() {
            self.backend.release_state(state);
        }
    }
}
