//! FFI binding to the C shim around llama.cpp (`libbinding`)
//!
//! ```c
//! void *llama_allocate_state();
//! int   llama_bootstrap(const char *model_path, void *state, int n_ctx,
//!                       bool f16_memory, bool alpaca, bool gpt4all);
//! void *llama_allocate_params(const char *prompt, int seed, int threads, int tokens,
//!                             int top_k, float top_p, float temp, float repeat_penalty,
//!                             int repeat_last_n, bool ignore_eos);
//! void  llama_free_params(void *params);
//! int   llama_predict(void *params, void *state, char **result);
//! void  llama_free_result(char *result);
//! void  llama_free_state(void *state);
//! ```

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr::{self, NonNull};

use tracing::warn;

use super::{Backend, BootstrapRequest, PredictRequest};
use crate::error::{EngineError, ResourceType, Result};

extern "C" {
    fn llama_allocate_state() -> *mut c_void;
    fn llama_bootstrap(
        model_path: *const c_char,
        state: *mut c_void,
        n_ctx: c_int,
        f16_memory: bool,
        alpaca: bool,
        gpt4all: bool,
    ) -> c_int;
    fn llama_allocate_params(
        prompt: *const c_char,
        seed: c_int,
        threads: c_int,
        tokens: c_int,
        top_k: c_int,
        top_p: f32,
        temp: f32,
        repeat_penalty: f32,
        repeat_last_n: c_int,
        ignore_eos: bool,
    ) -> *mut c_void;
    fn llama_free_params(params: *mut c_void);
    fn llama_predict(params: *mut c_void, state: *mut c_void, result: *mut *mut c_char) -> c_int;
    fn llama_free_result(result: *mut c_char);
    fn llama_free_state(state: *mut c_void);
}

/// Status returned when a prompt or path cannot cross the boundary
const STATUS_INVALID_ARGUMENT: i32 = -22;

/// Engine context allocated by the shim
#[derive(Debug)]
pub struct NativeState(NonNull<c_void>);

// The shim context is not tied to the allocating thread; Session serializes access.
unsafe impl Send for NativeState {}

/// Backend calling into the linked native engine
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

struct ParamsGuard(*mut c_void);

impl Drop for ParamsGuard {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { llama_free_params(self.0) }
        }
    }
}

struct ResultGuard(*mut c_char);

impl Drop for ResultGuard {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { llama_free_result(self.0) }
        }
    }
}

impl Backend for NativeBackend {
    type State = NativeState;

    fn allocate_state(&self) -> Result<NativeState> {
        let raw = unsafe { llama_allocate_state() };
        NonNull::new(raw).map(NativeState).ok_or_else(|| EngineError::Resource {
            message: "engine returned a null state".to_string(),
            resource_type: ResourceType::EngineState,
        })
    }

    fn bootstrap(&self, state: &mut NativeState, request: &BootstrapRequest<'_>) -> i32 {
        let Some(path) = request.model_path.to_str().and_then(|p| CString::new(p).ok()) else {
            warn!(path = %request.model_path.display(), "model path cannot be passed to the engine");
            return STATUS_INVALID_ARGUMENT;
        };

        unsafe {
            llama_bootstrap(
                path.as_ptr(),
                state.0.as_ptr(),
                request.context_size,
                request.f16_memory,
                request.alpaca,
                request.gpt4all,
            )
        }
    }

    fn predict(&self, state: &mut NativeState, request: &PredictRequest<'_>) -> std::result::Result<String, i32> {
        let prompt = CString::new(request.prompt).map_err(|_| STATUS_INVALID_ARGUMENT)?;

        let params = ParamsGuard(unsafe {
            llama_allocate_params(
                prompt.as_ptr(),
                request.seed,
                request.threads,
                request.tokens,
                request.top_k,
                request.top_p,
                request.temperature,
                request.penalty,
                request.repeat_last_n,
                request.ignore_eos,
            )
        });
        if params.0.is_null() {
            return Err(STATUS_INVALID_ARGUMENT);
        }

        let mut out: *mut c_char = ptr::null_mut();
        let status = unsafe { llama_predict(params.0, state.0.as_ptr(), &mut out) };
        let out = ResultGuard(out);

        if status != 0 {
            return Err(status);
        }
        if out.0.is_null() {
            return Ok(String::new());
        }
        let text = unsafe { CStr::from_ptr(out.0) };
        Ok(text.to_string_lossy().into_owned())
    }

    fn release_state(&self, state: NativeState) {
        unsafe { llama_free_state(state.0.as_ptr()) }
    }
}
