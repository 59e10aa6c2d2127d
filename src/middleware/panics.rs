use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use axum::extract::Request;
use futures_util::FutureExt;

use crate::middleware::pipeline::Middleware;
use crate::web::BoxHandler;

/// A handler panic, converted into an ordinary error by [`Panics`].
#[derive(Debug, Clone)]
pub struct PanicError {
    message: String,
    trace: String,
}

impl PanicError {
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Stack trace captured where the panic was raised, when available.
    pub fn trace(&self) -> &str {
        &self.trace
    }

    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        let trace = LAST_TRACE
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Backtrace::force_capture().to_string());

        Self { message, trace }
    }
}

impl fmt::Display for PanicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PANIC [{}]", self.message)
    }
}

impl std::error::Error for PanicError {}

thread_local! {
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

// Captures the stack at the panic site, where the unwinding boundary can no
// longer see it. Chains to the previously installed hook.
fn install_trace_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

/// Runs the rest of the chain inside an unwinding boundary.
///
/// A panic in the handler (while building or polling its future) comes back
/// as `Err(PanicError)` and flows through the outer stages like any other
/// error. The task, connection and process survive.
pub struct Panics;

impl Middleware for Panics {
    fn name(&self) -> &'static str {
        "panics"
    }

    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        install_trace_hook();

        Arc::new(move |req: Request| {
            let next = Arc::clone(&next);
            async move {
                let fut = match panic::catch_unwind(AssertUnwindSafe(|| next.call(req))) {
                    Ok(fut) => fut,
                    Err(payload) => return Err(PanicError::from_payload(payload).into()),
                };

                match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(result) => result,
                    Err(payload) => Err(PanicError::from_payload(payload).into()),
                }
            }
        })
    }
}
