/// Panic recovery
///
/// Turns a panicking handler into a 500 envelope. Outside production the
/// panic payload and a backtrace are returned to the caller; in production
/// both stay in the server log.

use crate::api::Envelope;
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use serde_json::json;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::sync::Once;
use tower_http::catch_panic::ResponseForPanic;

thread_local! {
    // Written by the panic hook, read by the responder on the same thread
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Install a panic hook that captures backtraces for the responder
///
/// The previous hook still runs, so panics are printed as usual. Installing
/// twice is a no-op.
pub fn install_backtrace_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

fn take_backtrace() -> Option<String> {
    LAST_BACKTRACE.with(|slot| slot.borrow_mut().take())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Builds the 500 envelope for `CatchPanicLayer`
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    expose_detail: bool,
}

impl PanicResponder {
    pub fn new(expose_detail: bool) -> Self {
        Self { expose_detail }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = axum::body::Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response {
        let detail = panic_message(err.as_ref());
        let backtrace = take_backtrace();
        tracing::error!("🔥 Recovered from panic: {}", detail);
        if let Some(trace) = &backtrace {
            tracing::debug!("🔥 Backtrace:\n{}", trace);
        }

        if !self.expose_detail {
            return Envelope::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                .into_response();
        }

        Envelope::error(StatusCode::INTERNAL_SERVER_ERROR, format!("Panic: {}", detail))
            .with_data(json!({ "stack_trace": backtrace.unwrap_or_default() }))
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_text_is_recovered() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }

    #[test]
    fn production_hides_the_detail() {
        let response = PanicResponder::new(false).response_for_panic(Box::new("secret"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
