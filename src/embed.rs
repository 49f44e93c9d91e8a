//! In-process entry point for embedding hosts.
//!
//! A host hands its payload over as an argument and receives the JSON body
//! back as a string. Status codes and headers stay with the host.

use crate::services::adapter;
use crate::state::AppState;
use crate::types::{Fields, TransportInput};
use crate::web::bridge::{panic_error, ResponseBridge};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

#[derive(Clone)]
pub struct Bridge {
    state: AppState,
}

impl Bridge {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Answer one host payload.
    pub async fn handle_embedded(&self, payload: Fields) -> String {
        let mut slot = Some(payload);
        self.handle(&mut slot, TransportInput::default(), |_| {}).await
    }

    /// Answer a call that may carry both a host payload and transport input.
    /// `slot` is emptied. `hook` runs against the incidental output sink
    /// before emission, for host code that insists on printing. A panic in the
    /// pipeline is caught and answered with the structured 500 payload.
    pub async fn handle<F>(&self, slot: &mut Option<Fields>, transport: TransportInput, hook: F) -> String
    where
        F: FnOnce(&mut dyn std::io::Write),
    {
        let request = adapter::adapt(slot, transport);
        let mut bridge = ResponseBridge::new(self.state.config.debug);
        hook(bridge.incidental());

        let result = AssertUnwindSafe(self.state.pipeline.run(&request, None))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(panic_error(payload.as_ref())));
        bridge.emit_embedded(result)
    }
}
