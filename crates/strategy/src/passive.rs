//! Passive agent
//!
//! Places nothing on its own. After base reconciliation each event is handed
//! to an optional externally supplied callback, which may quote through the
//! agent it is given.

use mmkit_core::{LastFill, OrderId};
use mmkit_ports::{AgentResult, BookEvent};

use crate::agent::AgentCore;
use crate::strategy::Strategy;

/// Reaction supplied by the owner, run after base reconciliation
pub type ExternalCallback = Box<dyn FnMut(&mut AgentCore, &BookEvent) -> AgentResult<()> + Send>;

#[derive(Default)]
pub struct Passive {
    callback: Option<ExternalCallback>,
}

impl Passive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback<F>(callback: F) -> Self
    where
        F: FnMut(&mut AgentCore, &BookEvent) -> AgentResult<()> + Send + 'static,
    {
        Self::boxed(Box::new(callback))
    }

    pub fn boxed(callback: ExternalCallback) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    fn forward(&mut self, agent: &mut AgentCore, event: BookEvent) -> AgentResult<()> {
        match self.callback.as_mut() {
            Some(callback) => callback(agent, &event),
            None => Ok(()),
        }
    }
}

impl Strategy for Passive {
    fn name(&self) -> &'static str {
        "passive"
    }

    fn on_fill(&mut self, agent: &mut AgentCore, fill: &LastFill) -> AgentResult<()> {
        let event = BookEvent::Fill {
            id: fill.id,
            price: fill.price,
            size: fill.size,
        };
        self.forward(agent, event)
    }

    fn on_cancel(&mut self, agent: &mut AgentCore, id: OrderId) -> AgentResult<()> {
        self.forward(agent, BookEvent::Cancel { id })
    }

    fn on_stop(&mut self, agent: &mut AgentCore, id: OrderId) -> AgentResult<()> {
        self.forward(agent, BookEvent::Stop { id })
    }
}
