use std::sync::Arc;

use crate::evaluation::Evaluator;
use crate::ollama::LlmGateway;

pub struct HandlerState<G: LlmGateway + 'static> {
    pub evaluator: Arc<Evaluator<G>>,
}

impl<G: LlmGateway + 'static> Clone for HandlerState<G> {
    fn clone(&self) -> Self {
        Self {
            evaluator: Arc::clone(&self.evaluator),
        }
    }
}

impl<G: LlmGateway + 'static> HandlerState<G> {
    pub fn new(evaluator: Evaluator<G>) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
        }
    }

    pub fn from_shared(evaluator: Arc<Evaluator<G>>) -> Self {
        Self { evaluator }
    }
}
