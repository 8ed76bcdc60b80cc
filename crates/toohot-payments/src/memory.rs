//! In-process gateway used by tests and local runs without provider keys.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::PaymentGateway;
use crate::intent::{CreateIntentRequest, LastPaymentError, PaymentIntent};

/// Stores intents in a map. Failures can be scripted per call.
#[derive(Default)]
pub struct InMemoryGateway {
    intents: Mutex<HashMap<String, PaymentIntent>>,
    create_failures: Mutex<VecDeque<PaymentError>>,
    retrieve_failures: Mutex<VecDeque<PaymentError>>,
    create_calls: AtomicUsize,
    retrieve_calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an intent.
    pub fn insert(&self, intent: PaymentIntent) {
        self.intents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(intent.id.clone(), intent);
    }

    pub fn get(&self, intent_id: &str) -> Option<PaymentIntent> {
        self.intents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(intent_id)
            .cloned()
    }

    /// Moves an intent to a new provider status. Returns false if unknown.
    pub fn set_status(&self, intent_id: &str, status: &str) -> bool {
        let mut intents = self.intents.lock().unwrap_or_else(PoisonError::into_inner);
        match intents.get_mut(intent_id) {
            Some(intent) => {
                intent.status = status.to_string();
                true
            }
            None => false,
        }
    }

    /// Records a declined charge on the intent.
    pub fn set_payment_error(&self, intent_id: &str, code: &str, message: &str) -> bool {
        let mut intents = self.intents.lock().unwrap_or_else(PoisonError::into_inner);
        match intents.get_mut(intent_id) {
            Some(intent) => {
                intent.last_payment_error = Some(LastPaymentError {
                    code: Some(code.to_string()),
                    message: Some(message.to_string()),
                });
                true
            }
            None => false,
        }
    }

    /// The next `create_intent` call fails with `error`.
    pub fn fail_next_create(&self, error: PaymentError) {
        self.create_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    /// The next `retrieve_intent` call fails with `error`. Queue several to
    /// fail several calls in a row.
    pub fn fail_next_retrieve(&self, error: PaymentError) {
        self.retrieve_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    pub fn intent_count(&self) -> usize {
        self.intents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_intent(&self, request: &CreateIntentRequest) -> PaymentResult<PaymentIntent> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .create_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(err) = scripted {
            return Err(err);
        }

        let id = format!("pi_{}", Uuid::new_v4().simple());
        let intent = PaymentIntent {
            client_secret: Some(format!("{id}_secret_{}", Uuid::new_v4().simple())),
            id,
            status: "requires_payment_method".to_string(),
            amount: request.amount,
            currency: request.currency.clone(),
            metadata: request.metadata.clone(),
            last_payment_error: None,
        };
        self.insert(intent.clone());
        Ok(intent)
    }

    async fn retrieve_intent(&self, intent_id: &str) -> PaymentResult<PaymentIntent> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .retrieve_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(err) = scripted {
            return Err(err);
        }

        self.get(intent_id).ok_or_else(|| PaymentError::NotFound {
            id: intent_id.to_string(),
        })
    }
}
