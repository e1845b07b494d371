#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use card_pay::{
    CardInput, Config, GatewayError, PaymentGateway, PaymentRequest, PaymentStatus, Pid, Workflow,
};
use reqwest::StatusCode;

/// Scripted in-memory processor.
///
/// Submissions answer from `submits` in order (accepting with pid "abc"
/// once exhausted); checks answer from `checks` in order and report
/// `processing` once exhausted.
#[derive(Default)]
pub struct FakeGateway {
    submits: Mutex<VecDeque<Result<Pid, GatewayError>>>,
    checks: Mutex<VecDeque<Result<PaymentStatus, GatewayError>>>,
    requests: Mutex<Vec<PaymentRequest>>,
    checked: Mutex<Vec<Pid>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accepting(pid: &str) -> Arc<Self> {
        let gateway = Self::default();
        gateway.push_submit(Ok(Pid::new(pid)));
        Arc::new(gateway)
    }

    pub fn unreachable() -> Arc<Self> {
        let gateway = Self::default();
        gateway.push_submit(Err(GatewayError::Status(StatusCode::SERVICE_UNAVAILABLE)));
        Arc::new(gateway)
    }

    pub fn push_submit(&self, result: Result<Pid, GatewayError>) {
        self.submits.lock().unwrap().push_back(result);
    }

    pub fn push_check(&self, result: Result<PaymentStatus, GatewayError>) {
        self.checks.lock().unwrap().push_back(result);
    }

    pub fn push_statuses(&self, statuses: &[PaymentStatus]) {
        for status in statuses {
            self.push_check(Ok(*status));
        }
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn checked(&self) -> Vec<Pid> {
        self.checked.lock().unwrap().clone()
    }

    pub fn check_count(&self) -> usize {
        self.checked.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn submit(&self, request: &PaymentRequest) -> Result<Pid, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Pid::new("abc")))
    }

    async fn check(&self, pid: &Pid) -> Result<PaymentStatus, GatewayError> {
        self.checked.lock().unwrap().push(pid.clone());
        self.checks
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PaymentStatus::Processing))
    }
}

pub fn valid_card() -> CardInput {
    CardInput {
        pan: "4111111111111111".to_string(),
        expire: "01/24".to_string(),
        cardholder: "Ivan Ivanov".to_string(),
        cvc: "123".to_string(),
    }
}

/// Workflow with the reference policy and every field filled in.
pub fn filled_workflow(gateway: &Arc<FakeGateway>) -> Workflow {
    let mut workflow = Workflow::new(gateway.clone(), &Config::default());
    workflow.fill(&valid_card()).unwrap();
    workflow
}
