pub mod card_file;
pub mod config;
pub mod form;
pub mod gateway;
pub mod model;
pub mod normalize;
pub mod validate;
pub mod workflow;

pub use config::Config;
pub use gateway::{GatewayError, HttpGateway, PaymentGateway};
pub use model::{CardInput, Field, PaymentRequest, PaymentStatus, Pid};
pub use workflow::{Workflow, WorkflowError, WorkflowState};
