pub mod email;

pub use email::{
    BulkSendRequest, BulkSendResponse, EmailBody, EmailContent, SendEmailResponse, SendRequest,
    SendResult, TestConfigResponse,
};
