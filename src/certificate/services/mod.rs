//! Application services for certificate issuance orchestration.

mod issuance;

pub use issuance::{
    CertificateIssuanceError, CertificateIssuanceResult, CertificateIssuanceService,
    CertificateRequester,
};
