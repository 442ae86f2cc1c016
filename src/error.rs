use thiserror::Error;
use crate::types::ids::{AccountId, OrderHash};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // External Data Errors
    #[error("Price source unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Funding source unavailable: {0}")]
    FundingUnavailable(String),

    #[error("Clock went backwards: index at {index_timestamp}, now {now}")]
    ClockWentBackwards {
        index_timestamp: u64,
        now: u64,
    },

    // Arithmetic Errors
    #[error("Overflow in {operation}")]
    Overflow { operation: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    // Permission Errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Sender {sender} does not have permissions for account {account}")]
    MissingAccountPermissions {
        sender: AccountId,
        account: AccountId,
    },

    // Margin Errors
    #[error("Amount must be non-zero")]
    ZeroAmount,

    #[error("Account {account} is undercollateralized: {reason}")]
    Undercollateralized {
        account: AccountId,
        reason: &'static str,
    },

    #[error("Insufficient vault balance: required={required}, available={available}")]
    InsufficientVaultBalance {
        required: String,
        available: String,
    },

    // Trade Errors
    #[error("Accounts must be non-empty, sorted and unique")]
    InvalidAccounts,

    #[error("Trade argument references account index {index}, only {len} accounts given")]
    AccountIndexOutOfRange {
        index: usize,
        len: usize,
    },

    #[error("Liquidation rejected: {0}")]
    LiquidationRejected(&'static str),

    #[error("Deleveraging rejected: {0}")]
    DeleveragingRejected(&'static str),

    #[error("Order {hash} rejected: {reason}")]
    OrderRejected {
        hash: OrderHash,
        reason: &'static str,
    },

    // Admin Errors
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Not permitted during final settlement")]
    FinalSettlementEnabled,

    #[error("Final settlement is not enabled")]
    FinalSettlementNotEnabled,

    // Storage Errors
    #[error("Invalid record length: expected {expected}, found {found}")]
    InvalidRecordLength {
        expected: usize,
        found: usize,
    },

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Unsupported snapshot version: {version}, max supported: {max_supported}")]
    UnsupportedSnapshotVersion {
        version: u32,
        max_supported: u32,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),

    // Invariant Errors
    #[error("Invariant violation: {0}")]
    InvariantViolation(InvariantViolation),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short label used for rejection metrics.
    pub fn reason_label(&self) -> &'static str {
        match self {
            Error::PriceUnavailable(_) | Error::FundingUnavailable(_) => "external_data",
            Error::ClockWentBackwards { .. } => "clock",
            Error::Overflow { .. } | Error::DivisionByZero => "arithmetic",
            Error::Unauthorized(_) | Error::MissingAccountPermissions { .. } => "permissions",
            Error::Undercollateralized { .. } => "undercollateralized",
            Error::LiquidationRejected(_) => "liquidation",
            Error::DeleveragingRejected(_) => "deleveraging",
            Error::OrderRejected { .. } => "order",
            Error::FinalSettlementEnabled | Error::FinalSettlementNotEnabled => "final_settlement",
            _ => "other",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub details: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.details)
    }
}
