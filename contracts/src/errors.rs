//! Protocol error definitions.

use odra::prelude::*;

/// Broad failure classes, one per error code range.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorClass {
    /// Rejected before any mutation; the caller can fix the input and retry.
    Validation,
    /// A guard tripped mid-operation; the transaction is aborted.
    InvariantViolation,
    /// The caller lacks the role or identity the operation requires.
    Authorization,
    /// Loss beyond the guard; the adapter stays blocked until an operator acts.
    FatalAdapterImpairment,
}

/// Vault protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VaultError {
    // Validation errors (1xx)
    ZeroAmount = 100,
    CapExceeded = 101,
    AdapterNotApproved = 102,
    BeneficiaryNotApproved = 103,
    InvalidConfig = 104,
    InsufficientShares = 105,
    InsufficientAllowance = 106,
    InvalidInvestAmount = 107,
    AdapterNotFound = 108,
    AdapterAlreadyRegistered = 109,
    AdapterMismatch = 110,
    AdapterActive = 111,
    AdapterRetired = 112,
    NoActiveAdapter = 113,
    InsufficientLiquidity = 114,
    InsufficientTokenBalance = 115,
    DepositsPaused = 116,
    VaultHalted = 117,
    NativeNotSupported = 118,
    BorrowCapExceeded = 119,
    LtvExceeded = 120,
    AdapterHalted = 121,
    MathOverflow = 122,

    // Invariant violations (2xx)
    InvestSlippage = 200,
    LossGuardExceeded = 201,
    ConservationViolated = 202,
    Reentrancy = 203,

    // Authorization errors (3xx)
    Unauthorized = 300,
    UnauthorizedCaller = 301,
    UnauthorizedVault = 302,

    // Sticky adapter impairment (4xx)
    AdapterImpaired = 400,
}

impl VaultError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Validation
            VaultError::ZeroAmount => "Amount must be greater than zero",
            VaultError::CapExceeded => "Deposit cap exceeded",
            VaultError::AdapterNotApproved => "Adapter is not approved",
            VaultError::BeneficiaryNotApproved => "Beneficiary is not approved",
            VaultError::InvalidConfig => "Invalid configuration parameter",
            VaultError::InsufficientShares => "Insufficient share balance",
            VaultError::InsufficientAllowance => "Insufficient share allowance",
            VaultError::InvalidInvestAmount => "Invest amount must be greater than zero",
            VaultError::AdapterNotFound => "Adapter not found",
            VaultError::AdapterAlreadyRegistered => "Adapter already registered",
            VaultError::AdapterMismatch => "Adapter is bound to another vault or asset",
            VaultError::AdapterActive => "Adapter is active",
            VaultError::AdapterRetired => "Adapter is retired",
            VaultError::NoActiveAdapter => "No active adapter",
            VaultError::InsufficientLiquidity => "Insufficient liquidity",
            VaultError::InsufficientTokenBalance => "Insufficient token balance",
            VaultError::DepositsPaused => "Deposits are paused",
            VaultError::VaultHalted => "Vault is halted",
            VaultError::NativeNotSupported => "Vault does not wrap the native asset",
            VaultError::BorrowCapExceeded => "Borrow cap exceeded",
            VaultError::LtvExceeded => "Loan-to-value limit exceeded",
            VaultError::AdapterHalted => "Adapter position was emergency withdrawn",
            VaultError::MathOverflow => "Arithmetic overflow",

            // Invariant violations
            VaultError::InvestSlippage => "Divest returned less than the slippage limit",
            VaultError::LossGuardExceeded => "Realized loss exceeds the loss guard",
            VaultError::ConservationViolated => "Yield split does not conserve the harvested amount",
            VaultError::Reentrancy => "Reentrant call",

            // Authorization
            VaultError::Unauthorized => "Unauthorized: caller lacks the required role",
            VaultError::UnauthorizedCaller => "Unauthorized: caller is not the bound vault",
            VaultError::UnauthorizedVault => "Unauthorized: vault may not route yield",

            // Impairment
            VaultError::AdapterImpaired => "Adapter is impaired",
        }
    }

    /// Failure class, derived from the code range.
    pub const fn class(&self) -> ErrorClass {
        match *self as u16 {
            100..=199 => ErrorClass::Validation,
            200..=299 => ErrorClass::InvariantViolation,
            300..=399 => ErrorClass::Authorization,
            _ => ErrorClass::FatalAdapterImpairment,
        }
    }
}

impl core::fmt::Display for VaultError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<VaultError> for OdraError {
    fn from(error: VaultError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
