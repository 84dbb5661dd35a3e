//! kvenv - export Azure Key Vault secrets to a .env file.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Flag parsing and terminal output
//! └── core/             # Library components
//!     ├── session/      # az login / subscription (SessionManager)
//!     ├── credential/   # Token acquisition (CredentialStrategy)
//!     ├── vault/        # Key Vault REST client (SecretStore)
//!     ├── env           # Secret names to KEY=VALUE lines
//!     ├── shell         # rc file updates
//!     └── pipeline      # The run, step by step
//! ```

pub mod cli;
pub mod core;
pub mod error;
